//! Id-based supersession bookkeeping for geocoding queries.

use std::collections::HashMap;

use super::{QueryId, QueryKind};

/// Tracks the current query id per kind.
///
/// A completion is observable only when its id is still the current id for
/// its kind. Ids are never reused, so comparing ids is enough even if the
/// provider pools or reuses request objects.
#[derive(Debug, Default)]
pub struct QueryTracker {
    last_issued: u64,
    current: HashMap<QueryKind, QueryId>,
}

impl QueryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh id and makes it current for `kind`, superseding any
    /// outstanding query of that kind. Returns the id and the superseded one.
    pub fn begin(&mut self, kind: QueryKind) -> (QueryId, Option<QueryId>) {
        self.last_issued += 1;
        let id = QueryId::new(self.last_issued);
        let superseded = self.current.insert(kind, id);
        (id, superseded)
    }

    pub fn is_current(&self, kind: QueryKind, id: QueryId) -> bool {
        self.current.get(&kind) == Some(&id)
    }

    /// Marks a current query as finished. Returns false when `id` was
    /// already superseded, in which case nothing changes.
    pub fn retire(&mut self, kind: QueryKind, id: QueryId) -> bool {
        if self.is_current(kind, id) {
            self.current.remove(&kind);
            true
        } else {
            false
        }
    }

    /// Supersedes the outstanding query of `kind`, if any.
    pub fn supersede(&mut self, kind: QueryKind) -> Option<QueryId> {
        self.current.remove(&kind)
    }

    /// Supersedes every outstanding query.
    pub fn supersede_all(&mut self) -> Vec<QueryId> {
        self.current.drain().map(|(_, id)| id).collect()
    }

    pub fn outstanding(&self, kind: QueryKind) -> Option<QueryId> {
        self.current.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_across_kinds() {
        let mut tracker = QueryTracker::new();

        let (a, _) = tracker.begin(QueryKind::Forward);
        let (b, _) = tracker.begin(QueryKind::Reverse);
        let (c, _) = tracker.begin(QueryKind::Forward);

        assert!(a < b && b < c);
        assert_eq!(tracker.outstanding(QueryKind::Forward), Some(c));
    }

    #[test]
    fn newer_query_supersedes_same_kind_only() {
        let mut tracker = QueryTracker::new();
        let (forward, _) = tracker.begin(QueryKind::Forward);
        let (reverse, _) = tracker.begin(QueryKind::Reverse);

        let (newer, superseded) = tracker.begin(QueryKind::Forward);

        assert_eq!(superseded, Some(forward));
        assert!(!tracker.is_current(QueryKind::Forward, forward));
        assert!(tracker.is_current(QueryKind::Forward, newer));
        assert!(tracker.is_current(QueryKind::Reverse, reverse));
    }

    #[test]
    fn retire_accepts_current_id_once() {
        let mut tracker = QueryTracker::new();
        let (id, _) = tracker.begin(QueryKind::Forward);

        assert!(tracker.retire(QueryKind::Forward, id));
        assert!(!tracker.retire(QueryKind::Forward, id));
        assert_eq!(tracker.outstanding(QueryKind::Forward), None);
    }

    #[test]
    fn retire_ignores_stale_id() {
        let mut tracker = QueryTracker::new();
        let (stale, _) = tracker.begin(QueryKind::Forward);
        let (fresh, _) = tracker.begin(QueryKind::Forward);

        assert!(!tracker.retire(QueryKind::Forward, stale));
        assert_eq!(tracker.outstanding(QueryKind::Forward), Some(fresh));
    }

    #[test]
    fn supersede_all_on_idle_tracker_is_noop() {
        let mut tracker = QueryTracker::new();
        assert!(tracker.supersede_all().is_empty());
        assert_eq!(tracker.outstanding(QueryKind::Forward), None);
    }

    #[test]
    fn supersede_all_clears_every_kind() {
        let mut tracker = QueryTracker::new();
        tracker.begin(QueryKind::Forward);
        tracker.begin(QueryKind::Reverse);

        assert_eq!(tracker.supersede_all().len(), 2);
        assert_eq!(tracker.outstanding(QueryKind::Forward), None);
        assert_eq!(tracker.outstanding(QueryKind::Reverse), None);
    }
}
