//! Geocoding queries.
//!
//! A query's `id` is assigned at submission and is the only thing compared
//! when deciding whether a completion is still wanted.

use serde::Serialize;
use std::fmt;

use crate::domain::foundation::GeoPoint;

/// Monotonically increasing query identifier, unique per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct QueryId(u64);

impl QueryId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Direction of a lookup. Each kind supersedes only its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Forward,
    Reverse,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Forward => "forward",
            QueryKind::Reverse => "reverse",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPayload {
    Text(String),
    Point(GeoPoint),
}

/// A submitted lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeQuery {
    id: QueryId,
    kind: QueryKind,
    payload: QueryPayload,
    focal: Option<GeoPoint>,
    max_results: Option<usize>,
}

impl GeocodeQuery {
    pub fn forward(
        id: QueryId,
        text: impl Into<String>,
        focal: Option<GeoPoint>,
        max_results: usize,
    ) -> Self {
        Self {
            id,
            kind: QueryKind::Forward,
            payload: QueryPayload::Text(text.into()),
            focal,
            max_results: Some(max_results),
        }
    }

    pub fn reverse(id: QueryId, point: GeoPoint) -> Self {
        Self {
            id,
            kind: QueryKind::Reverse,
            payload: QueryPayload::Point(point),
            focal: None,
            max_results: None,
        }
    }

    pub fn id(&self) -> QueryId {
        self.id
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn payload(&self) -> &QueryPayload {
        &self.payload
    }

    pub fn focal(&self) -> Option<GeoPoint> {
        self.focal
    }

    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    /// Forward text with surrounding whitespace removed.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            QueryPayload::Text(text) => Some(text.trim()),
            QueryPayload::Point(_) => None,
        }
    }

    /// True for forward queries with nothing to look up.
    pub fn is_blank(&self) -> bool {
        matches!(self.text(), Some(text) if text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_query_exposes_trimmed_text() {
        let query = GeocodeQuery::forward(QueryId::new(1), "  Evanston ", None, 10);

        assert_eq!(query.kind(), QueryKind::Forward);
        assert_eq!(query.text(), Some("Evanston"));
        assert_eq!(query.max_results(), Some(10));
        assert!(!query.is_blank());
    }

    #[test]
    fn whitespace_only_forward_query_is_blank() {
        let query = GeocodeQuery::forward(QueryId::new(2), " \t\n", None, 10);
        assert!(query.is_blank());
    }

    #[test]
    fn reverse_query_is_never_blank() {
        let point = GeoPoint::new(42.0, -87.0).unwrap();
        let query = GeocodeQuery::reverse(QueryId::new(3), point);

        assert_eq!(query.kind(), QueryKind::Reverse);
        assert_eq!(query.payload(), &QueryPayload::Point(point));
        assert_eq!(query.text(), None);
        assert!(!query.is_blank());
    }

    #[test]
    fn ids_order_by_value() {
        assert!(QueryId::new(1) < QueryId::new(2));
        assert_eq!(QueryId::new(7).to_string(), "q7");
    }
}
