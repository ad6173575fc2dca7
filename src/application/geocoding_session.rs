//! GeocodingSession - serializes user-driven lookups so only the most recent
//! query of each kind is ever observed.
//!
//! Every submit issues a fresh [`QueryId`] and supersedes the outstanding query
//! of the same kind. The superseded lookup is asked to abort; if it completes
//! anyway its result is compared by id and dropped without any observable
//! effect.
//!
//! ## Lifecycle of a query
//!
//! 1. `submit_*` issues an id under the session lock and spawns the lookup
//! 2. The lookup races an abort signal and the lookup timeout
//! 3. On completion the id is compared with the current id for its kind
//! 4. Only a current query delivers its outcome, exactly once

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::domain::foundation::GeoPoint;
use crate::domain::geocoding::{
    GeocodeError, GeocodeOutcome, GeocodeQuery, QueryId, QueryKind, QueryPayload, QueryTracker,
};
use crate::ports::{Geocoder, LocationProvider};

/// Tunables for a geocoding session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeocodingSettings {
    /// Bound on a single lookup; expiry reports `GeocodeError::Timeout`.
    pub lookup_timeout: Duration,

    /// Result cap used by `submit_forward_default`.
    pub max_results: usize,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(10),
            max_results: 10,
        }
    }
}

impl GeocodingSettings {
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Default)]
struct SessionState {
    tracker: QueryTracker,
    aborts: HashMap<QueryKind, oneshot::Sender<()>>,
}

impl SessionState {
    fn abort_in_flight(&mut self, kind: QueryKind) {
        if let Some(abort) = self.aborts.remove(&kind) {
            // The lookup may have finished already.
            let _ = abort.send(());
        }
    }
}

/// Cancellable forward/reverse lookups against an injected geocoder.
///
/// Must be used from within a tokio runtime; lookups run as spawned tasks.
pub struct GeocodingSession {
    geocoder: Arc<dyn Geocoder>,
    location: Option<Arc<dyn LocationProvider>>,
    settings: GeocodingSettings,
    state: Arc<Mutex<SessionState>>,
}

impl GeocodingSession {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_settings(geocoder, GeocodingSettings::default())
    }

    pub fn with_settings(geocoder: Arc<dyn Geocoder>, settings: GeocodingSettings) -> Self {
        Self {
            geocoder,
            location: None,
            settings,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Uses the device location as focal point when a forward submit has none.
    pub fn with_location_provider(mut self, location: Arc<dyn LocationProvider>) -> Self {
        self.location = Some(location);
        self
    }

    pub fn settings(&self) -> &GeocodingSettings {
        &self.settings
    }

    /// Submits a forward lookup, superseding any outstanding forward lookup.
    ///
    /// Blank text never reaches the geocoder: the handle resolves at once
    /// with [`GeocodeOutcome::NoActiveQuery`].
    pub fn submit_forward(
        &self,
        text: &str,
        focal: Option<GeoPoint>,
        max_results: usize,
    ) -> QueryHandle {
        let focal = focal.or_else(|| self.device_focal());
        let mut state = self.lock_state();
        let id = Self::begin(&mut state, QueryKind::Forward);
        let query = GeocodeQuery::forward(id, text, focal, max_results);

        if query.is_blank() {
            state.tracker.retire(QueryKind::Forward, id);
            drop(state);

            tracing::debug!(query_id = %id, "Blank forward query, nothing to look up");
            let (sender, receiver) = oneshot::channel();
            let _ = sender.send(GeocodeOutcome::NoActiveQuery);
            return self.handle(query, receiver);
        }

        self.dispatch(state, query)
    }

    /// Submits a forward lookup with the session's default result cap.
    pub fn submit_forward_default(&self, text: &str, focal: Option<GeoPoint>) -> QueryHandle {
        self.submit_forward(text, focal, self.settings.max_results)
    }

    /// Submits a reverse lookup, superseding any outstanding reverse lookup.
    pub fn submit_reverse(&self, point: GeoPoint) -> QueryHandle {
        let mut state = self.lock_state();
        let id = Self::begin(&mut state, QueryKind::Reverse);
        let query = GeocodeQuery::reverse(id, point);
        self.dispatch(state, query)
    }

    /// Supersedes every outstanding query and asks in-flight lookups to abort.
    ///
    /// Safe to call with nothing outstanding.
    pub fn cancel_all(&self) {
        let mut state = self.lock_state();
        let superseded = state.tracker.supersede_all();
        for (_, abort) in state.aborts.drain() {
            let _ = abort.send(());
        }
        if !superseded.is_empty() {
            tracing::debug!(count = superseded.len(), "Cancelled outstanding geocode queries");
        }
    }

    /// Id of the outstanding query of `kind`, if any.
    pub fn outstanding(&self, kind: QueryKind) -> Option<QueryId> {
        self.lock_state().tracker.outstanding(kind)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internals
    // ════════════════════════════════════════════════════════════════════════

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }

    fn device_focal(&self) -> Option<GeoPoint> {
        let location = self.location.as_ref()?;
        if location.permission_status().is_authorized() {
            location.current_location()
        } else {
            None
        }
    }

    fn begin(state: &mut SessionState, kind: QueryKind) -> QueryId {
        let (id, superseded) = state.tracker.begin(kind);
        state.abort_in_flight(kind);
        if let Some(previous) = superseded {
            tracing::debug!(%kind, superseded = %previous, query_id = %id, "Superseded geocode query");
        }
        id
    }

    fn dispatch(&self, mut state: MutexGuard<'_, SessionState>, query: GeocodeQuery) -> QueryHandle {
        let (abort_tx, abort_rx) = oneshot::channel();
        let (outcome_tx, outcome_rx) = oneshot::channel();
        state.aborts.insert(query.kind(), abort_tx);
        drop(state);

        let geocoder = Arc::clone(&self.geocoder);
        let shared = Arc::clone(&self.state);
        let lookup_timeout = self.settings.lookup_timeout;
        let task_query = query.clone();

        tokio::spawn(async move {
            let id = task_query.id();
            let kind = task_query.kind();

            // Lookup first: every submit issues its request even when a newer
            // submit aborts it before this task is first polled.
            let result = tokio::select! {
                biased;
                result = tokio::time::timeout(lookup_timeout, run_lookup(geocoder.as_ref(), &task_query)) => {
                    result.unwrap_or(Err(GeocodeError::Timeout))
                }
                _ = abort_rx => {
                    tracing::debug!(query_id = %id, %kind, "Geocode lookup aborted");
                    return;
                }
            };

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(query_id = %id, %kind, error = %err, "Geocode lookup failed");
                    GeocodeOutcome::Failed(err)
                }
            };

            let mut state = lock(&shared);
            if !state.tracker.retire(kind, id) {
                tracing::debug!(query_id = %id, %kind, "Discarding superseded geocode result");
                return;
            }
            state.aborts.remove(&kind);
            // Sent under the lock so no newer submit can interleave with delivery.
            let _ = outcome_tx.send(outcome);
        });

        self.handle(query, outcome_rx)
    }

    fn handle(&self, query: GeocodeQuery, receiver: oneshot::Receiver<GeocodeOutcome>) -> QueryHandle {
        QueryHandle {
            query,
            receiver,
            state: Arc::clone(&self.state),
        }
    }
}

async fn run_lookup(
    geocoder: &dyn Geocoder,
    query: &GeocodeQuery,
) -> Result<GeocodeOutcome, GeocodeError> {
    match query.payload() {
        QueryPayload::Text(text) => {
            let max_results = query.max_results().unwrap_or(1);
            let results = geocoder
                .forward_geocode(text.trim(), query.focal(), max_results)
                .await?;
            Ok(GeocodeOutcome::from_forward(results))
        }
        QueryPayload::Point(point) => {
            let results = geocoder.reverse_geocode(*point).await?;
            Ok(GeocodeOutcome::from_reverse(results))
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    // State stays consistent even if a holder panicked; every write is a
    // single map operation.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle to a submitted query.
///
/// Resolves with the query's outcome if and only if the query was still
/// current when the geocoder answered.
pub struct QueryHandle {
    query: GeocodeQuery,
    receiver: oneshot::Receiver<GeocodeOutcome>,
    state: Arc<Mutex<SessionState>>,
}

impl QueryHandle {
    pub fn id(&self) -> QueryId {
        self.query.id()
    }

    pub fn kind(&self) -> QueryKind {
        self.query.kind()
    }

    pub fn query(&self) -> &GeocodeQuery {
        &self.query
    }

    /// Supersedes this query if it is still outstanding. No-op otherwise.
    pub fn cancel(&self) {
        let mut state = lock(&self.state);
        let kind = self.kind();
        if state.tracker.is_current(kind, self.id()) {
            state.tracker.supersede(kind);
            state.abort_in_flight(kind);
            tracing::debug!(query_id = %self.id(), %kind, "Geocode query cancelled");
        }
    }

    /// Waits for the outcome. `None` when the query was superseded or
    /// cancelled.
    pub async fn outcome(self) -> Option<GeocodeOutcome> {
        self.receiver.await.ok()
    }

    /// Runs `callback` with the outcome once it arrives. Never runs for a
    /// superseded or cancelled query.
    pub fn on_complete<F>(self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(GeocodeOutcome) + Send + 'static,
    {
        tokio::spawn(async move {
            if let Some(outcome) = self.outcome().await {
                callback(outcome);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::geocoding::{MockGeocoder, RecordedLookup};
    use crate::adapters::location::StaticLocationProvider;
    use crate::domain::foundation::Placemark;
    use crate::ports::PermissionStatus;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn placemark(name: &str) -> Placemark {
        Placemark::new(name, point(42.0, -87.0)).unwrap()
    }

    async fn within<T>(future: impl std::future::Future<Output = T>) -> T {
        tokio::time::timeout(Duration::from_secs(5), future)
            .await
            .expect("test step timed out")
    }

    #[tokio::test]
    async fn current_forward_query_reports_matches_in_order() {
        let geocoder = Arc::new(MockGeocoder::with_results(vec![
            placemark("Evanston, Illinois"),
            placemark("Evanston, Wyoming"),
        ]));
        let session = GeocodingSession::new(geocoder.clone());

        let outcome = within(session.submit_forward("Evanston", None, 10).outcome()).await;

        assert_eq!(
            outcome,
            Some(GeocodeOutcome::Matches(vec![
                placemark("Evanston, Illinois"),
                placemark("Evanston, Wyoming"),
            ]))
        );
        assert_eq!(geocoder.call_count(), 1);
        assert_eq!(session.outstanding(QueryKind::Forward), None);
    }

    #[tokio::test]
    async fn superseded_result_is_discarded() {
        let geocoder = Arc::new(MockGeocoder::manual());
        let session = GeocodingSession::new(geocoder.clone());

        let first = session.submit_forward("Chi", None, 10);
        within(geocoder.wait_for_calls(1)).await;
        let second = session.submit_forward("Chicago", None, 10);
        within(geocoder.wait_for_calls(2)).await;

        // The first lookup was aborted, so releasing it reaches nobody.
        geocoder.release(0, Ok(vec![placemark("Chile")]));
        assert!(geocoder.release(1, Ok(vec![placemark("Chicago, Illinois")])));

        assert_eq!(within(first.outcome()).await, None);
        assert_eq!(
            within(second.outcome()).await,
            Some(GeocodeOutcome::Matches(vec![placemark("Chicago, Illinois")]))
        );
    }

    #[tokio::test]
    async fn back_to_back_submits_each_call_geocoder_once() {
        let geocoder = Arc::new(MockGeocoder::with_results(vec![placemark("Ann Arbor")]));
        let session = GeocodingSession::new(geocoder.clone());

        // Neither spawned lookup has run before the second submit.
        let first = session.submit_forward("A", None, 10);
        let second = session.submit_forward("AB", None, 10);

        assert_eq!(
            within(second.outcome()).await,
            Some(GeocodeOutcome::Matches(vec![placemark("Ann Arbor")]))
        );
        assert_eq!(within(first.outcome()).await, None);
        within(geocoder.wait_for_calls(2)).await;
        assert_eq!(geocoder.call_count(), 2);
    }

    #[tokio::test]
    async fn cancel_before_lookup_runs_still_calls_geocoder_once() {
        let geocoder = Arc::new(MockGeocoder::manual());
        let session = GeocodingSession::new(geocoder.clone());

        let handle = session.submit_reverse(point(42.0, -87.0));
        session.cancel_all();

        assert_eq!(within(handle.outcome()).await, None);
        assert_eq!(geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn late_completion_of_superseded_query_has_no_effect() {
        let geocoder = Arc::new(MockGeocoder::manual());
        let session = GeocodingSession::new(geocoder.clone());

        let first = session.submit_forward("A", None, 10);
        within(geocoder.wait_for_calls(1)).await;
        let second = session.submit_forward("B", None, 10);
        within(geocoder.wait_for_calls(2)).await;

        assert!(geocoder.release(1, Ok(vec![placemark("B")])));
        assert_eq!(
            within(second.outcome()).await,
            Some(GeocodeOutcome::Matches(vec![placemark("B")]))
        );

        geocoder.release(0, Ok(vec![placemark("A")]));
        assert_eq!(within(first.outcome()).await, None);
        assert_eq!(session.outstanding(QueryKind::Forward), None);
    }

    #[tokio::test]
    async fn blank_forward_query_never_reaches_geocoder() {
        let geocoder = Arc::new(MockGeocoder::with_results(vec![placemark("X")]));
        let session = GeocodingSession::new(geocoder.clone());

        let outcome = within(session.submit_forward("   ", None, 10).outcome()).await;

        assert_eq!(outcome, Some(GeocodeOutcome::NoActiveQuery));
        assert_eq!(geocoder.call_count(), 0);
    }

    #[tokio::test]
    async fn blank_forward_query_clears_outstanding_query() {
        let geocoder = Arc::new(MockGeocoder::manual());
        let session = GeocodingSession::new(geocoder.clone());

        let pending = session.submit_forward("Evan", None, 10);
        within(geocoder.wait_for_calls(1)).await;
        let blank = session.submit_forward("", None, 10);

        assert_eq!(within(blank.outcome()).await, Some(GeocodeOutcome::NoActiveQuery));
        geocoder.release(0, Ok(vec![placemark("Evanston")]));
        assert_eq!(within(pending.outcome()).await, None);
        assert_eq!(session.outstanding(QueryKind::Forward), None);
        assert_eq!(geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_results_are_distinct_from_failure() {
        let geocoder = Arc::new(MockGeocoder::with_results(vec![]));
        let session = GeocodingSession::new(geocoder);

        let outcome = within(session.submit_forward("Nowhere", None, 10).outcome()).await;

        assert_eq!(outcome, Some(GeocodeOutcome::Empty));
    }

    #[tokio::test]
    async fn provider_error_is_reported_once() {
        let geocoder = Arc::new(MockGeocoder::failing(GeocodeError::network("offline")));
        let session = GeocodingSession::new(geocoder);

        let outcome = within(session.submit_forward("Evanston", None, 10).outcome()).await;

        assert_eq!(
            outcome,
            Some(GeocodeOutcome::Failed(GeocodeError::network("offline")))
        );
    }

    #[tokio::test]
    async fn reverse_reports_first_result_only() {
        let geocoder = Arc::new(MockGeocoder::with_results(vec![
            placemark("1600 Main St"),
            placemark("Main St"),
        ]));
        let session = GeocodingSession::new(geocoder);

        let outcome = within(session.submit_reverse(point(42.0, -87.0)).outcome()).await;

        assert_eq!(outcome, Some(GeocodeOutcome::Resolved(placemark("1600 Main St"))));
    }

    #[tokio::test]
    async fn forward_and_reverse_do_not_supersede_each_other() {
        let geocoder = Arc::new(MockGeocoder::manual());
        let session = GeocodingSession::new(geocoder.clone());

        let forward = session.submit_forward("Evanston", None, 10);
        within(geocoder.wait_for_calls(1)).await;
        let reverse = session.submit_reverse(point(42.0, -87.0));
        within(geocoder.wait_for_calls(2)).await;

        assert!(geocoder.release(0, Ok(vec![placemark("Evanston")])));
        assert!(geocoder.release(1, Ok(vec![placemark("Here")])));

        assert!(within(forward.outcome()).await.is_some());
        assert!(within(reverse.outcome()).await.is_some());
    }

    #[tokio::test]
    async fn cancel_all_drops_every_outstanding_query() {
        let geocoder = Arc::new(MockGeocoder::manual());
        let session = GeocodingSession::new(geocoder.clone());

        let forward = session.submit_forward("Evanston", None, 10);
        let reverse = session.submit_reverse(point(42.0, -87.0));
        within(geocoder.wait_for_calls(2)).await;

        session.cancel_all();
        geocoder.release(0, Ok(vec![placemark("Evanston")]));
        geocoder.release(1, Ok(vec![placemark("Here")]));

        assert_eq!(within(forward.outcome()).await, None);
        assert_eq!(within(reverse.outcome()).await, None);
    }

    #[tokio::test]
    async fn cancel_all_with_nothing_outstanding_is_noop() {
        let session = GeocodingSession::new(Arc::new(MockGeocoder::manual()));
        session.cancel_all();
        session.cancel_all();
        assert_eq!(session.outstanding(QueryKind::Forward), None);
    }

    #[tokio::test]
    async fn handle_cancel_suppresses_outcome() {
        let geocoder = Arc::new(MockGeocoder::manual());
        let session = GeocodingSession::new(geocoder.clone());

        let handle = session.submit_forward("Evanston", None, 10);
        within(geocoder.wait_for_calls(1)).await;
        handle.cancel();
        geocoder.release(0, Ok(vec![placemark("Evanston")]));

        assert_eq!(within(handle.outcome()).await, None);
    }

    #[tokio::test]
    async fn cancelling_stale_handle_leaves_newer_query_alone() {
        let geocoder = Arc::new(MockGeocoder::manual());
        let session = GeocodingSession::new(geocoder.clone());

        let stale = session.submit_forward("A", None, 10);
        within(geocoder.wait_for_calls(1)).await;
        let fresh = session.submit_forward("B", None, 10);
        within(geocoder.wait_for_calls(2)).await;

        stale.cancel();

        assert!(geocoder.release(1, Ok(vec![placemark("B")])));
        assert!(within(fresh.outcome()).await.is_some());
    }

    #[tokio::test]
    async fn slow_lookup_times_out() {
        let geocoder = Arc::new(MockGeocoder::manual());
        let settings = GeocodingSettings::default().with_lookup_timeout(Duration::from_millis(50));
        let session = GeocodingSession::with_settings(geocoder, settings);

        let outcome = within(session.submit_forward("Evanston", None, 10).outcome()).await;

        assert_eq!(outcome, Some(GeocodeOutcome::Failed(GeocodeError::Timeout)));
    }

    #[tokio::test]
    async fn on_complete_runs_callback_with_outcome() {
        let geocoder = Arc::new(MockGeocoder::with_results(vec![placemark("Evanston")]));
        let session = GeocodingSession::new(geocoder);
        let (tx, rx) = oneshot::channel();

        let task = session
            .submit_forward("Evanston", None, 10)
            .on_complete(move |outcome| {
                let _ = tx.send(outcome);
            });

        within(task).await.unwrap();
        assert_eq!(
            rx.await.unwrap(),
            GeocodeOutcome::Matches(vec![placemark("Evanston")])
        );
    }

    #[tokio::test]
    async fn on_complete_never_runs_for_superseded_query() {
        let geocoder = Arc::new(MockGeocoder::manual());
        let session = GeocodingSession::new(geocoder.clone());
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let flag = called.clone();
        let task = session
            .submit_forward("A", None, 10)
            .on_complete(move |_| flag.store(true, std::sync::atomic::Ordering::SeqCst));
        within(geocoder.wait_for_calls(1)).await;
        let _newer = session.submit_forward("B", None, 10);
        geocoder.release(0, Ok(vec![placemark("A")]));

        within(task).await.unwrap();
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn device_location_is_default_focal_point() {
        let geocoder = Arc::new(MockGeocoder::with_results(vec![]));
        let device = point(42.05, -87.68);
        let location = Arc::new(StaticLocationProvider::new(
            Some(device),
            PermissionStatus::Authorized,
        ));
        let session = GeocodingSession::new(geocoder.clone()).with_location_provider(location);

        within(session.submit_forward_default("Evanston", None).outcome()).await;

        assert_eq!(
            geocoder.calls(),
            vec![RecordedLookup::Forward {
                query: "Evanston".to_string(),
                focal: Some(device),
                max_results: 10,
            }]
        );
    }

    #[tokio::test]
    async fn denied_location_is_not_used_as_focal_point() {
        let geocoder = Arc::new(MockGeocoder::with_results(vec![]));
        let location = Arc::new(StaticLocationProvider::new(
            Some(point(42.05, -87.68)),
            PermissionStatus::Denied,
        ));
        let session = GeocodingSession::new(geocoder.clone()).with_location_provider(location);

        within(session.submit_forward("Evanston", None, 5).outcome()).await;

        assert_eq!(
            geocoder.calls(),
            vec![RecordedLookup::Forward {
                query: "Evanston".to_string(),
                focal: None,
                max_results: 5,
            }]
        );
    }
}
