//! Mock geocoder for testing.
//!
//! Supports:
//! - Canned results or a canned error for every call
//! - Manual mode, where each call waits until the test releases it
//! - Call tracking

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{oneshot, Notify};

use crate::domain::foundation::{GeoPoint, Placemark};
use crate::domain::geocoding::GeocodeError;
use crate::ports::Geocoder;

type LookupResult = Result<Vec<Placemark>, GeocodeError>;

/// Recorded geocoder call for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedLookup {
    Forward {
        query: String,
        focal: Option<GeoPoint>,
        max_results: usize,
    },
    Reverse(GeoPoint),
}

enum Mode {
    Canned(LookupResult),
    Manual,
}

enum Reply {
    Now(LookupResult),
    Later(oneshot::Receiver<LookupResult>),
}

struct MockState {
    mode: Mode,
    calls: Vec<RecordedLookup>,
    /// Release slots for manual mode, indexed by call number.
    pending: Vec<Option<oneshot::Sender<LookupResult>>>,
}

/// Mock geocoder for testing.
///
/// # Example
///
/// ```ignore
/// let geocoder = Arc::new(MockGeocoder::manual());
/// let handle = session.submit_forward("Evanston", None, 10);
///
/// geocoder.wait_for_calls(1).await;
/// geocoder.release(0, Ok(vec![placemark]));
/// ```
pub struct MockGeocoder {
    inner: Arc<Mutex<MockState>>,
    called: Notify,
}

impl MockGeocoder {
    fn with_mode(mode: Mode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                mode,
                calls: Vec::new(),
                pending: Vec::new(),
            })),
            called: Notify::new(),
        }
    }

    /// Every call answers immediately with `results`.
    pub fn with_results(results: Vec<Placemark>) -> Self {
        Self::with_mode(Mode::Canned(Ok(results)))
    }

    /// Every call fails immediately with `error`.
    pub fn failing(error: GeocodeError) -> Self {
        Self::with_mode(Mode::Canned(Err(error)))
    }

    /// Every call waits until `release` is called for it.
    pub fn manual() -> Self {
        Self::with_mode(Mode::Manual)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test controls
    // ════════════════════════════════════════════════════════════════════════════

    /// Answers the `index`-th call (0-based). Returns false when the caller
    /// already stopped waiting or the call was released before.
    pub fn release(&self, index: usize, result: LookupResult) -> bool {
        let sender = self
            .inner
            .lock()
            .unwrap()
            .pending
            .get_mut(index)
            .and_then(Option::take);
        match sender {
            Some(sender) => sender.send(result).is_ok(),
            None => false,
        }
    }

    /// Waits until at least `count` calls have been made.
    pub async fn wait_for_calls(&self, count: usize) {
        while self.call_count() < count {
            self.called.notified().await;
        }
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    pub fn calls(&self) -> Vec<RecordedLookup> {
        self.inner.lock().unwrap().calls.clone()
    }

    async fn answer(&self, call: RecordedLookup) -> LookupResult {
        let reply = {
            let mut state = self.inner.lock().unwrap();
            state.calls.push(call);
            match &state.mode {
                Mode::Canned(result) => Reply::Now(result.clone()),
                Mode::Manual => {
                    let (sender, receiver) = oneshot::channel();
                    state.pending.push(Some(sender));
                    Reply::Later(receiver)
                }
            }
        };
        // Stores a permit if nobody is waiting yet.
        self.called.notify_one();

        match reply {
            Reply::Now(result) => result,
            Reply::Later(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(GeocodeError::network("mock lookup never released"))),
        }
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn forward_geocode(
        &self,
        query: &str,
        focal: Option<GeoPoint>,
        max_results: usize,
    ) -> Result<Vec<Placemark>, GeocodeError> {
        self.answer(RecordedLookup::Forward {
            query: query.to_string(),
            focal,
            max_results,
        })
        .await
    }

    async fn reverse_geocode(&self, point: GeoPoint) -> Result<Vec<Placemark>, GeocodeError> {
        self.answer(RecordedLookup::Reverse(point)).await
    }
}
