//! BoundedGateway - enforces a timeout and caller cancellation on any
//! `AuthGateway`.
//!
//! Every call races three things: the inner gateway, the timeout, and a
//! cancellation broadcast. Whichever finishes first decides the result, and
//! the losing inner future is dropped, which abandons its request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::ports::{Authentication, AuthGateway, ChargeReceipt, ChargeRequest, GatewayError};

pub struct BoundedGateway<G: ?Sized> {
    inner: Arc<G>,
    timeout: Duration,
    /// Bumped by `cancel_all`; every in-flight call watches it.
    cancel: watch::Sender<u64>,
}

impl<G: AuthGateway + ?Sized> BoundedGateway<G> {
    pub fn new(inner: Arc<G>, timeout: Duration) -> Self {
        let (cancel, _) = watch::channel(0);
        Self {
            inner,
            timeout,
            cancel,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves every in-flight call with `Cancelled`. Calls started
    /// afterwards are unaffected. No-op when nothing is in flight.
    pub fn cancel_all(&self) {
        self.cancel.send_modify(|generation| *generation += 1);
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, GatewayError>
    where
        T: Send,
        F: Future<Output = Result<T, GatewayError>> + Send,
    {
        let mut cancelled = self.cancel.subscribe();

        tokio::select! {
            biased;
            _ = cancelled.changed() => {
                tracing::warn!(operation, "Gateway call cancelled by caller");
                Err(GatewayError::cancelled())
            }
            result = tokio::time::timeout(self.timeout, call) => match result {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        operation,
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Gateway call timed out"
                    );
                    Err(GatewayError::timeout(format!(
                        "{} did not complete within {:?}",
                        operation, self.timeout
                    )))
                }
            },
        }
    }
}

#[async_trait]
impl<G: AuthGateway + ?Sized> AuthGateway for BoundedGateway<G> {
    async fn authenticate(
        &self,
        payment_identity: Option<&str>,
    ) -> Result<Authentication, GatewayError> {
        self.bounded("authenticate", self.inner.authenticate(payment_identity))
            .await
    }

    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, GatewayError> {
        self.bounded("charge", self.inner.charge(request)).await
    }

    async fn issue_ephemeral_key(
        &self,
        api_version: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        self.bounded("ephemeral_key", self.inner.issue_ephemeral_key(api_version))
            .await
    }
}
