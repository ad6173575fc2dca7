//! Mock auth gateway for testing.
//!
//! Provides a configurable mock implementation of `AuthGateway`. Supports:
//! - Pre-configured customer id, receipt and ephemeral key
//! - Error injection per method
//! - Artificial latency for timeout and cancellation tests
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::ports::{Authentication, AuthGateway, ChargeReceipt, ChargeRequest, GatewayError};

/// Recorded gateway call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Authenticate(Option<String>),
    Charge(ChargeRequest),
    EphemeralKey(String),
}

struct MockState {
    customer_id: String,
    charge_success: bool,
    ephemeral_key: serde_json::Value,
    method_errors: HashMap<&'static str, GatewayError>,
    delay: Option<Duration>,
    call_log: Vec<GatewayCall>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            customer_id: "cus_mock".to_string(),
            charge_success: true,
            ephemeral_key: json!({"id": "ephkey_mock", "secret": "ek_test_mock"}),
            method_errors: HashMap::new(),
            delay: None,
            call_log: Vec::new(),
        }
    }
}

/// Mock auth gateway for testing.
///
/// # Example
///
/// ```ignore
/// let gateway = MockAuthGateway::new();
/// gateway.set_customer_id("cus_123");
/// gateway.set_error("charge", GatewayError::declined("card declined"));
/// ```
#[derive(Default, Clone)]
pub struct MockAuthGateway {
    inner: Arc<Mutex<MockState>>,
}

impl MockAuthGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Customer id returned by `authenticate` when no identity is passed.
    pub fn set_customer_id(&self, customer_id: impl Into<String>) {
        self.inner.lock().unwrap().customer_id = customer_id.into();
    }

    pub fn set_charge_success(&self, success: bool) {
        self.inner.lock().unwrap().charge_success = success;
    }

    pub fn set_ephemeral_key(&self, key: serde_json::Value) {
        self.inner.lock().unwrap().ephemeral_key = key;
    }

    /// Makes `method` ("authenticate", "charge" or "ephemeral_key") fail.
    pub fn set_error(&self, method: &'static str, error: GatewayError) {
        self.inner.lock().unwrap().method_errors.insert(method, error);
    }

    pub fn clear_errors(&self) {
        self.inner.lock().unwrap().method_errors.clear();
    }

    /// Delays every answer by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().delay = Some(delay);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertions
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Charge(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().call_log.len()
    }

    /// Records the call, waits out the configured delay, then returns the
    /// injected error for `method` if any.
    async fn enter(&self, method: &'static str, call: GatewayCall) -> Result<(), GatewayError> {
        let delay = {
            let mut state = self.inner.lock().unwrap();
            state.call_log.push(call);
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.inner.lock().unwrap().method_errors.get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuthGateway for MockAuthGateway {
    async fn authenticate(
        &self,
        payment_identity: Option<&str>,
    ) -> Result<Authentication, GatewayError> {
        self.enter(
            "authenticate",
            GatewayCall::Authenticate(payment_identity.map(str::to_string)),
        )
        .await?;

        let remote_customer_id = match payment_identity {
            Some(identity) => identity.to_string(),
            None => self.inner.lock().unwrap().customer_id.clone(),
        };
        Ok(Authentication { remote_customer_id })
    }

    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, GatewayError> {
        self.enter("charge", GatewayCall::Charge(request.clone())).await?;
        Ok(ChargeReceipt {
            success: self.inner.lock().unwrap().charge_success,
        })
    }

    async fn issue_ephemeral_key(
        &self,
        api_version: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        self.enter(
            "ephemeral_key",
            GatewayCall::EphemeralKey(api_version.to_string()),
        )
        .await?;
        Ok(self.inner.lock().unwrap().ephemeral_key.clone())
    }
}
