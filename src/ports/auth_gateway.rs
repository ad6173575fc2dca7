//! Auth gateway port for the payment backend.
//!
//! Defines the contract for the backend that authenticates the installation's
//! payment identity, charges offsets, and issues ephemeral keys for the
//! client-side payment SDK.
//!
//! # Design
//!
//! - **Asynchronous**: every operation is a future; nothing blocks the caller
//! - **Single attempt**: implementations never retry; callers own retry policy
//! - **Cancellable**: dropping the future abandons the request

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for payment backend integrations.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchanges the stored payment identity (if any) for the backend's
    /// customer id, creating a customer when none is known.
    async fn authenticate(
        &self,
        payment_identity: Option<&str>,
    ) -> Result<Authentication, GatewayError>;

    /// Charges an offset once.
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, GatewayError>;

    /// Issues an ephemeral key blob for the payment SDK.
    async fn issue_ephemeral_key(
        &self,
        api_version: &str,
    ) -> Result<serde_json::Value, GatewayError>;
}

/// Result of a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    /// Backend customer id to store as the payment identity.
    pub remote_customer_id: String,
}

/// Request to charge an offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Token produced by the payment UI for the chosen payment method.
    pub payment_token: String,

    /// Amount in the currency's minor unit.
    pub amount_cents: i64,

    /// ISO 4217 code, lowercase.
    pub currency: String,

    pub remote_customer_id: String,

    /// Idempotency key for safe caller-side retries.
    pub idempotency_key: String,
}

/// Backend's answer to a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeReceipt {
    pub success: bool,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// HTTP status when the backend answered.
    pub status: Option<u16>,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
        }
    }

    /// Attaches the backend's HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthError, message)
    }

    pub fn declined(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::PaymentDeclined, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ValidationError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::TimeoutError, message)
    }

    pub fn cancelled() -> Self {
        Self::new(GatewayErrorCode::Cancelled, "operation cancelled by caller")
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({}): {}", self.code, status, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Transport failure.
    NetworkError,

    /// Backend rejected the identity.
    AuthError,

    /// Backend refused the charge.
    PaymentDeclined,

    /// Malformed amount or currency.
    ValidationError,

    /// No response within the enforced bound.
    TimeoutError,

    /// Caller abandoned the operation.
    Cancelled,

    /// Backend answered with an unreadable body.
    InvalidResponse,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError | GatewayErrorCode::TimeoutError
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthError => "auth_error",
            GatewayErrorCode::PaymentDeclined => "payment_declined",
            GatewayErrorCode::ValidationError => "validation_error",
            GatewayErrorCode::TimeoutError => "timeout_error",
            GatewayErrorCode::Cancelled => "cancelled",
            GatewayErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}
