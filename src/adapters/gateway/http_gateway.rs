//! HTTP Auth Gateway - Implementation of AuthGateway for the offset backend.
//!
//! # Endpoints
//!
//! | Method | Path | Body | Answer |
//! |--------|------|------|--------|
//! | POST | `/authenticate` | `{customer_id}` | customer id as a JSON string or `{customer_id}` |
//! | POST | `/charge` | `{source, amount, currency, customer_id}` | 2xx, optional `{success}` |
//! | POST | `/ephemeral_keys` | `{api_version}` | JSON object for the payment SDK |
//!
//! Every request is a single attempt bounded by the configured timeout.
//! Charges carry an `Idempotency-Key` header so callers may retry safely.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::ports::{Authentication, AuthGateway, ChargeReceipt, ChargeRequest, GatewayError};

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Base URL of the backend, without trailing slash.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpGatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Offset backend client.
pub struct HttpAuthGateway {
    config: HttpGatewayConfig,
    client: Client,
}

impl HttpAuthGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<&str>,
    ) -> Result<Response, GatewayError> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::timeout(format!(
                    "no response from /{} within {}s",
                    path,
                    self.config.timeout.as_secs()
                ))
            } else if e.is_connect() {
                GatewayError::network(format!("Connection failed: {}", e))
            } else {
                GatewayError::network(e.to_string())
            }
        })
    }
}

/// Rejects malformed amounts and currencies before anything is sent.
fn validate_charge(request: &ChargeRequest) -> Result<(), GatewayError> {
    if request.amount_cents <= 0 {
        return Err(GatewayError::validation(format!(
            "amount must be positive, got {}",
            request.amount_cents
        )));
    }
    let currency_ok =
        request.currency.len() == 3 && request.currency.chars().all(|c| c.is_ascii_alphabetic());
    if !currency_ok {
        return Err(GatewayError::validation(format!(
            "currency must be a three-letter code, got {:?}",
            request.currency
        )));
    }
    if request.payment_token.trim().is_empty() {
        return Err(GatewayError::validation("payment token is empty"));
    }
    Ok(())
}

async fn error_body(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    (status, text)
}

#[derive(Serialize)]
struct AuthenticateBody<'a> {
    customer_id: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuthenticateAnswer {
    Bare(String),
    Object { customer_id: String },
}

#[derive(Serialize)]
struct ChargeBody<'a> {
    source: &'a str,
    amount: i64,
    currency: String,
    customer_id: &'a str,
}

#[derive(Deserialize)]
struct ChargeAnswer {
    success: Option<bool>,
}

#[derive(Serialize)]
struct EphemeralKeyBody<'a> {
    api_version: &'a str,
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn authenticate(
        &self,
        payment_identity: Option<&str>,
    ) -> Result<Authentication, GatewayError> {
        let body = AuthenticateBody {
            customer_id: payment_identity,
        };
        let response = self.post("authenticate", &body, None).await?;

        if !response.status().is_success() {
            let (status, text) = error_body(response).await;
            tracing::warn!(status, error = %text, "Backend rejected authentication");
            return Err(GatewayError::auth(format!("authentication rejected: {}", text))
                .with_status(status));
        }

        let answer: AuthenticateAnswer = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(format!("authenticate: {}", e)))?;
        let remote_customer_id = match answer {
            AuthenticateAnswer::Bare(id) | AuthenticateAnswer::Object { customer_id: id } => id,
        };
        if remote_customer_id.trim().is_empty() {
            return Err(GatewayError::invalid_response("authenticate: empty customer id"));
        }

        Ok(Authentication { remote_customer_id })
    }

    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, GatewayError> {
        validate_charge(request)?;

        let body = ChargeBody {
            source: &request.payment_token,
            amount: request.amount_cents,
            currency: request.currency.to_ascii_lowercase(),
            customer_id: &request.remote_customer_id,
        };
        let response = self
            .post("charge", &body, Some(&request.idempotency_key))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let (code, text) = error_body(response).await;
            tracing::warn!(status = code, error = %text, "Backend refused charge");
            let error = match status {
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    GatewayError::validation(text)
                }
                _ => GatewayError::declined(text),
            };
            return Err(error.with_status(code));
        }

        // The backend may answer with an empty or non-JSON body; 2xx alone
        // means the charge went through.
        let text = response.text().await.unwrap_or_default();
        let success = serde_json::from_str::<ChargeAnswer>(&text)
            .ok()
            .and_then(|answer| answer.success)
            .unwrap_or(true);

        Ok(ChargeReceipt { success })
    }

    async fn issue_ephemeral_key(&self, api_version: &str) -> Result<JsonValue, GatewayError> {
        let response = self
            .post("ephemeral_keys", &EphemeralKeyBody { api_version }, None)
            .await?;

        if !response.status().is_success() {
            let (status, text) = error_body(response).await;
            return Err(GatewayError::auth(format!("ephemeral key refused: {}", text))
                .with_status(status));
        }

        let key: JsonValue = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(format!("ephemeral_keys: {}", e)))?;
        if !key.is_object() {
            return Err(GatewayError::invalid_response(
                "ephemeral_keys: expected a JSON object",
            ));
        }
        Ok(key)
    }
}
