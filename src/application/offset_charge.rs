//! OffsetChargeHandler - authenticates the installation with the payment
//! backend and charges trip offsets against the stored profile.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;
use crate::ports::{AuthGateway, ChargeRequest, GatewayError};

use super::{ProfileStore, StoreError};

/// Command to charge an offset.
#[derive(Debug, Clone)]
pub struct ChargeOffsetCommand {
    /// Token from the payment UI for the chosen payment method.
    pub payment_token: String,
    pub amount_cents: i64,
    pub currency: String,
}

/// Result of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeOffsetResult {
    pub charged_cents: i64,
    pub remote_customer_id: String,
    pub cumulative_cost_cents: i64,
    pub total_offset_history_cents: i64,
}

#[derive(Debug, Error)]
pub enum ChargeOffsetError {
    #[error("invalid charge: {0}")]
    Invalid(#[from] ValidationError),

    #[error("payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("profile could not be saved: {0}")]
    Store(#[from] StoreError),
}

impl ChargeOffsetError {
    /// True when the caller may retry the same command.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChargeOffsetError::Gateway(err) if err.is_retryable())
    }
}

/// Handler for customer authentication and offset charges.
pub struct OffsetChargeHandler {
    gateway: Arc<dyn AuthGateway>,
    profiles: Arc<ProfileStore>,
}

impl OffsetChargeHandler {
    pub fn new(gateway: Arc<dyn AuthGateway>, profiles: Arc<ProfileStore>) -> Self {
        Self { gateway, profiles }
    }

    /// Authenticates with the stored payment identity and stores the
    /// backend's customer id when it changed. Returns the customer id.
    pub async fn ensure_customer(&self) -> Result<String, ChargeOffsetError> {
        let profile = self.profiles.load().await;
        let stored = profile.payment_identity().map(str::to_string);

        let auth = self.gateway.authenticate(stored.as_deref()).await?;
        let customer_id = auth.remote_customer_id;

        if stored.as_deref() != Some(customer_id.as_str()) {
            let id = customer_id.clone();
            self.profiles
                .update(move |profile| {
                    profile.set_payment_identity(id);
                    Ok(())
                })
                .await?;
            tracing::info!(
                had_identity = stored.is_some(),
                "Stored new payment customer id"
            );
        }

        Ok(customer_id)
    }

    /// Charges the offset once and records it on the profile.
    pub async fn handle(
        &self,
        cmd: ChargeOffsetCommand,
    ) -> Result<ChargeOffsetResult, ChargeOffsetError> {
        // 1. Reject what the backend would reject
        if cmd.amount_cents <= 0 {
            return Err(ValidationError::out_of_range(
                "amount_cents",
                1.0,
                i64::MAX as f64,
                cmd.amount_cents as f64,
            )
            .into());
        }
        let currency_ok =
            cmd.currency.len() == 3 && cmd.currency.chars().all(|c| c.is_ascii_alphabetic());
        if !currency_ok {
            return Err(ValidationError::invalid_format(
                "currency",
                format!("expected a three-letter code, got {:?}", cmd.currency),
            )
            .into());
        }

        // 2. Resolve the customer, authenticating when none is stored
        let stored = self.profiles.load().await.payment_identity().map(str::to_string);
        let remote_customer_id = match stored {
            Some(id) => id,
            None => self.ensure_customer().await?,
        };

        // 3. Charge once
        let request = ChargeRequest {
            payment_token: cmd.payment_token,
            amount_cents: cmd.amount_cents,
            currency: cmd.currency,
            remote_customer_id,
            idempotency_key: Uuid::new_v4().to_string(),
        };
        let receipt = self.gateway.charge(&request).await?;
        if !receipt.success {
            tracing::warn!(amount_cents = request.amount_cents, "Backend reported charge unsuccessful");
            return Err(GatewayError::declined("backend reported the charge as unsuccessful").into());
        }

        // 4. Record the charge
        let amount = request.amount_cents;
        let profile = self
            .profiles
            .update(move |profile| profile.record_charge(amount))
            .await
            .map_err(|e| {
                tracing::error!(
                    idempotency_key = %request.idempotency_key,
                    amount_cents = amount,
                    error = %e,
                    "Charge succeeded but profile was not updated"
                );
                e
            })?;

        tracing::info!(
            amount_cents = amount,
            cumulative_cost_cents = profile.cumulative_cost_cents(),
            "Offset charged"
        );

        Ok(ChargeOffsetResult {
            charged_cents: amount,
            remote_customer_id: request.remote_customer_id,
            cumulative_cost_cents: profile.cumulative_cost_cents(),
            total_offset_history_cents: profile.total_offset_history_cents().unwrap_or(0),
        })
    }

    /// Ephemeral key blob for the client-side payment SDK.
    pub async fn ephemeral_key(
        &self,
        api_version: &str,
    ) -> Result<serde_json::Value, ChargeOffsetError> {
        Ok(self.gateway.issue_ephemeral_key(api_version).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::{GatewayCall, MockAuthGateway};
    use crate::adapters::storage::InMemoryByteStore;
    use crate::domain::profile::Profile;
    use crate::ports::GatewayErrorCode;

    struct Fixture {
        gateway: Arc<MockAuthGateway>,
        bytes: Arc<InMemoryByteStore>,
        profiles: Arc<ProfileStore>,
        handler: OffsetChargeHandler,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(MockAuthGateway::new());
        let bytes = Arc::new(InMemoryByteStore::new());
        let profiles = Arc::new(ProfileStore::new(bytes.clone()));
        let handler = OffsetChargeHandler::new(gateway.clone(), profiles.clone());
        Fixture {
            gateway,
            bytes,
            profiles,
            handler,
        }
    }

    fn command(amount_cents: i64) -> ChargeOffsetCommand {
        ChargeOffsetCommand {
            payment_token: "src_visa".to_string(),
            amount_cents,
            currency: "usd".to_string(),
        }
    }

    #[tokio::test]
    async fn ensure_customer_stores_new_identity() {
        let f = fixture();
        f.gateway.set_customer_id("cus_new");

        let id = f.handler.ensure_customer().await.unwrap();

        assert_eq!(id, "cus_new");
        assert_eq!(f.profiles.load().await.payment_identity(), Some("cus_new"));
        assert_eq!(f.gateway.calls(), vec![GatewayCall::Authenticate(None)]);
    }

    #[tokio::test]
    async fn ensure_customer_with_known_identity_writes_nothing() {
        let f = fixture();
        let mut profile = Profile::default();
        profile.set_payment_identity("cus_known");
        f.profiles.save(&profile).await.unwrap();

        let id = f.handler.ensure_customer().await.unwrap();

        assert_eq!(id, "cus_known");
        assert_eq!(f.bytes.write_count(), 1);
        assert_eq!(
            f.gateway.calls(),
            vec![GatewayCall::Authenticate(Some("cus_known".to_string()))]
        );
    }

    #[tokio::test]
    async fn ensure_customer_surfaces_auth_error() {
        let f = fixture();
        f.gateway.set_error("authenticate", GatewayError::auth("unknown customer"));

        let err = f.handler.ensure_customer().await.unwrap_err();

        assert!(matches!(err, ChargeOffsetError::Gateway(ref e) if e.code == GatewayErrorCode::AuthError));
        assert_eq!(f.profiles.load().await.payment_identity(), None);
    }

    #[tokio::test]
    async fn charge_authenticates_then_records() {
        let f = fixture();
        f.gateway.set_customer_id("cus_fresh");

        let result = f.handler.handle(command(34)).await.unwrap();

        assert_eq!(
            result,
            ChargeOffsetResult {
                charged_cents: 34,
                remote_customer_id: "cus_fresh".to_string(),
                cumulative_cost_cents: 34,
                total_offset_history_cents: 34,
            }
        );
        let charges = f.gateway.charges();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].remote_customer_id, "cus_fresh");
        assert_eq!(charges[0].payment_token, "src_visa");

        let profile = f.profiles.load().await;
        assert_eq!(profile.last_charge_cents(), Some(34));
        assert_eq!(profile.payment_identity(), Some("cus_fresh"));
    }

    #[tokio::test]
    async fn charge_accumulates_across_calls() {
        let f = fixture();

        f.handler.handle(command(3)).await.unwrap();
        let result = f.handler.handle(command(5)).await.unwrap();

        assert_eq!(result.cumulative_cost_cents, 8);
        assert_eq!(result.total_offset_history_cents, 8);
        // Authenticated once, then reused the stored identity.
        assert_eq!(
            f.gateway
                .calls()
                .iter()
                .filter(|call| matches!(call, GatewayCall::Authenticate(_)))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn every_charge_gets_a_fresh_idempotency_key() {
        let f = fixture();

        f.handler.handle(command(3)).await.unwrap();
        f.handler.handle(command(3)).await.unwrap();

        let charges = f.gateway.charges();
        assert_ne!(charges[0].idempotency_key, charges[1].idempotency_key);
    }

    #[tokio::test]
    async fn declined_charge_leaves_profile_untouched() {
        let f = fixture();
        f.gateway.set_error("charge", GatewayError::declined("card declined").with_status(402));

        let err = f.handler.handle(command(3)).await.unwrap_err();

        assert!(matches!(err, ChargeOffsetError::Gateway(ref e) if e.code == GatewayErrorCode::PaymentDeclined));
        assert!(!err.is_retryable());
        assert_eq!(f.profiles.load().await.cumulative_cost_cents(), 0);
    }

    #[tokio::test]
    async fn unsuccessful_receipt_is_declined() {
        let f = fixture();
        f.gateway.set_charge_success(false);

        let err = f.handler.handle(command(3)).await.unwrap_err();

        assert!(matches!(err, ChargeOffsetError::Gateway(ref e) if e.code == GatewayErrorCode::PaymentDeclined));
        assert_eq!(f.profiles.load().await.last_charge_cents(), None);
    }

    #[tokio::test]
    async fn non_positive_amount_never_reaches_gateway() {
        let f = fixture();

        let err = f.handler.handle(command(0)).await.unwrap_err();

        assert!(matches!(err, ChargeOffsetError::Invalid(_)));
        assert_eq!(f.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_currency_is_rejected_before_authentication() {
        let f = fixture();
        let cmd = ChargeOffsetCommand {
            currency: "dollars".to_string(),
            ..command(3)
        };

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, ChargeOffsetError::Invalid(_)));
        assert_eq!(f.gateway.call_count(), 0);
        assert_eq!(f.bytes.write_count(), 0);
        assert_eq!(f.profiles.load().await.payment_identity(), None);
    }

    #[tokio::test]
    async fn network_failure_is_retryable() {
        let f = fixture();
        f.gateway.set_error("charge", GatewayError::network("connection reset"));

        let err = f.handler.handle(command(3)).await.unwrap_err();

        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn ephemeral_key_passes_through() {
        let f = fixture();
        f.gateway.set_ephemeral_key(serde_json::json!({"id": "ephkey_1"}));

        let key = f.handler.ephemeral_key("2020-08-27").await.unwrap();

        assert_eq!(key["id"], "ephkey_1");
        assert_eq!(
            f.gateway.calls(),
            vec![GatewayCall::EphemeralKey("2020-08-27".to_string())]
        );
    }
}
