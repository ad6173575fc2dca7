//! Profile entity - the installation's vehicle, payment identity and spend.

use crate::domain::foundation::ValidationError;
use crate::domain::trip::DEFAULT_EMISSIONS_GRAMS_PER_MILE;

use super::schema::CURRENT_SCHEMA_VERSION;

/// The single user profile of an installation.
///
/// `cumulative_cost_cents` is spend since the last `reset_cumulative`;
/// `total_offset_history_cents` is lifetime spend and is never reset.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub(super) vehicle_make: Option<String>,
    pub(super) vehicle_model: Option<String>,
    pub(super) vehicle_year: Option<String>,
    pub(super) emission_grams_per_mile: Option<f64>,
    pub(super) payment_identity: Option<String>,
    pub(super) cumulative_cost_cents: i64,
    pub(super) last_charge_cents: Option<i64>,
    pub(super) total_offset_history_cents: Option<i64>,
    pub(super) schema_version: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            vehicle_make: None,
            vehicle_model: None,
            vehicle_year: None,
            emission_grams_per_mile: None,
            payment_identity: None,
            cumulative_cost_cents: 0,
            last_charge_cents: None,
            total_offset_history_cents: None,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }
}

impl Profile {
    pub fn vehicle_make(&self) -> Option<&str> {
        self.vehicle_make.as_deref()
    }

    pub fn vehicle_model(&self) -> Option<&str> {
        self.vehicle_model.as_deref()
    }

    pub fn vehicle_year(&self) -> Option<&str> {
        self.vehicle_year.as_deref()
    }

    /// Stored vehicle rate, `None` when the user never picked one.
    pub fn emission_grams_per_mile(&self) -> Option<f64> {
        self.emission_grams_per_mile
    }

    /// Rate used for pricing. Falls back to the default without storing it.
    pub fn emission_rate(&self) -> f64 {
        self.emission_grams_per_mile
            .unwrap_or(DEFAULT_EMISSIONS_GRAMS_PER_MILE)
    }

    pub fn payment_identity(&self) -> Option<&str> {
        self.payment_identity.as_deref()
    }

    pub fn cumulative_cost_cents(&self) -> i64 {
        self.cumulative_cost_cents
    }

    pub fn last_charge_cents(&self) -> Option<i64> {
        self.last_charge_cents
    }

    pub fn total_offset_history_cents(&self) -> Option<i64> {
        self.total_offset_history_cents
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Replaces the selected vehicle.
    pub fn set_vehicle(
        &mut self,
        make: Option<String>,
        model: Option<String>,
        year: Option<String>,
        emission_grams_per_mile: Option<f64>,
    ) -> Result<(), ValidationError> {
        if let Some(rate) = emission_grams_per_mile {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ValidationError::out_of_range(
                    "emission_grams_per_mile",
                    0.0,
                    f64::MAX,
                    rate,
                ));
            }
        }
        self.vehicle_make = make;
        self.vehicle_model = model;
        self.vehicle_year = year;
        self.emission_grams_per_mile = emission_grams_per_mile;
        Ok(())
    }

    pub fn set_payment_identity(&mut self, identity: impl Into<String>) {
        self.payment_identity = Some(identity.into());
    }

    /// Applies a successful charge to every spend counter at once.
    pub fn record_charge(&mut self, amount_cents: i64) -> Result<(), ValidationError> {
        if amount_cents <= 0 {
            return Err(ValidationError::out_of_range(
                "amount_cents",
                1.0,
                i64::MAX as f64,
                amount_cents as f64,
            ));
        }
        let total = self.total_offset_history_cents.unwrap_or(0);

        self.cumulative_cost_cents = self.cumulative_cost_cents.saturating_add(amount_cents);
        self.last_charge_cents = Some(amount_cents);
        self.total_offset_history_cents = Some(total.saturating_add(amount_cents));
        Ok(())
    }

    /// Starts a new spend period. Lifetime history is kept.
    pub fn reset_cumulative(&mut self) {
        self.cumulative_cost_cents = 0;
    }
}
