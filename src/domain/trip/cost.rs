//! Carbon-offset pricing.
//!
//! The conversion constants are fixed; offsets priced by earlier releases must
//! price identically here.

/// Emission rate substituted when a profile has no vehicle rate (g CO2 / mile).
pub const DEFAULT_EMISSIONS_GRAMS_PER_MILE: f64 = 500.0;

const MILES_PER_METER: f64 = 0.000621371;
const POUNDS_PER_GRAM: f64 = 0.00220462;
const DOLLARS_PER_POUND: f64 = 0.00499;

/// Smallest amount ever quoted.
pub const MINIMUM_COST_CENTS: i64 = 1;

/// Prices the offset for a trip, in cents.
///
/// Rounds to the nearest cent with a one-cent floor. Zero, negative and
/// non-finite inputs never fail; they price at the floor.
pub fn offset_cost_cents(distance_meters: f64, grams_per_mile: f64) -> i64 {
    let miles = distance_meters * MILES_PER_METER;
    let grams = miles * grams_per_mile;
    let pounds = grams * POUNDS_PER_GRAM;
    let dollars = pounds * DOLLARS_PER_POUND;

    // `as` saturates and maps NaN to 0, so the floor below still applies.
    let cents = (dollars * 100.0).round() as i64;
    cents.max(MINIMUM_COST_CENTS)
}

/// Formats cents as a dollar amount, e.g. `$0.03`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}
