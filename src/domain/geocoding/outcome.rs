//! Terminal outcomes of a geocoding query.

use crate::domain::foundation::Placemark;

use super::GeocodeError;

/// What the caller observes for a query that was still current on completion.
///
/// Superseded queries produce no outcome at all.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    /// Forward lookup results in provider order.
    Matches(Vec<Placemark>),
    /// Canonical name for a reverse lookup.
    Resolved(Placemark),
    /// Provider answered with no results.
    Empty,
    /// Provider failed.
    Failed(GeocodeError),
    /// Blank forward text; nothing was looked up.
    NoActiveQuery,
}

impl GeocodeOutcome {
    /// Builds the outcome for a forward lookup result list.
    pub fn from_forward(results: Vec<Placemark>) -> Self {
        if results.is_empty() {
            GeocodeOutcome::Empty
        } else {
            GeocodeOutcome::Matches(results)
        }
    }

    /// Builds the outcome for a reverse lookup; only the first result is kept.
    pub fn from_reverse(results: Vec<Placemark>) -> Self {
        match results.into_iter().next() {
            Some(first) => GeocodeOutcome::Resolved(first),
            None => GeocodeOutcome::Empty,
        }
    }
}
