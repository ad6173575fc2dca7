//! Trip module - the selected trip and its offset price.

mod cost;
mod model;
mod transit_mode;

pub use cost::{
    format_cents, offset_cost_cents, DEFAULT_EMISSIONS_GRAMS_PER_MILE, MINIMUM_COST_CENTS,
};
pub use model::{StartOrigin, TripModel};
pub use transit_mode::TransitMode;
