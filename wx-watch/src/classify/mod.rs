//! Weather risk classification.
//!
//! Turns decoded weather facts into risk tiers with auditable reasons:
//!
//! - [`crosswind_kt`] computes the crosswind component for a runway
//! - [`Minima`] resolves the thresholds for a station's category
//! - [`classify_observation`] classifies the current observation
//! - [`scan_forecast`] finds the worst line of a forecast timeline
//!
//! Everything here is a pure function of its inputs.

mod crosswind;
mod forecast;
mod minima;
mod observation;
mod policy;

pub use crosswind::{crosswind_component, crosswind_kt};
pub use forecast::{LookAhead, scan_forecast};
pub use minima::{MARGINAL_FACTOR, Minima};
pub use observation::classify_observation;
pub use policy::{DEFAULT_CRITICAL_CROSSWIND_KT, HazardRules, Policy, default_hazard_rules};
