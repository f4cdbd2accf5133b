//! Diversion advisory.
//!
//! Recommends an alternate for a station that is below limits: a preferred
//! alternate from the override table when one is green, otherwise the
//! nearest green station by great-circle distance.

mod alternates;
mod planner;

pub use alternates::{PreferredAlternates, PreferredAlternatesBuilder, default_alternates};
pub use planner::{DiversionRecommendation, EARTH_RADIUS_NM, haversine_nm, recommend};
