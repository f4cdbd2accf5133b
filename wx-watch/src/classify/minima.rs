//! Operating minima resolution.

use serde::Serialize;

use crate::domain::Station;

/// Multiplier from the below-minima threshold to the top of the marginal band.
///
/// A policy constant, not per-station configuration.
pub const MARGINAL_FACTOR: u32 = 2;

/// Visibility and ceiling thresholds below which operations are disallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Minima {
    pub visibility_m: u32,
    pub ceiling_ft: u32,
}

impl Minima {
    /// Standard minima: 800 m visibility, 200 ft ceiling.
    pub const STANDARD: Minima = Minima {
        visibility_m: 800,
        ceiling_ft: 200,
    };

    /// Special-category minima: 1500 m visibility, 500 ft ceiling.
    pub const SPECIAL: Minima = Minima {
        visibility_m: 1500,
        ceiling_ft: 500,
    };

    /// Resolve minima from the special-category flag.
    pub fn for_category(special_category: bool) -> Self {
        if special_category {
            Self::SPECIAL
        } else {
            Self::STANDARD
        }
    }

    pub fn for_station(station: &Station) -> Self {
        Self::for_category(station.special_category)
    }

    /// Upper bound (exclusive) of the marginal visibility band.
    pub fn marginal_visibility_m(&self) -> u32 {
        self.visibility_m * MARGINAL_FACTOR
    }

    /// Upper bound (exclusive) of the marginal ceiling band.
    pub fn marginal_ceiling_ft(&self) -> u32 {
        self.ceiling_ft * MARGINAL_FACTOR
    }
}
