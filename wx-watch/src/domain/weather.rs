//! Decoded weather facts: observations and forecast lines.
//!
//! These types hold values that the decoder collaborator has already
//! extracted from METAR/TAF reports. Absent measurements are normalized at
//! ingestion: visibility and ceiling fall back to the "unrestricted"
//! sentinels, wind to absent. What was defaulted is recorded in
//! [`Observation::missing`] so it can be surfaced rather than hidden.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visibility sentinel for "10 km or more / unrestricted".
pub const UNRESTRICTED_VISIBILITY_M: u32 = 9999;

/// Ceiling sentinel for "no broken or overcast layer reported".
pub const UNRESTRICTED_CEILING_FT: u32 = 99_999;

/// Weather phenomena relevant to operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardCode {
    Fog,
    FreezingFog,
    Thunderstorm,
    FreezingRain,
    FreezingDrizzle,
    Snow,
    Hail,
}

impl HazardCode {
    /// Operator-facing description.
    pub fn description(&self) -> &'static str {
        match self {
            HazardCode::Fog => "fog",
            HazardCode::FreezingFog => "freezing fog",
            HazardCode::Thunderstorm => "thunderstorm",
            HazardCode::FreezingRain => "freezing rain",
            HazardCode::FreezingDrizzle => "freezing drizzle",
            HazardCode::Snow => "snow",
            HazardCode::Hail => "hail",
        }
    }
}

impl fmt::Display for HazardCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Wind as reported. Variable direction is reported as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wind {
    /// True direction the wind blows from, in degrees.
    pub direction: Option<u16>,
    /// Sustained speed in knots.
    pub speed_kt: Option<u32>,
    /// Gust speed in knots.
    pub gust_kt: Option<u32>,
}

impl Wind {
    pub fn new(direction: Option<u16>, speed_kt: Option<u32>, gust_kt: Option<u32>) -> Self {
        Self {
            direction,
            speed_kt,
            gust_kt,
        }
    }

    /// The greater of sustained and gust speed, if either was reported.
    pub fn effective_speed_kt(&self) -> Option<u32> {
        match (self.speed_kt, self.gust_kt) {
            (Some(s), Some(g)) => Some(s.max(g)),
            (s, g) => s.or(g),
        }
    }
}

/// The measurable conditions shared by observations and forecast lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    pub visibility_m: u32,
    pub ceiling_ft: u32,
    pub wind: Wind,
    pub hazards: BTreeSet<HazardCode>,
}

impl Conditions {
    /// Unrestricted visibility and ceiling, no wind, no hazards.
    pub fn unrestricted() -> Self {
        Self {
            visibility_m: UNRESTRICTED_VISIBILITY_M,
            ceiling_ft: UNRESTRICTED_CEILING_FT,
            wind: Wind::default(),
            hazards: BTreeSet::new(),
        }
    }

    pub fn with_visibility(mut self, visibility_m: u32) -> Self {
        self.visibility_m = visibility_m;
        self
    }

    pub fn with_ceiling(mut self, ceiling_ft: u32) -> Self {
        self.ceiling_ft = ceiling_ft;
        self
    }

    pub fn with_wind(mut self, wind: Wind) -> Self {
        self.wind = wind;
        self
    }

    pub fn with_hazard(mut self, hazard: HazardCode) -> Self {
        self.hazards.insert(hazard);
        self
    }
}

impl Default for Conditions {
    fn default() -> Self {
        Self::unrestricted()
    }
}

/// Outcome of fetching a station's current report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Ok,
    Unavailable,
}

/// A measurement that was absent from the report and defaulted at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Visibility,
    Ceiling,
    Wind,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MissingField::Visibility => "visibility",
            MissingField::Ceiling => "ceiling",
            MissingField::Wind => "wind",
        })
    }
}

/// Current weather snapshot for one station, created fresh each poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub status: FetchStatus,
    pub conditions: Conditions,
    /// Raw report text for operator display.
    pub raw: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
    /// Measurements that were absent and replaced by defaults.
    pub missing: BTreeSet<MissingField>,
}

impl Observation {
    /// A successfully fetched observation with the given conditions.
    pub fn new(conditions: Conditions) -> Self {
        Self {
            status: FetchStatus::Ok,
            conditions,
            raw: None,
            observed_at: None,
            missing: BTreeSet::new(),
        }
    }

    /// An observation for a station whose fetch failed.
    pub fn unavailable() -> Self {
        Self {
            status: FetchStatus::Unavailable,
            ..Self::new(Conditions::unrestricted())
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn with_missing(mut self, field: MissingField) -> Self {
        self.missing.insert(field);
        self
    }

    pub fn is_available(&self) -> bool {
        self.status == FetchStatus::Ok
    }
}

/// Validity window of a forecast line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ValidityWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for ValidityWindow {
    /// Formats as `16/0600Z-16/1200Z` (day/hour-minute, UTC).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%d/%H%MZ"),
            self.end.format("%d/%H%MZ")
        )
    }
}

/// One validity segment of a station's forecast timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastLine {
    pub window: ValidityWindow,
    pub conditions: Conditions,
    /// TEMPO/PROB line rather than an unconditional change.
    pub conditional: bool,
    pub raw: Option<String>,
}

impl ForecastLine {
    pub fn new(window: ValidityWindow, conditions: Conditions) -> Self {
        Self {
            window,
            conditions,
            conditional: false,
            raw: None,
        }
    }

    pub fn conditional(mut self) -> Self {
        self.conditional = true;
        self
    }
}
