//! Classification output records.

use std::fmt;

use serde::{Serialize, Serializer};

use super::station::Fleet;
use super::weather::{HazardCode, MissingField, ValidityWindow};

/// Risk tier for a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Green,
    Amber,
    Red,
    Unavailable,
}

impl RiskTier {
    /// Rank of the weather tiers: green < amber < red.
    ///
    /// `Unavailable` is not a weather tier and ranks with green.
    pub fn severity(&self) -> u8 {
        match self {
            RiskTier::Green | RiskTier::Unavailable => 0,
            RiskTier::Amber => 1,
            RiskTier::Red => 2,
        }
    }

    pub fn is_more_severe_than(&self, other: &RiskTier) -> bool {
        self.severity() > other.severity()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Green => "green",
            RiskTier::Amber => "amber",
            RiskTier::Red => "red",
            RiskTier::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a station was placed in its tier.
///
/// Reasons render to the operator-facing strings shown in alerts and the
/// handover log, and serialize as those strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    VisibilityBelowMinima { visibility_m: u32 },
    CeilingBelowMinima { ceiling_ft: u32 },
    CrosswindCritical { crosswind_kt: u32 },
    DisqualifyingHazard { hazard: HazardCode, fleet: Fleet },
    VisibilityMarginal { visibility_m: u32 },
    CeilingMarginal { ceiling_ft: u32 },
    CrosswindMarginal { crosswind_kt: u32 },
    Hazard(HazardCode),
    ForecastDeterioration { tier: RiskTier, window: Option<ValidityWindow> },
    DataIncomplete(MissingField),
    Unavailable { detail: String },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::VisibilityBelowMinima { visibility_m } => {
                write!(f, "visibility below minima: {visibility_m}m")
            }
            Reason::CeilingBelowMinima { ceiling_ft } => {
                write!(f, "ceiling below minima: {ceiling_ft}ft")
            }
            Reason::CrosswindCritical { crosswind_kt } => write!(f, "crosswind {crosswind_kt}kt"),
            Reason::DisqualifyingHazard { hazard, fleet } => {
                write!(f, "{hazard} (disqualifying for {fleet})")
            }
            Reason::VisibilityMarginal { visibility_m } => {
                write!(f, "visibility marginal: {visibility_m}m")
            }
            Reason::CeilingMarginal { ceiling_ft } => write!(f, "ceiling marginal: {ceiling_ft}ft"),
            Reason::CrosswindMarginal { crosswind_kt } => {
                write!(f, "crosswind marginal: {crosswind_kt}kt")
            }
            Reason::Hazard(hazard) => write!(f, "{hazard}"),
            Reason::ForecastDeterioration { tier, window } => {
                write!(f, "forecast deterioration to {tier}")?;
                if let Some(window) = window {
                    write!(f, " ({window})")?;
                }
                Ok(())
            }
            Reason::DataIncomplete(field) => write!(f, "data incomplete: {field}"),
            Reason::Unavailable { detail } => write!(f, "data unavailable: {detail}"),
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Classification of a station's current observation.
///
/// Superseded wholesale by the next cycle's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskClassification {
    pub tier: RiskTier,
    /// Reasons at the reached tier, in evaluation order.
    pub reasons: Vec<Reason>,
    /// Computed crosswind component in whole knots.
    pub crosswind_kt: u32,
    /// Measurements that were missing and defaulted before classification.
    pub incomplete: Vec<MissingField>,
}

impl RiskClassification {
    /// Classification for a station whose fetch failed.
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            tier: RiskTier::Unavailable,
            reasons: vec![Reason::Unavailable {
                detail: detail.into(),
            }],
            crosswind_kt: 0,
            incomplete: Vec::new(),
        }
    }

    /// Escalate a green classification to amber when the forecast shows risk.
    ///
    /// Non-green classifications are returned unchanged.
    pub fn with_forecast_trend(mut self, forecast: &ForecastRisk) -> Self {
        if self.tier == RiskTier::Green && !forecast.is_clear() {
            self.tier = RiskTier::Amber;
            self.reasons = vec![Reason::ForecastDeterioration {
                tier: forecast.tier,
                window: forecast.window,
            }];
        }
        self
    }

    /// Whether this station belongs in the alert registry.
    pub fn is_alert(&self) -> bool {
        matches!(self.tier, RiskTier::Red | RiskTier::Amber)
    }
}

/// Worst-case forecast outlook for a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastRisk {
    pub tier: RiskTier,
    pub reasons: Vec<Reason>,
    /// Validity window of the winning forecast line.
    pub window: Option<ValidityWindow>,
    /// Whether the winning line is conditional (TEMPO/PROB).
    pub probabilistic: bool,
}

impl ForecastRisk {
    /// A forecast with no issue within the horizon.
    pub fn clear() -> Self {
        Self {
            tier: RiskTier::Green,
            reasons: Vec::new(),
            window: None,
            probabilistic: false,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.tier.severity() == 0
    }

    /// One-line summary of the reasons, joined with `; `.
    pub fn summary(&self) -> String {
        let reasons: Vec<String> = self.reasons.iter().map(ToString::to_string).collect();
        reasons.join("; ")
    }
}
