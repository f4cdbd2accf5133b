//! Operational policy constants for classification.
//!
//! These encode rules that change by fleet and aircraft type over time, so
//! they are loaded from configuration rather than hard-coded in the
//! classifier.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{Fleet, HazardCode};

/// Default crosswind at or above which a station is below limits (knots).
pub const DEFAULT_CRITICAL_CROSSWIND_KT: u32 = 25;

/// Per-fleet table of hazards that disqualify operations outright.
///
/// A hazard not listed for a fleet is still cautionary (amber) when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HazardRules {
    disqualifying: HashMap<Fleet, BTreeSet<HazardCode>>,
}

impl HazardRules {
    /// An empty table: no hazard is disqualifying for any fleet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark hazards as disqualifying for a fleet.
    pub fn with_rule(mut self, fleet: impl Into<Fleet>, hazards: &[HazardCode]) -> Self {
        self.disqualifying
            .entry(fleet.into())
            .or_default()
            .extend(hazards.iter().copied());
        self
    }

    /// Whether `hazard` disqualifies operations for `fleet`.
    pub fn is_disqualifying(&self, fleet: &Fleet, hazard: HazardCode) -> bool {
        self.disqualifying
            .get(fleet)
            .is_some_and(|hazards| hazards.contains(&hazard))
    }

    /// Whether the table has an entry for `fleet`.
    pub fn knows_fleet(&self, fleet: &Fleet) -> bool {
        self.disqualifying.contains_key(fleet)
    }

    /// Fleets with at least one rule.
    pub fn fleets(&self) -> impl Iterator<Item = &Fleet> {
        self.disqualifying.keys()
    }
}

/// The default rule table.
///
/// The Cityflyer fleet's aircraft are not cleared to depart or land in
/// freezing precipitation; the Euroflyer fleet treats it as cautionary.
pub fn default_hazard_rules() -> HazardRules {
    HazardRules::new()
        .with_rule(
            "cityflyer",
            &[HazardCode::FreezingRain, HazardCode::FreezingDrizzle],
        )
        .with_rule("euroflyer", &[])
}

/// Classification policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    /// Crosswind at or above which a station is red (knots).
    pub critical_crosswind_kt: u32,

    /// Crosswind at or above which a station is amber, if set (knots).
    pub marginal_crosswind_kt: Option<u32>,

    /// Hazards that disqualify operations, per fleet.
    pub hazard_rules: HazardRules,

    /// Escalate a green station to amber when its forecast shows risk.
    pub forecast_degrades_current: bool,

    /// Escalate a green station to amber when measurements were missing.
    pub incomplete_data_is_amber: bool,

    /// Per-fleet aircraft crosswind limits, shown to operators for reference.
    /// Not used for classification.
    pub crosswind_reference_kt: BTreeMap<Fleet, u32>,
}

impl Policy {
    pub fn with_critical_crosswind(mut self, knots: u32) -> Self {
        self.critical_crosswind_kt = knots;
        self
    }

    pub fn with_marginal_crosswind(mut self, knots: u32) -> Self {
        self.marginal_crosswind_kt = Some(knots);
        self
    }

    pub fn with_hazard_rules(mut self, rules: HazardRules) -> Self {
        self.hazard_rules = rules;
        self
    }

    pub fn with_forecast_degrades_current(mut self, enabled: bool) -> Self {
        self.forecast_degrades_current = enabled;
        self
    }

    pub fn with_incomplete_data_is_amber(mut self, enabled: bool) -> Self {
        self.incomplete_data_is_amber = enabled;
        self
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            critical_crosswind_kt: DEFAULT_CRITICAL_CROSSWIND_KT,
            marginal_crosswind_kt: None,
            hazard_rules: default_hazard_rules(),
            forecast_degrades_current: true,
            incomplete_data_is_amber: false,
            crosswind_reference_kt: BTreeMap::from([
                (Fleet::new("cityflyer"), 30),
                (Fleet::new("euroflyer"), 38),
            ]),
        }
    }
}
