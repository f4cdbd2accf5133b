//! Observation classification.
//!
//! Precedence is strict: an unavailable fetch short-circuits everything,
//! then red conditions, then amber conditions. Within the reached tier every
//! matching condition contributes a reason, in evaluation order.

use crate::domain::{
    Conditions, Observation, Reason, RiskClassification, RiskTier, Station,
};

use super::crosswind::crosswind_kt;
use super::minima::Minima;
use super::policy::Policy;

/// Tier and reasons for one set of conditions (observation or forecast line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Assessment {
    pub tier: RiskTier,
    pub reasons: Vec<Reason>,
    pub crosswind_kt: u32,
    /// A fleet-disqualifying hazard was present.
    pub disqualified: bool,
}

/// Apply the red/amber rules to `conditions` for `station`.
pub(crate) fn assess(
    station: &Station,
    minima: &Minima,
    conditions: &Conditions,
    policy: &Policy,
) -> Assessment {
    let crosswind = crosswind_kt(&conditions.wind, station.runway_heading());

    let mut red = Vec::new();
    if conditions.visibility_m < minima.visibility_m {
        red.push(Reason::VisibilityBelowMinima {
            visibility_m: conditions.visibility_m,
        });
    }
    if conditions.ceiling_ft < minima.ceiling_ft {
        red.push(Reason::CeilingBelowMinima {
            ceiling_ft: conditions.ceiling_ft,
        });
    }
    if crosswind >= policy.critical_crosswind_kt {
        red.push(Reason::CrosswindCritical {
            crosswind_kt: crosswind,
        });
    }
    let mut disqualified = false;
    for &hazard in &conditions.hazards {
        if policy.hazard_rules.is_disqualifying(&station.fleet, hazard) {
            disqualified = true;
            red.push(Reason::DisqualifyingHazard {
                hazard,
                fleet: station.fleet.clone(),
            });
        }
    }

    if !red.is_empty() {
        return Assessment {
            tier: RiskTier::Red,
            reasons: red,
            crosswind_kt: crosswind,
            disqualified,
        };
    }

    let mut amber = Vec::new();
    if conditions.visibility_m < minima.marginal_visibility_m() {
        amber.push(Reason::VisibilityMarginal {
            visibility_m: conditions.visibility_m,
        });
    }
    if conditions.ceiling_ft < minima.marginal_ceiling_ft() {
        amber.push(Reason::CeilingMarginal {
            ceiling_ft: conditions.ceiling_ft,
        });
    }
    if policy
        .marginal_crosswind_kt
        .is_some_and(|limit| crosswind >= limit)
    {
        amber.push(Reason::CrosswindMarginal {
            crosswind_kt: crosswind,
        });
    }
    // Every hazard left here is non-disqualifying for this fleet.
    amber.extend(conditions.hazards.iter().copied().map(Reason::Hazard));

    let tier = if amber.is_empty() {
        RiskTier::Green
    } else {
        RiskTier::Amber
    };

    Assessment {
        tier,
        reasons: amber,
        crosswind_kt: crosswind,
        disqualified: false,
    }
}

/// Classify a station's current observation.
///
/// Pure: the same inputs always produce the same classification.
pub fn classify_observation(
    station: &Station,
    observation: &Observation,
    policy: &Policy,
) -> RiskClassification {
    if !observation.is_available() {
        return RiskClassification::unavailable("no current observation");
    }

    let minima = Minima::for_station(station);
    let assessment = assess(station, &minima, &observation.conditions, policy);
    let incomplete: Vec<_> = observation.missing.iter().copied().collect();

    let mut classification = RiskClassification {
        tier: assessment.tier,
        reasons: assessment.reasons,
        crosswind_kt: assessment.crosswind_kt,
        incomplete,
    };

    if policy.incomplete_data_is_amber
        && classification.tier == RiskTier::Green
        && !classification.incomplete.is_empty()
    {
        classification.tier = RiskTier::Amber;
        classification.reasons = classification
            .incomplete
            .iter()
            .copied()
            .map(Reason::DataIncomplete)
            .collect();
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Fleet, HazardCode, IcaoCode, MissingField, Position, UNRESTRICTED_CEILING_FT, Wind,
    };

    fn station(special: bool) -> Station {
        let station = Station::new(IcaoCode::parse("EGLC").unwrap(), Position::new(51.505, 0.055))
            .with_runway_heading(270)
            .with_fleet("cityflyer");
        if special { station.special() } else { station }
    }

    fn observation(visibility_m: u32, ceiling_ft: u32) -> Observation {
        Observation::new(
            Conditions::unrestricted()
                .with_visibility(visibility_m)
                .with_ceiling(ceiling_ft),
        )
    }

    fn reasons(classification: &RiskClassification) -> Vec<String> {
        classification.reasons.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn low_visibility_standard_station_is_red() {
        let obs = observation(600, 9999).with_missing(MissingField::Wind);
        let result = classify_observation(&station(false), &obs, &Policy::default());

        assert_eq!(result.tier, RiskTier::Red);
        assert_eq!(reasons(&result), vec!["visibility below minima: 600m"]);
        assert_eq!(result.crosswind_kt, 0);
        assert_eq!(result.incomplete, vec![MissingField::Wind]);
    }

    #[test]
    fn special_category_below_minima_is_red() {
        let result = classify_observation(
            &station(true),
            &observation(1400, 9999),
            &Policy::default(),
        );
        assert_eq!(result.tier, RiskTier::Red);
    }

    #[test]
    fn special_category_marginal_band_is_amber() {
        let result = classify_observation(
            &station(true),
            &observation(2000, 9999),
            &Policy::default(),
        );
        assert_eq!(result.tier, RiskTier::Amber);
        assert_eq!(reasons(&result), vec!["visibility marginal: 2000m"]);
    }

    #[test]
    fn low_ceiling_is_red_and_marginal_ceiling_is_amber() {
        let policy = Policy::default();
        let red = classify_observation(&station(false), &observation(9999, 150), &policy);
        assert_eq!(red.tier, RiskTier::Red);
        assert_eq!(reasons(&red), vec!["ceiling below minima: 150ft"]);

        let amber = classify_observation(&station(false), &observation(9999, 300), &policy);
        assert_eq!(amber.tier, RiskTier::Amber);
        assert_eq!(reasons(&amber), vec!["ceiling marginal: 300ft"]);
    }

    #[test]
    fn threshold_values_are_not_below() {
        let policy = Policy::default();
        let at_minima = classify_observation(&station(false), &observation(800, 200), &policy);
        assert_eq!(at_minima.tier, RiskTier::Amber);

        let at_marginal = classify_observation(&station(false), &observation(1600, 400), &policy);
        assert_eq!(at_marginal.tier, RiskTier::Green);
    }

    #[test]
    fn direct_crosswind_is_red() {
        let obs = Observation::new(
            Conditions::unrestricted().with_wind(Wind::new(Some(0), Some(30), None)),
        );
        let result = classify_observation(&station(false), &obs, &Policy::default());
        assert_eq!(result.tier, RiskTier::Red);
        assert_eq!(reasons(&result), vec!["crosswind 30kt"]);
        assert_eq!(result.crosswind_kt, 30);
    }

    #[test]
    fn headwind_is_green() {
        let obs = Observation::new(
            Conditions::unrestricted().with_wind(Wind::new(Some(90), Some(30), Some(0))),
        );
        let result = classify_observation(&station(false), &obs, &Policy::default());
        assert_eq!(result.tier, RiskTier::Green);
        assert!(result.reasons.is_empty());
        assert_eq!(result.crosswind_kt, 0);
    }

    #[test]
    fn crosswind_at_critical_value_is_red() {
        // 25 × sin(90°) on runway 270 from 000°
        let obs = Observation::new(
            Conditions::unrestricted().with_wind(Wind::new(Some(0), Some(25), None)),
        );
        let result = classify_observation(&station(false), &obs, &Policy::default());
        assert_eq!(result.tier, RiskTier::Red);
    }

    #[test]
    fn marginal_crosswind_only_when_configured() {
        let obs = Observation::new(
            Conditions::unrestricted().with_wind(Wind::new(Some(0), Some(20), None)),
        );
        let default = classify_observation(&station(false), &obs, &Policy::default());
        assert_eq!(default.tier, RiskTier::Green);

        let policy = Policy::default().with_marginal_crosswind(18);
        let result = classify_observation(&station(false), &obs, &policy);
        assert_eq!(result.tier, RiskTier::Amber);
        assert_eq!(reasons(&result), vec!["crosswind marginal: 20kt"]);
    }

    #[test]
    fn disqualifying_hazard_depends_on_fleet() {
        let obs = Observation::new(Conditions::unrestricted().with_hazard(HazardCode::FreezingRain));
        let policy = Policy::default();

        let cityflyer = classify_observation(&station(false), &obs, &policy);
        assert_eq!(cityflyer.tier, RiskTier::Red);
        assert_eq!(
            reasons(&cityflyer),
            vec!["freezing rain (disqualifying for cityflyer)"]
        );

        let euroflyer_station = station(false).with_fleet("euroflyer");
        let euroflyer = classify_observation(&euroflyer_station, &obs, &policy);
        assert_eq!(euroflyer.tier, RiskTier::Amber);
        assert_eq!(reasons(&euroflyer), vec!["freezing rain"]);
    }

    #[test]
    fn unknown_fleet_is_still_classified() {
        let obs = Observation::new(
            Conditions::unrestricted()
                .with_visibility(1000)
                .with_hazard(HazardCode::FreezingDrizzle),
        );
        let adhoc = Station::new(IcaoCode::parse("LFPG").unwrap(), Position::new(49.0, 2.5))
            .with_fleet(Fleet::new("charter"));
        let result = classify_observation(&adhoc, &obs, &Policy::default());
        assert_eq!(result.tier, RiskTier::Amber);
        assert_eq!(
            reasons(&result),
            vec!["visibility marginal: 1000m", "freezing drizzle"]
        );
    }

    #[test]
    fn red_accumulates_all_red_reasons_and_drops_amber_ones() {
        let obs = Observation::new(
            Conditions::unrestricted()
                .with_visibility(400)
                .with_ceiling(100)
                .with_wind(Wind::new(Some(0), Some(26), None))
                .with_hazard(HazardCode::Fog),
        );
        let result = classify_observation(&station(false), &obs, &Policy::default());
        assert_eq!(result.tier, RiskTier::Red);
        assert_eq!(
            reasons(&result),
            vec![
                "visibility below minima: 400m",
                "ceiling below minima: 100ft",
                "crosswind 26kt",
            ]
        );
    }

    #[test]
    fn amber_accumulates_all_amber_reasons() {
        let obs = Observation::new(
            Conditions::unrestricted()
                .with_visibility(1200)
                .with_ceiling(300)
                .with_hazard(HazardCode::Fog)
                .with_hazard(HazardCode::Thunderstorm),
        );
        let result = classify_observation(&station(false), &obs, &Policy::default());
        assert_eq!(result.tier, RiskTier::Amber);
        assert_eq!(
            reasons(&result),
            vec![
                "visibility marginal: 1200m",
                "ceiling marginal: 300ft",
                "fog",
                "thunderstorm",
            ]
        );
    }

    #[test]
    fn unavailable_overrides_everything() {
        let mut obs = Observation::unavailable();
        obs.conditions = Conditions::unrestricted().with_visibility(100);
        let result = classify_observation(&station(false), &obs, &Policy::default());
        assert_eq!(result.tier, RiskTier::Unavailable);
    }

    #[test]
    fn missing_heading_degrades_crosswind_to_zero() {
        let obs = Observation::new(
            Conditions::unrestricted().with_wind(Wind::new(Some(0), Some(40), None)),
        );
        let adhoc = Station::new(IcaoCode::parse("EGSS").unwrap(), Position::new(51.885, 0.235));
        let result = classify_observation(&adhoc, &obs, &Policy::default());
        assert_eq!(result.tier, RiskTier::Green);
        assert_eq!(result.crosswind_kt, 0);
    }

    #[test]
    fn incomplete_data_escalates_only_when_enabled() {
        let obs = Observation::new(Conditions::unrestricted())
            .with_missing(MissingField::Visibility)
            .with_missing(MissingField::Wind);

        let default = classify_observation(&station(false), &obs, &Policy::default());
        assert_eq!(default.tier, RiskTier::Green);
        assert_eq!(
            default.incomplete,
            vec![MissingField::Visibility, MissingField::Wind]
        );

        let policy = Policy::default().with_incomplete_data_is_amber(true);
        let escalated = classify_observation(&station(false), &obs, &policy);
        assert_eq!(escalated.tier, RiskTier::Amber);
        assert_eq!(
            reasons(&escalated),
            vec!["data incomplete: visibility", "data incomplete: wind"]
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let obs = Observation::new(
            Conditions::unrestricted()
                .with_visibility(1100)
                .with_ceiling(UNRESTRICTED_CEILING_FT)
                .with_wind(Wind::new(Some(330), Some(18), Some(31))),
        );
        let policy = Policy::default();
        let first = classify_observation(&station(true), &obs, &policy);
        let second = classify_observation(&station(true), &obs, &policy);
        assert_eq!(first, second);
    }
}
