//! Forecast timeline scanning.
//!
//! Each forecast line is classified with the same rules as an observation.
//! The scan keeps the single worst line, which supplies the validity window
//! and the probabilistic flag of the result.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{ForecastLine, ForecastRisk, RiskTier, Station};

use super::minima::Minima;
use super::observation::{Assessment, assess};
use super::policy::Policy;

/// How far ahead of now forecast lines are considered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookAhead {
    /// The whole published timeline.
    #[default]
    Full,
    /// Lines that are still valid and start within the given duration.
    Within(Duration),
}

impl LookAhead {
    fn includes(&self, line: &ForecastLine, now: DateTime<Utc>) -> bool {
        match self {
            LookAhead::Full => true,
            LookAhead::Within(horizon) => {
                line.window.end > now && line.window.start <= now + *horizon
            }
        }
    }
}

/// Find the most severe forecast line for a station.
///
/// A line replaces the running worst when its tier is strictly more severe,
/// or when the tier is equal and its visibility is lower (ceiling breaks a
/// visibility tie). A line carrying a hazard that disqualifies the station's
/// fleet wins outright and ends the scan.
///
/// An empty timeline, or one whose worst line is green, yields
/// [`ForecastRisk::clear`]: missing forecast data is not evidence of risk.
pub fn scan_forecast(
    station: &Station,
    minima: &Minima,
    lines: &[ForecastLine],
    look_ahead: LookAhead,
    now: DateTime<Utc>,
    policy: &Policy,
) -> ForecastRisk {
    let mut worst: Option<(&ForecastLine, Assessment)> = None;

    for line in lines.iter().filter(|l| look_ahead.includes(l, now)) {
        let assessment = assess(station, minima, &line.conditions, policy);

        if assessment.disqualified {
            worst = Some((line, assessment));
            break;
        }

        let replace = match &worst {
            None => true,
            Some((current, current_assessment)) => {
                assessment.tier.is_more_severe_than(&current_assessment.tier)
                    || (assessment.tier == current_assessment.tier
                        && has_worse_conditions(line, current))
            }
        };

        if replace {
            worst = Some((line, assessment));
        }
    }

    match worst {
        Some((line, assessment)) if assessment.tier != RiskTier::Green => ForecastRisk {
            tier: assessment.tier,
            reasons: assessment.reasons,
            window: Some(line.window),
            probabilistic: line.conditional,
        },
        _ => ForecastRisk::clear(),
    }
}

fn has_worse_conditions(candidate: &ForecastLine, current: &ForecastLine) -> bool {
    let a = &candidate.conditions;
    let b = &current.conditions;
    (a.visibility_m, a.ceiling_ft) < (b.visibility_m, b.ceiling_ft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Conditions, HazardCode, IcaoCode, Position, ValidityWindow, Wind};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 6, 0, 0).unwrap()
    }

    fn window(start_hour: i64, end_hour: i64) -> ValidityWindow {
        ValidityWindow::new(
            now() + Duration::hours(start_hour),
            now() + Duration::hours(end_hour),
        )
    }

    fn line(start_hour: i64, end_hour: i64, conditions: Conditions) -> ForecastLine {
        ForecastLine::new(window(start_hour, end_hour), conditions)
    }

    fn station(fleet: &str) -> Station {
        Station::new(IcaoCode::parse("EGLC").unwrap(), Position::new(51.505, 0.055))
            .with_runway_heading(270)
            .with_fleet(fleet)
    }

    fn scan(station: &Station, lines: &[ForecastLine]) -> ForecastRisk {
        scan_forecast(
            station,
            &Minima::for_station(station),
            lines,
            LookAhead::Full,
            now(),
            &Policy::default(),
        )
    }

    #[test]
    fn empty_forecast_is_clear() {
        let risk = scan(&station("cityflyer"), &[]);
        assert_eq!(risk, ForecastRisk::clear());
        assert_eq!(risk.tier, RiskTier::Green);
        assert!(risk.is_clear());
    }

    #[test]
    fn all_green_lines_are_clear() {
        let lines = vec![
            line(0, 6, Conditions::unrestricted()),
            line(6, 12, Conditions::unrestricted().with_visibility(5000)),
        ];
        assert!(scan(&station("cityflyer"), &lines).is_clear());
    }

    #[test]
    fn more_severe_tier_wins() {
        let lines = vec![
            line(0, 6, Conditions::unrestricted().with_visibility(1200)),
            line(6, 12, Conditions::unrestricted().with_visibility(500)),
            line(12, 18, Conditions::unrestricted().with_visibility(1500)),
        ];
        let risk = scan(&station("cityflyer"), &lines);
        assert_eq!(risk.tier, RiskTier::Red);
        assert_eq!(risk.window, Some(window(6, 12)));
        assert_eq!(risk.reasons.len(), 1);
        assert_eq!(risk.reasons[0].to_string(), "visibility below minima: 500m");
    }

    #[test]
    fn equal_tier_with_lower_visibility_wins() {
        let lines = vec![
            line(0, 6, Conditions::unrestricted().with_visibility(700)),
            line(6, 12, Conditions::unrestricted().with_visibility(300)),
            line(12, 18, Conditions::unrestricted().with_visibility(600)),
        ];
        let risk = scan(&station("euroflyer"), &lines);
        assert_eq!(risk.tier, RiskTier::Red);
        assert_eq!(risk.window, Some(window(6, 12)));
    }

    #[test]
    fn ceiling_breaks_visibility_tie() {
        let lines = vec![
            line(0, 6, Conditions::unrestricted().with_visibility(1000).with_ceiling(350)),
            line(6, 12, Conditions::unrestricted().with_visibility(1000).with_ceiling(250)),
        ];
        let risk = scan(&station("euroflyer"), &lines);
        assert_eq!(risk.tier, RiskTier::Amber);
        assert_eq!(risk.window, Some(window(6, 12)));
    }

    #[test]
    fn less_severe_line_never_replaces() {
        let lines = vec![
            line(0, 6, Conditions::unrestricted().with_ceiling(100)),
            line(6, 12, Conditions::unrestricted().with_visibility(900).with_hazard(HazardCode::Fog)),
        ];
        let risk = scan(&station("euroflyer"), &lines);
        assert_eq!(risk.tier, RiskTier::Red);
        assert_eq!(risk.window, Some(window(0, 6)));
    }

    #[test]
    fn disqualifying_hazard_short_circuits() {
        let lines = vec![
            line(0, 6, Conditions::unrestricted().with_hazard(HazardCode::FreezingDrizzle))
                .conditional(),
            line(6, 12, Conditions::unrestricted().with_visibility(100).with_ceiling(0)),
        ];
        let risk = scan(&station("cityflyer"), &lines);
        assert_eq!(risk.tier, RiskTier::Red);
        assert_eq!(risk.window, Some(window(0, 6)));
        assert!(risk.probabilistic);
        assert_eq!(
            risk.summary(),
            "freezing drizzle (disqualifying for cityflyer)"
        );
    }

    #[test]
    fn disqualifying_hazard_replaces_earlier_red_line() {
        let lines = vec![
            line(0, 6, Conditions::unrestricted().with_visibility(100)),
            line(6, 12, Conditions::unrestricted().with_hazard(HazardCode::FreezingRain)),
        ];
        let risk = scan(&station("cityflyer"), &lines);
        assert_eq!(risk.window, Some(window(6, 12)));
        assert!(!risk.probabilistic);
    }

    #[test]
    fn probabilistic_flag_comes_from_winning_line() {
        let lines = vec![
            line(0, 6, Conditions::unrestricted().with_hazard(HazardCode::Thunderstorm)),
            line(
                2,
                4,
                Conditions::unrestricted()
                    .with_visibility(1400)
                    .with_hazard(HazardCode::Thunderstorm),
            )
            .conditional(),
        ];
        let risk = scan(&station("euroflyer"), &lines);
        assert_eq!(risk.tier, RiskTier::Amber);
        assert!(risk.probabilistic);
        assert_eq!(risk.summary(), "visibility marginal: 1400m; thunderstorm");
    }

    #[test]
    fn crosswind_in_forecast_uses_runway_heading() {
        let lines = vec![line(
            0,
            6,
            Conditions::unrestricted().with_wind(Wind::new(Some(360), Some(20), Some(35))),
        )];
        let risk = scan(&station("cityflyer"), &lines);
        assert_eq!(risk.tier, RiskTier::Red);
        assert_eq!(risk.summary(), "crosswind 35kt");
    }

    #[test]
    fn look_ahead_limits_lines() {
        let lines = vec![
            line(-6, -1, Conditions::unrestricted().with_visibility(100)),
            line(0, 6, Conditions::unrestricted()),
            line(10, 16, Conditions::unrestricted().with_visibility(200)),
        ];
        let station = station("cityflyer");
        let minima = Minima::for_station(&station);
        let policy = Policy::default();

        let limited = scan_forecast(
            &station,
            &minima,
            &lines,
            LookAhead::Within(Duration::hours(9)),
            now(),
            &policy,
        );
        assert!(limited.is_clear());

        let full = scan_forecast(&station, &minima, &lines, LookAhead::Full, now(), &policy);
        assert_eq!(full.tier, RiskTier::Red);
        assert_eq!(full.window, Some(window(-6, -1)));
    }
}
