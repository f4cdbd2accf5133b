//! Crosswind component calculation.

use crate::domain::Wind;

/// Crosswind component in whole knots.
///
/// Computes `|speed × sin(direction − heading)|` where `speed` is the greater
/// of sustained and gust speed. Returns 0 when the direction, the speed or
/// the runway heading is unknown: missing wind data is not treated as
/// hazardous here.
///
/// The angle difference is not wrapped into `[0°, 180°]`; `|sin|` has the
/// same magnitude either way.
///
/// # Examples
///
/// ```
/// use wx_watch::classify::crosswind_kt;
/// use wx_watch::domain::Wind;
///
/// let wind = Wind::new(Some(0), Some(30), None);
/// assert_eq!(crosswind_kt(&wind, Some(270)), 30);
/// assert_eq!(crosswind_kt(&wind, None), 0);
/// ```
pub fn crosswind_kt(wind: &Wind, runway_heading: Option<u16>) -> u32 {
    crosswind_component(wind.direction, wind.effective_speed_kt(), runway_heading)
}

/// Crosswind component for an explicit direction, speed and heading.
pub fn crosswind_component(
    direction: Option<u16>,
    speed_kt: Option<u32>,
    runway_heading: Option<u16>,
) -> u32 {
    let (Some(direction), Some(speed), Some(heading)) = (direction, speed_kt, runway_heading)
    else {
        return 0;
    };

    let angle = (f64::from(direction) - f64::from(heading)).to_radians();
    let component = (f64::from(speed) * angle.sin()).abs().round();

    // |sin| <= 1 so the rounded component never exceeds the speed.
    (component as u32).min(speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_crosswind() {
        // 000° wind on a 270° runway: sin(-270°) = 1
        assert_eq!(crosswind_component(Some(0), Some(30), Some(270)), 30);
    }

    #[test]
    fn headwind_and_tailwind_have_no_crosswind() {
        // 090° wind on a 270° runway: sin(-180°) ≈ 0
        assert_eq!(crosswind_component(Some(90), Some(30), Some(270)), 0);
        assert_eq!(crosswind_component(Some(270), Some(30), Some(270)), 0);
    }

    #[test]
    fn wraps_across_north() {
        // 010° wind on a 350° runway is a 20° offset either way
        assert_eq!(crosswind_component(Some(10), Some(20), Some(350)), 7);
        assert_eq!(crosswind_component(Some(350), Some(20), Some(10)), 7);
        assert_eq!(crosswind_component(Some(360), Some(20), Some(20)), 7);
    }

    #[test]
    fn rounds_to_whole_knots() {
        // 28 × sin(30°) = 13.9999…
        assert_eq!(crosswind_component(Some(300), Some(28), Some(270)), 14);
        // 20 × sin(40°) = 12.86
        assert_eq!(crosswind_component(Some(220), Some(20), Some(260)), 13);
    }

    #[test]
    fn missing_inputs_yield_zero() {
        assert_eq!(crosswind_component(None, Some(30), Some(270)), 0);
        assert_eq!(crosswind_component(Some(0), None, Some(270)), 0);
        assert_eq!(crosswind_component(Some(0), Some(30), None), 0);
        assert_eq!(crosswind_component(Some(0), Some(0), Some(270)), 0);
    }

    #[test]
    fn gust_dominates_sustained_speed() {
        let wind = Wind::new(Some(0), Some(12), Some(27));
        assert_eq!(crosswind_kt(&wind, Some(270)), 27);

        let wind = Wind::new(Some(0), Some(30), Some(0));
        assert_eq!(crosswind_kt(&wind, Some(270)), 30);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Crosswind is bounded by the greater of speed and gust
        #[test]
        fn bounded_by_effective_speed(
            direction in 0u16..=360,
            heading in 0u16..=360,
            speed in 0u32..200,
            gust in proptest::option::of(0u32..200),
        ) {
            let wind = Wind::new(Some(direction), Some(speed), gust);
            let xwind = crosswind_kt(&wind, Some(heading));
            prop_assert!(xwind <= speed.max(gust.unwrap_or(0)));
        }

        /// Zero speed means zero crosswind
        #[test]
        fn zero_speed_is_zero(direction in 0u16..=360, heading in 0u16..=360) {
            prop_assert_eq!(crosswind_component(Some(direction), Some(0), Some(heading)), 0);
        }

        /// Missing direction or heading means zero crosswind
        #[test]
        fn missing_direction_or_heading_is_zero(angle in 0u16..=360, speed in 0u32..200) {
            prop_assert_eq!(crosswind_component(None, Some(speed), Some(angle)), 0);
            prop_assert_eq!(crosswind_component(Some(angle), Some(speed), None), 0);
        }

        /// Swapping direction and heading does not change the magnitude
        #[test]
        fn symmetric_in_angle(direction in 0u16..=360, heading in 0u16..=360, speed in 0u32..200) {
            prop_assert_eq!(
                crosswind_component(Some(direction), Some(speed), Some(heading)),
                crosswind_component(Some(heading), Some(speed), Some(direction))
            );
        }
    }
}
