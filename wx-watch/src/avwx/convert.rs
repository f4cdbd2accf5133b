//! Conversion from AVWX DTOs to domain types.
//!
//! Missing measurements are normalized here: visibility and ceiling fall
//! back to the unrestricted sentinels and absent wind to calm, and each
//! substitution is recorded on the observation so it can be surfaced.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{
    Conditions, ForecastLine, HazardCode, IcaoCode, MissingField, Observation, Position,
    UNRESTRICTED_CEILING_FT, UNRESTRICTED_VISIBILITY_M, ValidityWindow, Wind,
};
use crate::source::StationInfo;

use super::types::{Cloud, MetarResponse, Number, StationResponse, TafLine, TafResponse, Units, WxCode};

const METRES_PER_STATUTE_MILE: f64 = 1609.344;

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid ICAO code: {0}")]
    InvalidIcao(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Convert a decoded METAR into an observation.
pub fn convert_observation(metar: &MetarResponse) -> Observation {
    let mut missing = BTreeSet::new();

    let visibility_m = visibility_m(metar.visibility.as_ref(), &metar.units).unwrap_or_else(|| {
        missing.insert(MissingField::Visibility);
        UNRESTRICTED_VISIBILITY_M
    });

    let (ceiling_ft, ceiling_unknown) = ceiling_ft(&metar.clouds);
    if ceiling_unknown {
        missing.insert(MissingField::Ceiling);
    }

    let wind = wind(
        metar.wind_direction.as_ref(),
        metar.wind_speed.as_ref(),
        metar.wind_gust.as_ref(),
    );
    if wind.speed_kt.is_none() {
        missing.insert(MissingField::Wind);
    }

    let conditions = Conditions {
        visibility_m,
        ceiling_ft,
        wind,
        hazards: hazards_from_codes(&metar.wx_codes),
    };

    let mut observation = Observation::new(conditions);
    observation.raw = metar.raw.clone();
    observation.observed_at = metar.time.as_ref().and_then(|t| t.dt);
    observation.missing = missing;
    observation
}

/// Convert a decoded TAF into a forecast timeline.
///
/// Lines without a decodable validity window are skipped. Values a line does
/// not state are treated as unrestricted.
pub fn convert_forecast(taf: &TafResponse) -> Vec<ForecastLine> {
    taf.forecast
        .iter()
        .filter_map(|line| {
            let converted = convert_forecast_line(line, &taf.units);
            if converted.is_none() {
                debug!(raw = ?line.raw, "skipping forecast line without validity window");
            }
            converted
        })
        .collect()
}

fn convert_forecast_line(line: &TafLine, units: &Units) -> Option<ForecastLine> {
    let start = line.start_time.as_ref()?.dt?;
    let end = line.end_time.as_ref()?.dt?;

    let conditions = Conditions {
        visibility_m: visibility_m(line.visibility.as_ref(), units)
            .unwrap_or(UNRESTRICTED_VISIBILITY_M),
        ceiling_ft: ceiling_ft(&line.clouds).0,
        wind: wind(
            line.wind_direction.as_ref(),
            line.wind_speed.as_ref(),
            line.wind_gust.as_ref(),
        ),
        hazards: hazards_from_codes(&line.wx_codes),
    };

    Some(ForecastLine {
        window: ValidityWindow::new(start, end),
        conditions,
        conditional: is_conditional(line),
        raw: line.raw.clone(),
    })
}

/// TEMPO, INTER and PROB lines describe possible rather than expected
/// conditions.
fn is_conditional(line: &TafLine) -> bool {
    let kind_is_conditional = line
        .kind
        .as_deref()
        .is_some_and(|k| matches!(k, "TEMPO" | "INTER") || k.starts_with("PROB"));
    kind_is_conditional || line.probability.as_ref().is_some_and(|p| p.value.is_some())
}

/// Convert a station lookup response.
pub fn convert_station(
    station: &StationResponse,
    requested: IcaoCode,
) -> Result<StationInfo, ConversionError> {
    let code = match station.icao.as_deref() {
        Some(icao) => {
            IcaoCode::parse(icao).map_err(|_| ConversionError::InvalidIcao(icao.to_string()))?
        }
        None => requested,
    };

    let lat = station
        .latitude
        .ok_or(ConversionError::MissingField("latitude"))?;
    let lon = station
        .longitude
        .ok_or(ConversionError::MissingField("longitude"))?;

    let name = station
        .name
        .clone()
        .or_else(|| station.city.clone())
        .unwrap_or_else(|| code.to_string());

    Ok(StationInfo {
        code,
        iata: station.iata.clone().filter(|s| !s.is_empty()),
        name,
        position: Position::new(lat, lon),
        runway_heading: runway_heading(station),
    })
}

/// Bearing of the longest runway, in whole degrees 1-360.
fn runway_heading(station: &StationResponse) -> Option<u16> {
    let runway = station.runways.iter().max_by(|a, b| {
        a.length_ft
            .unwrap_or(0.0)
            .total_cmp(&b.length_ft.unwrap_or(0.0))
    })?;

    let bearing = runway.bearing1.or_else(|| {
        runway
            .ident1
            .as_deref()
            .map(|ident| ident.trim_end_matches(['L', 'R', 'C']))
            .and_then(|digits| digits.parse::<f64>().ok())
            .map(|n| n * 10.0)
    })?;

    let degrees = (bearing.round() as i64).rem_euclid(360);
    Some(if degrees == 0 { 360 } else { degrees as u16 })
}

fn visibility_m(number: Option<&Number>, units: &Units) -> Option<u32> {
    let number = number?;
    if number.repr.as_deref() == Some("CAVOK") {
        return Some(UNRESTRICTED_VISIBILITY_M);
    }
    let value = number.value?;
    let metres = if units.visibility.eq_ignore_ascii_case("sm") {
        value * METRES_PER_STATUTE_MILE
    } else {
        value
    };
    Some((metres.max(0.0).round() as u32).min(UNRESTRICTED_VISIBILITY_M))
}

/// Lowest broken, overcast or obscured layer, in feet.
///
/// Returns the unrestricted sentinel when there is no such layer. The flag is
/// set when a ceiling layer was reported without a height.
fn ceiling_ft(clouds: &[Cloud]) -> (u32, bool) {
    let mut lowest: Option<u32> = None;
    let mut unknown_height = false;

    for layer in clouds
        .iter()
        .filter(|c| matches!(c.cover.as_deref(), Some("BKN" | "OVC" | "VV")))
    {
        match layer.base {
            Some(hundreds) => {
                let feet = (hundreds.max(0.0) * 100.0).round() as u32;
                lowest = Some(lowest.map_or(feet, |l| l.min(feet)));
            }
            None => unknown_height = true,
        }
    }

    match lowest {
        Some(feet) => (feet, false),
        None => (UNRESTRICTED_CEILING_FT, unknown_height),
    }
}

fn wind(direction: Option<&Number>, speed: Option<&Number>, gust: Option<&Number>) -> Wind {
    let direction = direction
        .filter(|n| n.repr.as_deref() != Some("VRB"))
        .and_then(|n| n.value)
        .map(|deg| deg.round().clamp(0.0, 360.0) as u16);
    let knots = |n: Option<&Number>| {
        n.and_then(|n| n.value)
            .map(|kt| kt.max(0.0).round() as u32)
    };
    Wind::new(direction, knots(speed), knots(gust))
}

/// Map present-weather groups to hazards.
///
/// Groups are read as two-letter tokens after the intensity sign, so
/// `+TSRA` yields thunderstorm and `-FZDZ` freezing drizzle. Vicinity (`VC`)
/// and recent (`RE`) groups are not at the station and are ignored.
pub fn hazards_from_codes(codes: &[WxCode]) -> BTreeSet<HazardCode> {
    let mut hazards = BTreeSet::new();

    for code in codes {
        let group = code.repr.trim_start_matches(['+', '-']);
        if group.starts_with("VC") || group.starts_with("RE") {
            continue;
        }

        let tokens: Vec<&[u8]> = group.as_bytes().chunks(2).collect();
        let freezing = tokens.contains(&&b"FZ"[..]);

        for token in tokens {
            let hazard = match token {
                b"TS" => Some(HazardCode::Thunderstorm),
                b"FG" if freezing => Some(HazardCode::FreezingFog),
                b"FG" => Some(HazardCode::Fog),
                b"RA" if freezing => Some(HazardCode::FreezingRain),
                b"DZ" if freezing => Some(HazardCode::FreezingDrizzle),
                b"SN" | b"SG" => Some(HazardCode::Snow),
                b"GR" | b"GS" => Some(HazardCode::Hail),
                _ => None,
            };
            hazards.extend(hazard);
        }
    }

    hazards
}
