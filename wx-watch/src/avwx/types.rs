//! AVWX REST API response DTOs.
//!
//! These types map directly to the decoded JSON returned by the AVWX
//! `/metar`, `/taf` and `/station` endpoints. Every field is optional or
//! defaulted because AVWX omits or nulls values it could not decode.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A decoded numeric value alongside its report text.
#[derive(Debug, Clone, Deserialize)]
pub struct Number {
    pub repr: Option<String>,
    pub value: Option<f64>,
}

/// A decoded report timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct Timestamp {
    pub repr: Option<String>,
    pub dt: Option<DateTime<Utc>>,
}

/// A cloud layer.
#[derive(Debug, Clone, Deserialize)]
pub struct Cloud {
    pub repr: Option<String>,

    /// Coverage: FEW, SCT, BKN, OVC or VV.
    #[serde(rename = "type")]
    pub cover: Option<String>,

    /// Layer base in hundreds of feet. Older API versions call it `altitude`.
    #[serde(alias = "altitude")]
    pub base: Option<f64>,
}

/// A present-weather group such as `-FZRA` or `BCFG`.
#[derive(Debug, Clone, Deserialize)]
pub struct WxCode {
    pub repr: String,
    pub value: Option<String>,
}

/// Units the report's values are expressed in.
#[derive(Debug, Clone, Deserialize)]
pub struct Units {
    #[serde(default = "default_visibility_unit")]
    pub visibility: String,
}

fn default_visibility_unit() -> String {
    "m".to_string()
}

impl Default for Units {
    fn default() -> Self {
        Self {
            visibility: default_visibility_unit(),
        }
    }
}

/// Response from `GET /metar/{station}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetarResponse {
    pub raw: Option<String>,
    pub station: Option<String>,
    pub time: Option<Timestamp>,
    pub visibility: Option<Number>,
    pub wind_direction: Option<Number>,
    pub wind_speed: Option<Number>,
    pub wind_gust: Option<Number>,
    #[serde(default)]
    pub clouds: Vec<Cloud>,
    #[serde(default)]
    pub wx_codes: Vec<WxCode>,
    pub flight_rules: Option<String>,
    #[serde(default)]
    pub units: Units,
}

/// Response from `GET /taf/{station}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TafResponse {
    pub raw: Option<String>,
    pub station: Option<String>,
    #[serde(default)]
    pub forecast: Vec<TafLine>,
    #[serde(default)]
    pub units: Units,
}

/// One line of a decoded TAF.
#[derive(Debug, Clone, Deserialize)]
pub struct TafLine {
    /// FROM, BECMG, TEMPO, INTER or PROB.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub visibility: Option<Number>,
    pub wind_direction: Option<Number>,
    pub wind_speed: Option<Number>,
    pub wind_gust: Option<Number>,
    #[serde(default)]
    pub clouds: Vec<Cloud>,
    #[serde(default)]
    pub wx_codes: Vec<WxCode>,
    pub probability: Option<Number>,
    pub raw: Option<String>,
}

/// Response from `GET /station/{station}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationResponse {
    pub icao: Option<String>,
    pub iata: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub runways: Vec<Runway>,
}

/// A runway as listed by the station lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct Runway {
    pub length_ft: Option<f64>,
    pub ident1: Option<String>,
    pub ident2: Option<String>,
    pub bearing1: Option<f64>,
    pub bearing2: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_metar() {
        let json = r#"{
            "raw": "EGLC 160550Z VRB03KT 0600 FG BKN002 08/08 Q1021",
            "station": "EGLC",
            "time": {"repr": "160550Z", "dt": "2026-10-16T05:50:00Z"},
            "visibility": {"repr": "0600", "value": 600, "spoken": "six hundred"},
            "wind_direction": {"repr": "VRB", "value": null},
            "wind_speed": {"repr": "03", "value": 3},
            "wind_gust": null,
            "clouds": [{"repr": "BKN002", "type": "BKN", "base": 2, "modifier": null}],
            "wx_codes": [{"repr": "FG", "value": "Fog"}],
            "flight_rules": "LIFR",
            "units": {"altimeter": "hPa", "visibility": "m", "wind_speed": "kt"}
        }"#;

        let metar: MetarResponse = serde_json::from_str(json).unwrap();
        assert_eq!(metar.station.as_deref(), Some("EGLC"));
        assert_eq!(metar.visibility.unwrap().value, Some(600.0));
        assert_eq!(metar.wind_direction.unwrap().value, None);
        assert!(metar.wind_gust.is_none());
        assert_eq!(metar.clouds[0].cover.as_deref(), Some("BKN"));
        assert_eq!(metar.clouds[0].base, Some(2.0));
        assert_eq!(metar.wx_codes[0].repr, "FG");
        assert!(metar.time.unwrap().dt.is_some());
    }

    #[test]
    fn cloud_accepts_altitude_alias() {
        let cloud: Cloud =
            serde_json::from_str(r#"{"repr": "OVC004", "type": "OVC", "altitude": 4}"#).unwrap();
        assert_eq!(cloud.base, Some(4.0));
    }

    #[test]
    fn minimal_metar_uses_defaults() {
        let metar: MetarResponse = serde_json::from_str(r#"{"raw": "EGLC NIL"}"#).unwrap();
        assert!(metar.clouds.is_empty());
        assert!(metar.wx_codes.is_empty());
        assert_eq!(metar.units.visibility, "m");
    }

    #[test]
    fn parse_taf_line() {
        let json = r#"{
            "raw": "TAF EGLC 160500Z 1606/1712 27010KT 9999 SCT030 TEMPO 1609/1612 3000 -RA",
            "station": "EGLC",
            "forecast": [
                {
                    "type": "TEMPO",
                    "start_time": {"repr": "1609", "dt": "2026-10-16T09:00:00Z"},
                    "end_time": {"repr": "1612", "dt": "2026-10-16T12:00:00Z"},
                    "visibility": {"repr": "3000", "value": 3000},
                    "clouds": [],
                    "wx_codes": [{"repr": "-RA", "value": "Light Rain"}],
                    "probability": null,
                    "raw": "TEMPO 1609/1612 3000 -RA"
                }
            ],
            "units": {"visibility": "m"}
        }"#;

        let taf: TafResponse = serde_json::from_str(json).unwrap();
        assert_eq!(taf.forecast.len(), 1);
        let line = &taf.forecast[0];
        assert_eq!(line.kind.as_deref(), Some("TEMPO"));
        assert!(line.wind_speed.is_none());
        assert!(line.probability.is_none());
    }

    #[test]
    fn parse_station() {
        let json = r#"{
            "icao": "EGLC", "iata": "LCY", "name": "London City Airport",
            "city": "London", "latitude": 51.505, "longitude": 0.055,
            "runways": [{"length_ft": 4948, "width_ft": 98, "ident1": "09", "ident2": "27",
                         "bearing1": 92.6, "bearing2": 272.6}]
        }"#;
        let station: StationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(station.iata.as_deref(), Some("LCY"));
        assert_eq!(station.runways[0].bearing2, Some(272.6));
    }
}
