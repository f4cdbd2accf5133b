//! The station network.
//!
//! Stations from configuration are kept apart from stations added at
//! runtime, so an ad-hoc addition can never shadow or reorder the
//! configured network. Iteration order is configured stations first, then
//! ad-hoc stations in the order they were added.

use tracing::warn;

use crate::domain::{Fleet, IcaoCode, Position, Station};
use crate::source::{SourceError, WeatherSource};

/// Errors from registry changes.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("station {0} is already in the network")]
    Duplicate(IcaoCode),

    #[error("station {0} is not in the network")]
    Unknown(IcaoCode),

    #[error("station lookup failed for {code}: {source}")]
    Lookup {
        code: IcaoCode,
        #[source]
        source: SourceError,
    },
}

/// Ordered set of monitored stations, unique by ICAO code.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    configured: Vec<Station>,
    adhoc: Vec<Station>,
}

impl StationRegistry {
    /// Build a registry from configured stations.
    ///
    /// A repeated code keeps its first definition.
    pub fn new(stations: impl IntoIterator<Item = Station>) -> Self {
        let mut registry = Self::default();
        for station in stations {
            if registry.contains(&station.code) {
                warn!(station = %station.code, "duplicate station in configuration, ignoring");
                continue;
            }
            if station.runway_heading().is_none() {
                warn!(station = %station.code, "no runway heading, crosswind will read 0");
            }
            registry.configured.push(station);
        }
        registry
    }

    /// All stations in registry order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.configured.iter().chain(self.adhoc.iter())
    }

    pub fn get(&self, code: &IcaoCode) -> Option<&Station> {
        self.stations().find(|s| &s.code == code)
    }

    pub fn contains(&self, code: &IcaoCode) -> bool {
        self.get(code).is_some()
    }

    pub fn is_adhoc(&self, code: &IcaoCode) -> bool {
        self.adhoc.iter().any(|s| &s.code == code)
    }

    pub fn len(&self) -> usize {
        self.configured.len() + self.adhoc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a station at runtime.
    pub fn insert_adhoc(&mut self, station: Station) -> Result<(), RegistryError> {
        if self.contains(&station.code) {
            return Err(RegistryError::Duplicate(station.code));
        }
        self.adhoc.push(station);
        Ok(())
    }

    /// Remove a configured or ad-hoc station.
    pub fn remove(&mut self, code: &IcaoCode) -> Result<Station, RegistryError> {
        for list in [&mut self.configured, &mut self.adhoc] {
            if let Some(idx) = list.iter().position(|s| &s.code == code) {
                return Ok(list.remove(idx));
            }
        }
        Err(RegistryError::Unknown(*code))
    }
}

/// Resolve an ad-hoc station through the source's station lookup.
pub async fn resolve_adhoc<S: WeatherSource>(
    source: &S,
    code: IcaoCode,
    fleet: Fleet,
) -> Result<Station, RegistryError> {
    let info = source
        .lookup_station(&code)
        .await
        .map_err(|source| RegistryError::Lookup { code, source })?;
    Ok(info.into_station(fleet))
}

/// The built-in network of the Cityflyer and Euroflyer fleets.
pub fn default_stations() -> Vec<Station> {
    let table: [(&str, &str, &str, f64, f64, u16, &str, bool); 9] = [
        ("EGLC", "LCY", "London City", 51.505, 0.055, 270, "cityflyer", true),
        ("EGKK", "LGW", "Gatwick", 51.148, -0.190, 260, "euroflyer", false),
        ("EGSS", "STN", "Stansted", 51.885, 0.235, 220, "cityflyer", false),
        ("EGPF", "GLA", "Glasgow", 55.871, -4.433, 230, "cityflyer", false),
        ("LFTH", "TLN", "Toulon (St Tropez)", 43.097, 6.146, 310, "cityflyer", false),
        ("LIEO", "OLB", "Olbia (Sardinia)", 40.898, 9.517, 50, "cityflyer", false),
        ("LESO", "EAS", "San Sebastián", 43.356, -1.791, 220, "cityflyer", true),
        ("LIRQ", "FLR", "Florence", 43.810, 11.205, 50, "cityflyer", true),
        ("LOWS", "SZG", "Salzburg", 47.794, 13.004, 330, "euroflyer", true),
    ];

    table
        .into_iter()
        .filter_map(|(icao, iata, name, lat, lon, heading, fleet, special)| {
            let code = IcaoCode::parse(icao).ok()?;
            let station = Station::new(code, Position::new(lat, lon))
                .with_alt_code(iata)
                .with_name(name)
                .with_runway_heading(heading)
                .with_fleet(fleet);
            Some(if special { station.special() } else { station })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avwx::MockWeatherSource;
    use crate::source::StationInfo;

    fn icao(s: &str) -> IcaoCode {
        IcaoCode::parse(s).unwrap()
    }

    fn station(code: &str) -> Station {
        Station::new(icao(code), Position::new(51.0, 0.0)).with_runway_heading(90)
    }

    fn codes(registry: &StationRegistry) -> Vec<&str> {
        registry.stations().map(|s| s.code.as_str()).collect()
    }

    #[test]
    fn default_network() {
        let stations = default_stations();
        assert_eq!(stations.len(), 9);

        let registry = StationRegistry::new(stations);
        let eglc = registry.get(&icao("EGLC")).unwrap();
        assert!(eglc.special_category);
        assert_eq!(eglc.alt_code.as_deref(), Some("LCY"));
        assert_eq!(eglc.fleet.as_str(), "cityflyer");

        let egkk = registry.get(&icao("EGKK")).unwrap();
        assert!(!egkk.special_category);
        assert_eq!(egkk.fleet.as_str(), "euroflyer");
    }

    #[test]
    fn duplicates_keep_first() {
        let registry = StationRegistry::new(vec![
            station("EGLC"),
            station("EGKK"),
            station("EGLC").with_name("second"),
        ]);
        assert_eq!(codes(&registry), vec!["EGLC", "EGKK"]);
        assert_eq!(registry.get(&icao("EGLC")).unwrap().name, "EGLC");
    }

    #[test]
    fn adhoc_after_configured() {
        let mut registry = StationRegistry::new(vec![station("EGLC"), station("EGKK")]);
        registry.insert_adhoc(station("LFMN")).unwrap();

        assert_eq!(codes(&registry), vec!["EGLC", "EGKK", "LFMN"]);
        assert!(registry.is_adhoc(&icao("LFMN")));
        assert!(!registry.is_adhoc(&icao("EGLC")));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn adhoc_duplicate_rejected() {
        let mut registry = StationRegistry::new(vec![station("EGLC")]);
        let err = registry.insert_adhoc(station("EGLC")).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(code) if code == icao("EGLC")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_either_kind() {
        let mut registry = StationRegistry::new(vec![station("EGLC"), station("EGKK")]);
        registry.insert_adhoc(station("LFMN")).unwrap();

        assert_eq!(registry.remove(&icao("EGLC")).unwrap().code, icao("EGLC"));
        assert_eq!(registry.remove(&icao("LFMN")).unwrap().code, icao("LFMN"));
        assert_eq!(codes(&registry), vec!["EGKK"]);

        let err = registry.remove(&icao("EGLC")).unwrap_err();
        assert_eq!(err.to_string(), "station EGLC is not in the network");
    }

    #[tokio::test]
    async fn resolve_adhoc_uses_lookup() {
        let source = MockWeatherSource::new();
        source
            .insert_station(StationInfo {
                code: icao("LFMN"),
                iata: Some("NCE".into()),
                name: "Nice".into(),
                position: Position::new(43.658, 7.216),
                runway_heading: Some(40),
            })
            .await;

        let station = resolve_adhoc(&source, icao("LFMN"), Fleet::new("euroflyer"))
            .await
            .unwrap();
        assert_eq!(station.name, "Nice");
        assert_eq!(station.fleet.as_str(), "euroflyer");

        let err = resolve_adhoc(&source, icao("ZZZZ"), Fleet::unassigned())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Lookup { .. }));
    }
}
