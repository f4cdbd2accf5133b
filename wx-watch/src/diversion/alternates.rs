//! Preferred diversion alternates.
//!
//! A small static override table capturing known crew and ops preferences
//! (for example a hub with slot priority). When a station has an entry, the
//! planner takes the first green alternate from it instead of computing the
//! nearest one.

use std::collections::HashMap;

use crate::domain::IcaoCode;

/// Ordered preferred alternates per station.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferredAlternates {
    table: HashMap<IcaoCode, Vec<IcaoCode>>,
}

impl PreferredAlternates {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ordered alternates for a station, replacing any previous list.
    ///
    /// A station listed as its own alternate is dropped from the list.
    pub fn set(&mut self, station: IcaoCode, alternates: Vec<IcaoCode>) {
        let alternates: Vec<IcaoCode> = alternates.into_iter().filter(|a| *a != station).collect();
        if alternates.is_empty() {
            self.table.remove(&station);
        } else {
            self.table.insert(station, alternates);
        }
    }

    /// The preferred alternates for a station, best first.
    pub fn get(&self, station: &IcaoCode) -> Option<&[IcaoCode]> {
        self.table.get(station).map(Vec::as_slice)
    }

    /// Iterate over every (station, alternates) entry.
    pub fn iter(&self) -> impl Iterator<Item = (&IcaoCode, &[IcaoCode])> {
        self.table.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of stations with preferred alternates.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Builder for preferred alternates.
///
/// Invalid codes are skipped.
#[derive(Debug, Default)]
pub struct PreferredAlternatesBuilder {
    inner: PreferredAlternates,
}

impl PreferredAlternatesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ordered alternate list for a station.
    pub fn add(mut self, station: &str, alternates: &[&str]) -> Self {
        if let Ok(station) = IcaoCode::parse(station) {
            let alternates = alternates
                .iter()
                .filter_map(|a| IcaoCode::parse(a).ok())
                .collect();
            self.inner.set(station, alternates);
        }
        self
    }

    pub fn build(self) -> PreferredAlternates {
        self.inner
    }
}

/// Preferred alternates for the built-in network.
pub fn default_alternates() -> PreferredAlternates {
    PreferredAlternatesBuilder::new()
        // London City: Stansted first for Cityflyer handling, then Gatwick
        .add("EGLC", &["EGSS", "EGKK"])
        .add("EGKK", &["EGSS"])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icao(s: &str) -> IcaoCode {
        IcaoCode::parse(s).unwrap()
    }

    #[test]
    fn empty_table() {
        let table = PreferredAlternates::new();
        assert!(table.is_empty());
        assert_eq!(table.get(&icao("EGLC")), None);
    }

    #[test]
    fn preserves_order() {
        let table = PreferredAlternatesBuilder::new()
            .add("EGLC", &["EGSS", "EGKK", "EGGW"])
            .build();
        assert_eq!(
            table.get(&icao("EGLC")),
            Some(&[icao("EGSS"), icao("EGKK"), icao("EGGW")][..])
        );
    }

    #[test]
    fn drops_self_and_invalid_codes() {
        let table = PreferredAlternatesBuilder::new()
            .add("EGLC", &["EGLC", "bad", "EGKK"])
            .add("nope", &["EGKK"])
            .build();
        assert_eq!(table.get(&icao("EGLC")), Some(&[icao("EGKK")][..]));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn empty_list_removes_entry() {
        let mut table = default_alternates();
        assert!(table.get(&icao("EGKK")).is_some());
        table.set(icao("EGKK"), vec![]);
        assert!(table.get(&icao("EGKK")).is_none());
    }
}
