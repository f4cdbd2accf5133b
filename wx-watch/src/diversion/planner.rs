//! Diversion alternate selection.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::{IcaoCode, Position, Station};

/// Mean Earth radius in nautical miles (spherical approximation).
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Recommended alternate for a distressed station.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiversionRecommendation {
    /// First green entry of the station's preferred-alternates list.
    Preferred { code: IcaoCode },
    /// Nearest green station by great-circle distance.
    Nearest { code: IcaoCode, distance_nm: f64 },
    /// No green station is available.
    NoneFound,
}

impl DiversionRecommendation {
    /// The recommended station, if any.
    pub fn code(&self) -> Option<IcaoCode> {
        match self {
            DiversionRecommendation::Preferred { code }
            | DiversionRecommendation::Nearest { code, .. } => Some(*code),
            DiversionRecommendation::NoneFound => None,
        }
    }
}

/// Great-circle distance between two positions in nautical miles (haversine).
pub fn haversine_nm(from: Position, to: Position) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.lon - from.lon).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * a.sqrt().min(1.0).asin()
}

/// Pick an alternate for `distressed`.
///
/// With a preferred list, the first entry that is currently green wins. If
/// no preferred entry is green (or there is no list), the nearest green
/// station in `registry` is chosen; equal distances are broken by station
/// code, alphabetically. The distressed station itself is never returned.
pub fn recommend<'a>(
    distressed: &Station,
    green: &BTreeSet<IcaoCode>,
    registry: impl IntoIterator<Item = &'a Station>,
    preferred: Option<&[IcaoCode]>,
) -> DiversionRecommendation {
    if let Some(code) = preferred
        .unwrap_or_default()
        .iter()
        .find(|code| **code != distressed.code && green.contains(code))
    {
        return DiversionRecommendation::Preferred { code: *code };
    }

    registry
        .into_iter()
        .filter(|s| s.code != distressed.code && green.contains(&s.code))
        .map(|s| (haversine_nm(distressed.position, s.position), s.code))
        .min_by(|(da, ca), (db, cb)| da.total_cmp(db).then_with(|| ca.cmp(cb)))
        .map_or(DiversionRecommendation::NoneFound, |(distance, code)| {
            DiversionRecommendation::Nearest {
                code,
                distance_nm: (distance * 10.0).round() / 10.0,
            }
        })
}
