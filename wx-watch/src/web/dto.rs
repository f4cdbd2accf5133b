//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Query for the network snapshot.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotQuery {
    /// Restrict the snapshot to one fleet (case-insensitive)
    pub fleet: Option<String>,
}

/// Request to add an ad-hoc station.
#[derive(Debug, Deserialize)]
pub struct AddStationRequest {
    /// ICAO code, any case
    pub code: String,

    /// Fleet to assign; unassigned when omitted
    pub fleet: Option<String>,
}

/// Result of a forced refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub generation: u64,
    pub stations: usize,
    pub alerts: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
