//! Web layer for the weather watch.
//!
//! Serves the network snapshot, per-station detail, diversion advice and the
//! handover log as JSON (the log as plain text), plus operator actions to
//! force a refresh and to add or remove ad-hoc stations.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
