//! Application state for the web layer.

use crate::network::NetworkAggregator;
use crate::source::AnySource;

/// Shared application state.
///
/// The aggregator is reference-counted internally, so cloning per request
/// is cheap.
#[derive(Clone)]
pub struct AppState {
    pub network: NetworkAggregator<AnySource>,
}

impl AppState {
    pub fn new(network: NetworkAggregator<AnySource>) -> Self {
        Self { network }
    }
}
