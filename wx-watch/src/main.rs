use std::net::SocketAddr;
use std::process::ExitCode;

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use wx_watch::avwx::{AvwxClient, AvwxConfig, MockWeatherSource};
use wx_watch::config::AppConfig;
use wx_watch::network::{NetworkAggregator, StationRegistry};
use wx_watch::source::AnySource;
use wx_watch::web::{AppState, create_router};

const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wx_watch=info,tower_http=info")),
        )
        .init();

    let config = match std::env::var("WX_CONFIG") {
        Ok(path) => match AppConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!(%path, error = %e, "failed to load configuration");
                return ExitCode::FAILURE;
            }
        },
        Err(_) => {
            info!("WX_CONFIG not set, using the built-in network");
            AppConfig::default()
        }
    };

    let source = match select_source(config.poll.max_concurrent) {
        Ok(source) => source,
        Err(message) => {
            error!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let ttl = config.cache.ttl;
    let network = NetworkAggregator::new(
        source,
        StationRegistry::new(config.stations),
        config.alternates,
        config.policy,
        &config.cache,
        config.poll,
    );

    // Renew the snapshot at half its TTL so requests rarely wait on a cycle
    let warm = network.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ttl / 4);
        loop {
            interval.tick().await;
            match warm.refresh_stale(ttl / 2).await {
                Ok(snapshot) => debug!(
                    generation = snapshot.generation,
                    alerts = snapshot.alerts.len(),
                    green = snapshot.green.len(),
                    "network snapshot ready"
                ),
                Err(e) => warn!(error = %e, "network refresh failed"),
            }
        }
    });

    let app = create_router(AppState::new(network));

    let bind = std::env::var("WX_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let addr: SocketAddr = match bind.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(%bind, error = %e, "invalid bind address");
            return ExitCode::FAILURE;
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(%addr, "weather watch listening");
    info!("  GET    /api/snapshot[?fleet=]   - network snapshot");
    info!("  GET    /api/stations/:code      - station detail");
    info!("  GET    /api/diversion/:code     - diversion advice");
    info!("  GET    /api/handover            - handover log");
    info!("  POST   /api/refresh             - force refresh");
    info!("  POST   /api/stations            - add ad-hoc station");
    info!("  DELETE /api/stations/:code      - remove station");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Mock fixtures when `WX_MOCK_DIR` is set, otherwise the AVWX API.
fn select_source(station_concurrency: usize) -> Result<AnySource, String> {
    if let Ok(dir) = std::env::var("WX_MOCK_DIR") {
        let mock = MockWeatherSource::from_dir(&dir)
            .map_err(|e| format!("failed to load mock reports from {dir}: {e}"))?;
        info!(%dir, "using mock weather source");
        return Ok(AnySource::Mock(mock));
    }

    let token = std::env::var("AVWX_TOKEN").unwrap_or_else(|_| {
        warn!("AVWX_TOKEN not set. API calls will fail.");
        String::new()
    });
    let mut config = AvwxConfig::new(token).with_station_concurrency(station_concurrency);
    if let Ok(url) = std::env::var("AVWX_BASE_URL") {
        config = config.with_base_url(url);
    }

    let client =
        AvwxClient::new(config).map_err(|e| format!("failed to create AVWX client: {e}"))?;
    Ok(AnySource::Avwx(client))
}
