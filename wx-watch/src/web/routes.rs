//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{Fleet, IcaoCode, Station};
use crate::network::{
    CycleError, DiversionAdvice, NetworkError, NetworkSnapshot, RegistryError, StationStatus,
};
use crate::source::SourceError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/snapshot", get(snapshot))
        .route("/api/stations", get(list_stations).post(add_station))
        .route(
            "/api/stations/:code",
            get(station_status).delete(remove_station),
        )
        .route("/api/diversion/:code", get(diversion))
        .route("/api/handover", get(handover))
        .route("/api/refresh", post(refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The current network snapshot, optionally restricted to one fleet.
async fn snapshot(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<NetworkSnapshot>, AppError> {
    let snapshot = state.network.snapshot().await?;
    let body = match query.fleet.as_deref() {
        Some(fleet) => snapshot.for_fleet(&Fleet::new(fleet)),
        None => NetworkSnapshot::clone(&snapshot),
    };
    Ok(Json(body))
}

/// Stations currently monitored, in registry order.
async fn list_stations(State(state): State<AppState>) -> Json<Vec<Station>> {
    Json(state.network.stations().await)
}

/// Classification and raw reports for one station.
async fn station_status(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StationStatus>, AppError> {
    let code = parse_code(&code)?;
    let snapshot = state.network.snapshot().await?;
    snapshot
        .status(&code)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_in_network(code))
}

/// Recommended alternate for a station.
async fn diversion(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<DiversionAdvice>, AppError> {
    let code = parse_code(&code)?;
    Ok(Json(state.network.recommend_diversion(&code).await?))
}

/// Plain-text log of forecast alerts for shift handover.
async fn handover(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let log = state.network.handover_log().await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], log))
}

/// Drop cached reports and poll every station again.
async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, AppError> {
    let snapshot = state.network.force_refresh().await?;
    Ok(Json(RefreshResponse {
        generation: snapshot.generation,
        stations: snapshot.stations.len(),
        alerts: snapshot.alerts.len(),
    }))
}

/// Add an ad-hoc station resolved through the weather source.
async fn add_station(
    State(state): State<AppState>,
    Json(req): Json<AddStationRequest>,
) -> Result<(StatusCode, Json<Station>), AppError> {
    let code = parse_code(&req.code)?;
    let fleet = req
        .fleet
        .as_deref()
        .map(Fleet::new)
        .unwrap_or_else(Fleet::unassigned);

    let station = state.network.add_station(code, fleet).await?;
    Ok((StatusCode::CREATED, Json(station)))
}

/// Remove a station from the network.
async fn remove_station(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Station>, AppError> {
    let code = parse_code(&code)?;
    Ok(Json(state.network.remove_station(&code).await?))
}

fn parse_code(raw: &str) -> Result<IcaoCode, AppError> {
    IcaoCode::parse_normalized(raw).map_err(|_| AppError::BadRequest {
        message: format!("Invalid ICAO code: {raw}"),
    })
}

fn not_in_network(code: IcaoCode) -> AppError {
    AppError::NotFound {
        message: RegistryError::Unknown(code).to_string(),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    BadGateway { message: String },
    Unavailable { message: String },
}

impl From<CycleError> for AppError {
    fn from(e: CycleError) -> Self {
        AppError::Unavailable {
            message: e.to_string(),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        let message = e.to_string();
        match e {
            RegistryError::Duplicate(_) => AppError::Conflict { message },
            RegistryError::Unknown(_) => AppError::NotFound { message },
            RegistryError::Lookup {
                source: SourceError::NotFound(_),
                ..
            } => AppError::NotFound { message },
            RegistryError::Lookup { .. } => AppError::BadGateway { message },
        }
    }
}

impl From<NetworkError> for AppError {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::Cycle(e) => e.into(),
            NetworkError::Registry(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
