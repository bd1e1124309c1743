//! Reservoir read handlers: list, get, latest status.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{LatestStatusResponse, ReservoirDto};
use crate::app_state::AppState;
use crate::domain::ReservoirId;
use crate::error::{ErrorResponse, GatewayError};
use crate::persistence::ReservoirStore;

/// `GET /api/reservoirs/all`: List every reservoir.
///
/// # Errors
///
/// Returns [`GatewayError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/reservoirs/all",
    tag = "Reservoirs",
    summary = "List reservoirs",
    description = "Returns every known reservoir with its coordinates and category.",
    responses(
        (status = 200, description = "Reservoir list", body = Vec<ReservoirDto>),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn list_reservoirs<S: ReservoirStore>(
    State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, GatewayError> {
    let reservoirs = state.query_service.list_all().await?;
    let data: Vec<ReservoirDto> = reservoirs.into_iter().map(ReservoirDto::from).collect();
    Ok(Json(data))
}

/// `GET /api/reservoirs/{id}`: Get one reservoir.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if the reservoir does not exist.
#[utoipa::path(
    get,
    path = "/api/reservoirs/{id}",
    tag = "Reservoirs",
    summary = "Get reservoir",
    params(
        ("id" = i64, Path, description = "Reservoir id"),
    ),
    responses(
        (status = 200, description = "Reservoir found", body = ReservoirDto),
        (status = 404, description = "Reservoir not found", body = ErrorResponse),
    )
)]
pub async fn get_reservoir<S: ReservoirStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GatewayError> {
    let reservoir = state.query_service.reservoir(ReservoirId::new(id)).await?;
    Ok(Json(ReservoirDto::from(reservoir)))
}

/// `GET /api/reservoirs/{id}/latest`: Most recent readings.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if the reservoir does not exist or has
/// no readings.
#[utoipa::path(
    get,
    path = "/api/reservoirs/{id}/latest",
    tag = "Reservoirs",
    summary = "Latest status",
    description = "Returns the snapshot with the most recent timestamp for the reservoir.",
    params(
        ("id" = i64, Path, description = "Reservoir id"),
    ),
    responses(
        (status = 200, description = "Latest snapshot", body = LatestStatusResponse),
        (status = 404, description = "No data for this reservoir", body = ErrorResponse),
    )
)]
pub async fn latest_status<S: ReservoirStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GatewayError> {
    let snapshot = state.query_service.latest(ReservoirId::new(id)).await?;
    Ok(Json(LatestStatusResponse::from(snapshot)))
}

/// Reservoir read routes.
pub fn routes<S: ReservoirStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/api/reservoirs/all", get(list_reservoirs::<S>))
        .route("/api/reservoirs/{id}", get(get_reservoir::<S>))
        .route("/api/reservoirs/{id}/latest", get(latest_status::<S>))
}
