//! Telemetry submission handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{SubmitDataRequest, SubmitDataResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::persistence::ReservoirStore;

/// `POST /submit_data`: Ingest a batch of reservoir readings.
///
/// # Errors
///
/// Returns [`GatewayError::IngestFailure`] when any record fails; the batch
/// is rolled back.
#[utoipa::path(
    post,
    path = "/submit_data",
    tag = "Ingestion",
    summary = "Submit telemetry batch",
    description = "Creates unseen reservoirs, appends one status snapshot per record in a single transaction, then pushes one live update per record to connected viewers.",
    request_body(content = serde_json::Value, description = "`{\"waterReservoirs\": [{\"name\", \"category\", ...metrics}]}`"),
    responses(
        (status = 200, description = "Batch committed", body = SubmitDataResponse),
        (status = 400, description = "Invalid record or metric", body = ErrorResponse),
        (status = 500, description = "Persistence failure", body = ErrorResponse),
    )
)]
pub async fn submit_data<S: ReservoirStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<SubmitDataRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let report = state.ingest_service.ingest(&req.water_reservoirs).await?;
    Ok(Json(SubmitDataResponse {
        status: "success".to_string(),
        records: report.records,
    }))
}

/// Ingestion routes. The trailing-slash form is kept for existing clients.
pub fn routes<S: ReservoirStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/submit_data", post(submit_data::<S>))
        .route("/submit_data/", post(submit_data::<S>))
}
