//! Spreadsheet export handler.

use axum::Json;
use axum::Router;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::post;

use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::persistence::ReservoirStore;
use crate::report::{ReportRequest, XLSX_CONTENT_TYPE, content_disposition, render_report};

/// `POST /generate-excel`: Render the daily report workbook.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidMetric`] for non-numeric values and
/// [`GatewayError::Report`] if rendering fails.
#[utoipa::path(
    post,
    path = "/generate-excel",
    tag = "Reports",
    summary = "Generate spreadsheet report",
    description = "Formats the submitted readings into an .xlsx workbook. Does not read the store.",
    request_body(content = serde_json::Value, description = "`{\"organization\", \"date\", \"executor\", \"waterReservoirs\": [...]}`"),
    responses(
        (status = 200, description = "Workbook attachment"),
        (status = 400, description = "Invalid metric value", body = ErrorResponse),
    )
)]
pub async fn generate_excel(
    Json(req): Json<ReportRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let bytes = render_report(&req)?;
    let disposition = content_disposition(&req.date);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// Report routes.
pub fn routes<S: ReservoirStore>() -> Router<AppState<S>> {
    Router::new().route("/generate-excel", post(generate_excel))
}
