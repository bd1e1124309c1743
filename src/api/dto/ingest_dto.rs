//! Ingestion request and response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::TelemetryRecord;

/// Request body for `POST /submit_data`.
#[derive(Debug, Deserialize)]
pub struct SubmitDataRequest {
    /// Batch of per-reservoir records, processed in order.
    #[serde(rename = "waterReservoirs", default)]
    pub water_reservoirs: Vec<TelemetryRecord>,
}

/// Response body for a committed batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitDataResponse {
    /// Always `"success"`.
    pub status: String,
    /// Records persisted.
    pub records: usize,
}
