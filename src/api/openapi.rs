//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{LatestStatusResponse, ReservoirDto, SubmitDataResponse};
use super::handlers::system::HealthResponse;
use super::handlers::{ingest, report, reservoirs, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "reservoir-gateway", description = "Reservoir telemetry ingestion and query API"),
    paths(
        reservoirs::list_reservoirs,
        reservoirs::get_reservoir,
        reservoirs::latest_status,
        ingest::submit_data,
        report::generate_excel,
        system::health_handler,
    ),
    components(schemas(
        ReservoirDto,
        LatestStatusResponse,
        SubmitDataResponse,
        HealthResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Reservoirs", description = "Reservoir directory and latest readings"),
        (name = "Ingestion", description = "Telemetry batch submission"),
        (name = "Reports", description = "Spreadsheet export"),
        (name = "System", description = "Service status"),
    )
)]
pub struct ApiDoc;
