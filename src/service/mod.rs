//! Service layer: ingestion and query orchestration.

pub mod directory;
pub mod ingest_service;
pub mod query_service;
pub mod recorder;

pub use ingest_service::{IngestReport, IngestService};
pub use query_service::QueryService;
