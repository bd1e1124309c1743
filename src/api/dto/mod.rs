//! Data Transfer Objects for REST request/response serialization.

pub mod ingest_dto;
pub mod reservoir_dto;

pub use ingest_dto::*;
pub use reservoir_dto::*;
