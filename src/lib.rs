//! # reservoir-gateway
//!
//! Telemetry gateway for water reservoirs.
//!
//! Field stations submit batches of readings over HTTP. Each batch is
//! written to the store in one transaction, creating unseen reservoirs on
//! the way, and every committed record is pushed to live dashboard viewers
//! over WebSocket. The same readings can be exported as an `.xlsx` report.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     ├── Report renderer (report/)
//!     │
//!     ├── IngestService / QueryService (service/)
//!     ├── BroadcastHub (domain/)
//!     │
//!     └── ReservoirStore (persistence/)
//!           ├── PostgreSQL
//!           └── in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod report;
pub mod service;
pub mod ws;
