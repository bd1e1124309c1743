//! Domain layer: reservoir identity, status readings, and live updates.
//!
//! This module contains the server-side domain model including the
//! reservoir and snapshot types, the metric coercion policy, and the
//! broadcast hub that fans committed updates out to connected viewers.

pub mod broadcast_hub;
pub mod reservoir;
pub mod reservoir_update;
pub mod status;
pub mod viewer_id;

pub use broadcast_hub::{BroadcastHub, Viewer};
pub use reservoir::{Reservoir, ReservoirId, TelemetryRecord};
pub use reservoir_update::ReservoirUpdate;
pub use status::{StatusMetrics, StatusSnapshot};
pub use viewer_id::ViewerId;
