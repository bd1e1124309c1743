//! Reservoir identity and the inbound telemetry record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Database-assigned reservoir identifier.
///
/// Assigned by the store when a reservoir is first created and never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservoirId(i64);

impl ReservoirId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReservoirId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named water-storage facility.
///
/// `name` is unique across the store. Coordinates and category are set
/// once, when the reservoir is created, and ingestion never rewrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservoir {
    /// Store-assigned identifier.
    pub id: ReservoirId,
    /// Unique, case-sensitive name.
    pub name: String,
    /// Latitude, unset until an operator fills it in.
    pub lat: Option<f64>,
    /// Longitude, unset until an operator fills it in.
    pub lon: Option<f64>,
    /// Optional classification (the source system calls it `fili`).
    pub category: Option<String>,
}

/// One per-reservoir entry of an ingestion batch or report request.
///
/// Every key other than `name` and `category` is kept as a raw JSON value
/// and coerced later by [`super::StatusMetrics::from_raw`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryRecord {
    /// Reservoir name used for resolution.
    #[serde(default)]
    pub name: String,
    /// Classification applied only when the reservoir is created.
    #[serde(default, alias = "fili")]
    pub category: Option<String>,
    /// Raw metric values keyed by metric name.
    #[serde(flatten)]
    pub metrics: serde_json::Map<String, serde_json::Value>,
}
