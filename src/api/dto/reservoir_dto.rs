//! Reservoir and latest-status DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Reservoir, StatusSnapshot};

/// Reservoir identity for `GET /api/reservoirs/all`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReservoirDto {
    /// Reservoir identifier.
    pub id: i64,
    /// Unique name.
    pub name: String,
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lon: Option<f64>,
    /// Classification.
    pub category: Option<String>,
}

impl From<Reservoir> for ReservoirDto {
    fn from(r: Reservoir) -> Self {
        Self {
            id: r.id.get(),
            name: r.name,
            lat: r.lat,
            lon: r.lon,
            category: r.category,
        }
    }
}

/// Latest readings for `GET /api/reservoirs/{id}/latest`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LatestStatusResponse {
    /// Reservoir identifier.
    pub reservoir_id: i64,
    /// Fill percentage.
    pub filling: Option<f64>,
    /// Water level.
    pub water_level: Option<f64>,
    /// Pollution level.
    pub pollution_level: Option<f64>,
    /// Recording time.
    pub timestamp: DateTime<Utc>,
}

impl From<StatusSnapshot> for LatestStatusResponse {
    fn from(s: StatusSnapshot) -> Self {
        Self {
            reservoir_id: s.reservoir_id.get(),
            filling: s.metrics.filling,
            water_level: s.metrics.water_level,
            pollution_level: s.metrics.pollution_level,
            timestamp: s.timestamp,
        }
    }
}
