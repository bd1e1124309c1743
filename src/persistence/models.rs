//! Database row models for reservoirs and status snapshots.

use chrono::{DateTime, Utc};

use crate::domain::{Reservoir, ReservoirId, StatusMetrics, StatusSnapshot};

/// A row from the `reservoirs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReservoirRow {
    /// Auto-increment row ID.
    pub id: i64,
    /// Unique reservoir name.
    pub name: String,
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lon: Option<f64>,
    /// Classification.
    pub category: Option<String>,
}

impl From<ReservoirRow> for Reservoir {
    fn from(row: ReservoirRow) -> Self {
        Self {
            id: ReservoirId::new(row.id),
            name: row.name,
            lat: row.lat,
            lon: row.lon,
            category: row.category,
        }
    }
}

/// A row from the `reservoir_status` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusRow {
    /// Auto-increment row ID.
    pub id: i64,
    /// Owning reservoir.
    pub reservoir_id: i64,
    /// See [`StatusMetrics::npu`].
    pub npu: Option<f64>,
    /// See [`StatusMetrics::npu_2024`].
    pub npu_2024: Option<f64>,
    /// See [`StatusMetrics::npu_2025`].
    pub npu_2025: Option<f64>,
    /// See [`StatusMetrics::volume`].
    pub volume: Option<f64>,
    /// See [`StatusMetrics::fpu_volume`].
    pub fpu_volume: Option<f64>,
    /// See [`StatusMetrics::volume_2024`].
    pub volume_2024: Option<f64>,
    /// See [`StatusMetrics::volume_2025`].
    pub volume_2025: Option<f64>,
    /// See [`StatusMetrics::filling`].
    pub filling: Option<f64>,
    /// See [`StatusMetrics::free_volume`].
    pub free_volume: Option<f64>,
    /// See [`StatusMetrics::daily_inflow_2024`].
    pub daily_inflow_2024: Option<f64>,
    /// See [`StatusMetrics::daily_inflow_2025`].
    pub daily_inflow_2025: Option<f64>,
    /// See [`StatusMetrics::daily_outflow_2024`].
    pub daily_outflow_2024: Option<f64>,
    /// See [`StatusMetrics::daily_outflow_2025`].
    pub daily_outflow_2025: Option<f64>,
    /// See [`StatusMetrics::max_capacity`].
    pub max_capacity: Option<f64>,
    /// See [`StatusMetrics::min_volume`].
    pub min_volume: Option<String>,
    /// See [`StatusMetrics::water_level`].
    pub water_level: Option<f64>,
    /// See [`StatusMetrics::pollution_level`].
    pub pollution_level: Option<f64>,
    /// Server-side recording time.
    pub timestamp: DateTime<Utc>,
}

impl From<StatusRow> for StatusSnapshot {
    fn from(row: StatusRow) -> Self {
        Self {
            id: row.id,
            reservoir_id: ReservoirId::new(row.reservoir_id),
            metrics: StatusMetrics {
                npu: row.npu,
                npu_2024: row.npu_2024,
                npu_2025: row.npu_2025,
                volume: row.volume,
                fpu_volume: row.fpu_volume,
                volume_2024: row.volume_2024,
                volume_2025: row.volume_2025,
                filling: row.filling,
                free_volume: row.free_volume,
                daily_inflow_2024: row.daily_inflow_2024,
                daily_inflow_2025: row.daily_inflow_2025,
                daily_outflow_2024: row.daily_outflow_2024,
                daily_outflow_2025: row.daily_outflow_2025,
                max_capacity: row.max_capacity,
                min_volume: row.min_volume,
                water_level: row.water_level,
                pollution_level: row.pollution_level,
            },
            timestamp: row.timestamp,
        }
    }
}
