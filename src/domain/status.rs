//! Status snapshots and the metric coercion policy.
//!
//! Inbound telemetry arrives as loosely typed JSON. Every numeric metric is
//! coerced with a "falsy means absent" rule: missing keys, `null`, `""`,
//! `false`, empty containers and any value equal to zero are all stored as
//! unset. A genuine zero reading is therefore indistinguishable from a
//! missing one. Non-empty values that do not parse as a finite number are
//! rejected with [`GatewayError::InvalidMetric`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ReservoirId;
use crate::error::GatewayError;

/// Key of the free-text minimum-volume annotation.
pub const MIN_VOLUME: &str = "min_volume";

/// Metric readings for one reservoir at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusMetrics {
    /// Normal retaining level.
    pub npu: Option<f64>,
    /// Normal retaining level, 2024 reference.
    pub npu_2024: Option<f64>,
    /// Normal retaining level, 2025 reference.
    pub npu_2025: Option<f64>,
    /// Volume at normal retaining level.
    pub volume: Option<f64>,
    /// Volume at forced retaining level.
    pub fpu_volume: Option<f64>,
    /// Volume, 2024 reference.
    pub volume_2024: Option<f64>,
    /// Volume, 2025 reference.
    pub volume_2025: Option<f64>,
    /// Fill percentage.
    pub filling: Option<f64>,
    /// Free capacity, million m³.
    pub free_volume: Option<f64>,
    /// Daily inflow, 2024 reference.
    pub daily_inflow_2024: Option<f64>,
    /// Daily inflow, 2025 reference.
    pub daily_inflow_2025: Option<f64>,
    /// Daily outflow, 2024 reference.
    pub daily_outflow_2024: Option<f64>,
    /// Daily outflow, 2025 reference.
    pub daily_outflow_2025: Option<f64>,
    /// Maximum discharge capacity, m³/s.
    pub max_capacity: Option<f64>,
    /// Minimum-volume annotation, stored verbatim.
    pub min_volume: Option<String>,
    /// Water level.
    pub water_level: Option<f64>,
    /// Pollution level.
    pub pollution_level: Option<f64>,
}

impl StatusMetrics {
    /// Coerces a raw metric map into typed readings.
    ///
    /// Unknown keys are ignored, including any caller-supplied `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidMetric`] for the first numeric field
    /// whose value is non-empty but not a finite number.
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self, GatewayError> {
        let number = |field: &str| coerce_number(field, raw.get(field));

        Ok(Self {
            npu: number("npu")?,
            npu_2024: number("npu_2024")?,
            npu_2025: number("npu_2025")?,
            volume: number("volume")?,
            fpu_volume: number("fpu_volume")?,
            volume_2024: number("volume_2024")?,
            volume_2025: number("volume_2025")?,
            filling: number("filling")?,
            free_volume: number("free_volume")?,
            daily_inflow_2024: number("daily_inflow_2024")?,
            daily_inflow_2025: number("daily_inflow_2025")?,
            daily_outflow_2024: number("daily_outflow_2024")?,
            daily_outflow_2025: number("daily_outflow_2025")?,
            max_capacity: number("max_capacity")?,
            min_volume: annotation(raw.get(MIN_VOLUME)),
            water_level: number("water_level")?,
            pollution_level: number("pollution_level")?,
        })
    }
}

/// One immutable, timestamped set of readings for a reservoir.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Store-assigned identifier.
    pub id: i64,
    /// Reservoir the readings belong to.
    pub reservoir_id: ReservoirId,
    /// The readings themselves.
    #[serde(flatten)]
    pub metrics: StatusMetrics,
    /// Server-side recording time.
    pub timestamp: DateTime<Utc>,
}

/// Applies the falsy-means-absent rule to a single numeric field.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidMetric`] when `value` is truthy but cannot
/// be read as a finite number.
pub fn coerce_number(field: &str, value: Option<&Value>) -> Result<Option<f64>, GatewayError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Bool(flag)) => Some(if *flag { 1.0 } else { 0.0 }),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Array(items)) if items.is_empty() => return Ok(None),
        Some(Value::Object(map)) if map.is_empty() => return Ok(None),
        Some(Value::Array(_) | Value::Object(_)) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok((v != 0.0).then_some(v)),
        _ => Err(GatewayError::InvalidMetric {
            field: field.to_string(),
            value: value.map(ToString::to_string).unwrap_or_default(),
        }),
    }
}

/// Keeps the annotation as text without interpreting it.
fn annotation(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
