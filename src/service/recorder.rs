//! Status recorder: appends coerced snapshots.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::domain::{ReservoirId, StatusMetrics, StatusSnapshot};
use crate::error::GatewayError;
use crate::persistence::StoreTransaction;

/// Coerces `raw` and appends it as a new snapshot for `reservoir_id`.
///
/// The timestamp is taken here, at recording time. A `timestamp` key in
/// `raw` is ignored.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidMetric`] if a metric cannot be coerced and
/// [`GatewayError::Persistence`] if the insert fails.
pub async fn record<T: StoreTransaction>(
    tx: &mut T,
    reservoir_id: ReservoirId,
    raw: &Map<String, Value>,
) -> Result<StatusSnapshot, GatewayError> {
    let metrics = StatusMetrics::from_raw(raw)?;
    let snapshot = tx.insert_status(reservoir_id, &metrics, Utc::now()).await?;
    tracing::debug!(%reservoir_id, snapshot_id = snapshot.id, "status recorded");
    Ok(snapshot)
}
