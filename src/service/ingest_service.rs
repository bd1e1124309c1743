//! Ingestion coordinator: one atomic transaction per batch, then fan-out.

use std::sync::Arc;

use super::{directory, recorder};
use crate::domain::{BroadcastHub, ReservoirUpdate, TelemetryRecord};
use crate::error::{GatewayError, IngestStage};
use crate::persistence::{ReservoirStore, StoreTransaction};

/// Summary of a committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Records persisted.
    pub records: usize,
    /// Reservoirs created by this batch.
    pub created_reservoirs: usize,
    /// Updates queued to viewers, summed over records.
    pub deliveries: usize,
}

/// Orchestrates directory resolution, status recording and broadcast.
///
/// Every batch follows the pattern: begin → for each record resolve and
/// record → commit → publish one [`ReservoirUpdate`] per record. Any failure
/// before commit drops the transaction, so nothing from the batch persists
/// and nothing is published.
#[derive(Debug)]
pub struct IngestService<S> {
    store: Arc<S>,
    hub: BroadcastHub,
}

impl<S: ReservoirStore> IngestService<S> {
    /// Creates a new `IngestService`.
    #[must_use]
    pub fn new(store: Arc<S>, hub: BroadcastHub) -> Self {
        Self { store, hub }
    }

    /// Persists `batch` atomically and broadcasts the committed records.
    ///
    /// An empty batch succeeds without touching the store or the hub.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::IngestFailure`] naming the failing record and
    /// stage. The batch is rolled back in full.
    pub async fn ingest(&self, batch: &[TelemetryRecord]) -> Result<IngestReport, GatewayError> {
        if batch.is_empty() {
            tracing::debug!("empty batch, nothing to ingest");
            return Ok(IngestReport::default());
        }

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|e| GatewayError::ingest(0, IngestStage::Begin, e))?;

        let mut updates = Vec::with_capacity(batch.len());
        let mut created_reservoirs = 0;

        for (index, record) in batch.iter().enumerate() {
            if record.name.is_empty() {
                return Err(GatewayError::ingest(
                    index,
                    IngestStage::Validate,
                    GatewayError::InvalidRequest("reservoir name is empty".to_string()),
                ));
            }

            let resolution = directory::resolve(&mut tx, &record.name, record.category.as_deref())
                .await
                .map_err(|e| GatewayError::ingest(index, IngestStage::Resolve, e))?;
            if resolution.created {
                created_reservoirs += 1;
            }

            let snapshot = recorder::record(&mut tx, resolution.reservoir.id, &record.metrics)
                .await
                .map_err(|e| {
                    let stage = if matches!(e, GatewayError::InvalidMetric { .. }) {
                        IngestStage::Coerce
                    } else {
                        IngestStage::Record
                    };
                    GatewayError::ingest(index, stage, e)
                })?;

            updates.push(ReservoirUpdate::new(
                &resolution.reservoir,
                snapshot.metrics.filling,
            ));
        }

        tx.commit()
            .await
            .map_err(|e| GatewayError::ingest(batch.len(), IngestStage::Commit, e))?;

        let deliveries: usize = updates.iter().map(|u| self.hub.publish(u)).sum();

        tracing::info!(
            records = batch.len(),
            created_reservoirs,
            deliveries,
            "batch ingested"
        );

        Ok(IngestReport {
            records: batch.len(),
            created_reservoirs,
            deliveries,
        })
    }
}
