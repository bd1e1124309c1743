//! Read paths over the reservoir store.

use std::sync::Arc;

use crate::domain::{Reservoir, ReservoirId, StatusSnapshot};
use crate::error::GatewayError;
use crate::persistence::ReservoirStore;

/// Read-only access to reservoirs and their latest readings.
#[derive(Debug)]
pub struct QueryService<S> {
    store: Arc<S>,
}

impl<S: ReservoirStore> QueryService<S> {
    /// Creates a new `QueryService`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns every reservoir in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Persistence`] on store failure.
    pub async fn list_all(&self) -> Result<Vec<Reservoir>, GatewayError> {
        Ok(self.store.list_reservoirs().await?)
    }

    /// Returns a single reservoir.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if `id` is unknown.
    pub async fn reservoir(&self, id: ReservoirId) -> Result<Reservoir, GatewayError> {
        self.store
            .reservoir(id)
            .await?
            .ok_or(GatewayError::NotFound(id))
    }

    /// Returns the most recent snapshot for a reservoir.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the reservoir does not exist or
    /// has no snapshots.
    pub async fn latest(&self, reservoir_id: ReservoirId) -> Result<StatusSnapshot, GatewayError> {
        self.store
            .latest_status(reservoir_id)
            .await?
            .ok_or(GatewayError::NotFound(reservoir_id))
    }
}
