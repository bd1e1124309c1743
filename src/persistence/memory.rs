//! In-process store used when persistence is disabled.
//!
//! Transactions are serialized: [`MemoryStore::begin`] takes an owned lock on
//! the whole state and stages writes on a working copy. Commit swaps the
//! copy in; dropping the transaction discards it. Readers wait for an open
//! transaction to finish, so they never observe a partial batch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    CATEGORY_MAX_CHARS, MIN_VOLUME_MAX_CHARS, NAME_MAX_CHARS, ReservoirStore, StoreError,
    StoreTransaction, check_length,
};
use crate::domain::{Reservoir, ReservoirId, StatusMetrics, StatusSnapshot};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    reservoirs: Vec<Reservoir>,
    statuses: Vec<StatusSnapshot>,
    last_reservoir_id: i64,
    last_status_id: i64,
}

impl MemoryState {
    fn reservoir_by_name(&self, name: &str) -> Option<&Reservoir> {
        self.reservoirs.iter().find(|r| r.name == name)
    }

    fn reservoir_by_id(&self, id: ReservoirId) -> Option<&Reservoir> {
        self.reservoirs.iter().find(|r| r.id == id)
    }
}

/// Volatile store backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the coordinates of an existing reservoir.
    ///
    /// Stands in for the operator tooling that fills in locations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingReservoir`] if `id` is unknown.
    pub async fn set_coordinates(
        &self,
        id: ReservoirId,
        lat: f64,
        lon: f64,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let reservoir = state
            .reservoirs
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::MissingReservoir(id))?;
        reservoir.lat = Some(lat);
        reservoir.lon = Some(lon);
        Ok(())
    }

    /// Returns the number of stored snapshots across all reservoirs.
    pub async fn status_count(&self) -> usize {
        self.state.lock().await.statuses.len()
    }
}

impl ReservoirStore for MemoryStore {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTransaction { guard, working })
    }

    async fn list_reservoirs(&self) -> Result<Vec<Reservoir>, StoreError> {
        Ok(self.state.lock().await.reservoirs.clone())
    }

    async fn reservoir(&self, id: ReservoirId) -> Result<Option<Reservoir>, StoreError> {
        Ok(self.state.lock().await.reservoir_by_id(id).cloned())
    }

    async fn latest_status(
        &self,
        reservoir_id: ReservoirId,
    ) -> Result<Option<StatusSnapshot>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .statuses
            .iter()
            .filter(|s| s.reservoir_id == reservoir_id)
            .max_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)))
            .cloned())
    }
}

/// Open transaction on a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

impl StoreTransaction for MemoryTransaction {
    async fn find_reservoir(&mut self, name: &str) -> Result<Option<Reservoir>, StoreError> {
        Ok(self.working.reservoir_by_name(name).cloned())
    }

    async fn insert_reservoir(
        &mut self,
        name: &str,
        category: Option<&str>,
    ) -> Result<Reservoir, StoreError> {
        check_length("name", name, NAME_MAX_CHARS)?;
        if let Some(category) = category {
            check_length("category", category, CATEGORY_MAX_CHARS)?;
        }
        if self.working.reservoir_by_name(name).is_some() {
            return Err(StoreError::DuplicateKey(name.to_string()));
        }
        self.working.last_reservoir_id += 1;
        let reservoir = Reservoir {
            id: ReservoirId::new(self.working.last_reservoir_id),
            name: name.to_string(),
            lat: None,
            lon: None,
            category: category.map(ToString::to_string),
        };
        self.working.reservoirs.push(reservoir.clone());
        Ok(reservoir)
    }

    async fn insert_status(
        &mut self,
        reservoir_id: ReservoirId,
        metrics: &StatusMetrics,
        timestamp: DateTime<Utc>,
    ) -> Result<StatusSnapshot, StoreError> {
        if self.working.reservoir_by_id(reservoir_id).is_none() {
            return Err(StoreError::MissingReservoir(reservoir_id));
        }
        if let Some(annotation) = &metrics.min_volume {
            check_length("min_volume", annotation, MIN_VOLUME_MAX_CHARS)?;
        }
        self.working.last_status_id += 1;
        let snapshot = StatusSnapshot {
            id: self.working.last_status_id,
            reservoir_id,
            metrics: metrics.clone(),
            timestamp,
        };
        self.working.statuses.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn commit(self) -> Result<(), StoreError> {
        let Self { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}
