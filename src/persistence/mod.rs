//! Persistence layer: reservoir directory and status log storage.
//!
//! Provides the [`ReservoirStore`] and [`StoreTransaction`] traits used by
//! the service layer. Two backends implement them: [`PostgresStore`] on
//! `sqlx::PgPool`, and [`MemoryStore`] for running without a database.
//!
//! Every ingestion batch runs inside one [`StoreTransaction`]. Dropping a
//! transaction without calling [`StoreTransaction::commit`] rolls it back.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt::Debug;
use std::future::Future;

use chrono::{DateTime, Utc};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::domain::{Reservoir, ReservoirId, StatusMetrics, StatusSnapshot};

/// Longest reservoir name a store accepts, in characters.
pub const NAME_MAX_CHARS: usize = 255;

/// Longest category a store accepts, in characters.
pub const CATEGORY_MAX_CHARS: usize = 50;

/// Longest minimum-volume annotation a store accepts, in characters.
pub const MIN_VOLUME_MAX_CHARS: usize = 255;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A reservoir with this name already exists.
    #[error("duplicate reservoir name: {0}")]
    DuplicateKey(String),

    /// A text value exceeds its column limit.
    #[error("value too long: {0}")]
    ValueTooLong(String),

    /// A status row referenced a reservoir that does not exist.
    #[error("reservoir {0} does not exist")]
    MissingReservoir(ReservoirId),

    /// The backend could not complete the transaction.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// The backend is misconfigured.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Rejects `value` if it is longer than `max` characters.
///
/// # Errors
///
/// Returns [`StoreError::ValueTooLong`] naming `column`.
pub fn check_length(column: &str, value: &str, max: usize) -> Result<(), StoreError> {
    if value.chars().count() > max {
        return Err(StoreError::ValueTooLong(format!(
            "{column} exceeds {max} characters"
        )));
    }
    Ok(())
}

/// Write access to the store within one atomic unit of work.
pub trait StoreTransaction: Send {
    /// Looks up a reservoir by exact name.
    fn find_reservoir(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Reservoir>, StoreError>> + Send;

    /// Creates a reservoir with unset coordinates.
    ///
    /// Fails with [`StoreError::DuplicateKey`] when the name is taken,
    /// including by a concurrent transaction that committed first. The
    /// transaction stays usable after that error.
    fn insert_reservoir(
        &mut self,
        name: &str,
        category: Option<&str>,
    ) -> impl Future<Output = Result<Reservoir, StoreError>> + Send;

    /// Appends a status snapshot stamped with `timestamp`.
    fn insert_status(
        &mut self,
        reservoir_id: ReservoirId,
        metrics: &StatusMetrics,
        timestamp: DateTime<Utc>,
    ) -> impl Future<Output = Result<StatusSnapshot, StoreError>> + Send;

    /// Makes every write of this transaction visible at once.
    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Shared handle to a reservoir store.
pub trait ReservoirStore: Debug + Send + Sync + 'static {
    /// Transaction type handed out by [`ReservoirStore::begin`].
    type Transaction: StoreTransaction;

    /// Opens a transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Transaction, StoreError>> + Send;

    /// Returns every reservoir in insertion order.
    fn list_reservoirs(&self) -> impl Future<Output = Result<Vec<Reservoir>, StoreError>> + Send;

    /// Returns one reservoir by id.
    fn reservoir(
        &self,
        id: ReservoirId,
    ) -> impl Future<Output = Result<Option<Reservoir>, StoreError>> + Send;

    /// Returns the snapshot with the greatest timestamp for a reservoir.
    ///
    /// Ties are broken by the higher snapshot id.
    fn latest_status(
        &self,
        reservoir_id: ReservoirId,
    ) -> impl Future<Output = Result<Option<StatusSnapshot>, StoreError>> + Send;
}
