//! PostgreSQL implementation of the persistence layer.
//!
//! Uses runtime-built, parameterized queries so no live database is needed
//! at build time. The schema is created on startup if it is missing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};

use super::models::{ReservoirRow, StatusRow};
use super::{
    CATEGORY_MAX_CHARS, MIN_VOLUME_MAX_CHARS, NAME_MAX_CHARS, ReservoirStore, StoreError,
    StoreTransaction, check_length,
};
use crate::config::GatewayConfig;
use crate::domain::{Reservoir, ReservoirId, StatusMetrics, StatusSnapshot};

/// Idempotent schema bootstrap.
///
/// `VARCHAR` limits mirror [`NAME_MAX_CHARS`], [`CATEGORY_MAX_CHARS`] and
/// [`MIN_VOLUME_MAX_CHARS`].
const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS reservoirs (
    id          BIGSERIAL PRIMARY KEY,
    name        VARCHAR(255) NOT NULL UNIQUE,
    lat         DOUBLE PRECISION,
    lon         DOUBLE PRECISION,
    category    VARCHAR(50)
);

CREATE TABLE IF NOT EXISTS reservoir_status (
    id                  BIGSERIAL PRIMARY KEY,
    reservoir_id        BIGINT NOT NULL REFERENCES reservoirs (id),
    npu                 DOUBLE PRECISION,
    npu_2024            DOUBLE PRECISION,
    npu_2025            DOUBLE PRECISION,
    volume              DOUBLE PRECISION,
    fpu_volume          DOUBLE PRECISION,
    volume_2024         DOUBLE PRECISION,
    volume_2025         DOUBLE PRECISION,
    filling             DOUBLE PRECISION,
    free_volume         DOUBLE PRECISION,
    daily_inflow_2024   DOUBLE PRECISION,
    daily_inflow_2025   DOUBLE PRECISION,
    daily_outflow_2024  DOUBLE PRECISION,
    daily_outflow_2025  DOUBLE PRECISION,
    max_capacity        DOUBLE PRECISION,
    min_volume          VARCHAR(255),
    water_level         DOUBLE PRECISION,
    pollution_level     DOUBLE PRECISION,
    timestamp           TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS reservoir_status_latest_idx
    ON reservoir_status (reservoir_id, timestamp DESC, id DESC);
";

const RESERVOIR_COLUMNS: &str = "id, name, lat, lon, category";

const STATUS_COLUMNS: &str = "id, reservoir_id, npu, npu_2024, npu_2025, volume, fpu_volume, \
     volume_2024, volume_2025, filling, free_volume, daily_inflow_2024, daily_inflow_2025, \
     daily_outflow_2024, daily_outflow_2025, max_capacity, min_volume, water_level, \
     pollution_level, timestamp";

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL SQLSTATE for `string_data_right_truncation`.
const STRING_TOO_LONG: &str = "22001";

/// PostgreSQL SQLSTATE for `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the database settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed and
    /// [`StoreError::Database`] if the pool cannot connect.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, StoreError> {
        let options: PgConnectOptions = config
            .database_url
            .parse()
            .map_err(|e: sqlx::Error| StoreError::Config(format!("invalid database URL: {e}")))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect_with(options)
            .await?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "connected to PostgreSQL"
        );
        Ok(Self::new(pool))
    }

    /// Creates the tables and index if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::info!("database schema ready");
        Ok(())
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ReservoirStore for PostgresStore {
    type Transaction = PostgresTransaction;

    async fn begin(&self) -> Result<PostgresTransaction, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(PostgresTransaction { tx })
    }

    async fn list_reservoirs(&self) -> Result<Vec<Reservoir>, StoreError> {
        let rows = sqlx::query_as::<_, ReservoirRow>(&format!(
            "SELECT {RESERVOIR_COLUMNS} FROM reservoirs ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Reservoir::from).collect())
    }

    async fn reservoir(&self, id: ReservoirId) -> Result<Option<Reservoir>, StoreError> {
        let row = sqlx::query_as::<_, ReservoirRow>(&format!(
            "SELECT {RESERVOIR_COLUMNS} FROM reservoirs WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Reservoir::from))
    }

    async fn latest_status(
        &self,
        reservoir_id: ReservoirId,
    ) -> Result<Option<StatusSnapshot>, StoreError> {
        let row = sqlx::query_as::<_, StatusRow>(&format!(
            "SELECT {STATUS_COLUMNS} FROM reservoir_status WHERE reservoir_id = $1 \
             ORDER BY timestamp DESC, id DESC LIMIT 1"
        ))
        .bind(reservoir_id.get())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StatusSnapshot::from))
    }
}

/// One open PostgreSQL transaction.
///
/// `sqlx` rolls the transaction back when it is dropped uncommitted.
#[derive(Debug)]
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

impl StoreTransaction for PostgresTransaction {
    async fn find_reservoir(&mut self, name: &str) -> Result<Option<Reservoir>, StoreError> {
        let row = sqlx::query_as::<_, ReservoirRow>(&format!(
            "SELECT {RESERVOIR_COLUMNS} FROM reservoirs WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Reservoir::from))
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

        // ON CONFLICT waits for a concurrent inserter and then skips the row
        // instead of aborting this transaction.
        let row = sqlx::query_as::<_, ReservoirRow>(&format!(
            "INSERT INTO reservoirs (name, category, lat, lon) VALUES ($1, $2, NULL, NULL) \
             ON CONFLICT (name) DO NOTHING RETURNING {RESERVOIR_COLUMNS}"
        ))
        .bind(name)
        .bind(category)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(classify)?;

        row.map(Reservoir::from)
            .ok_or_else(|| StoreError::DuplicateKey(name.to_string()))
    }

    async fn insert_status(
        &mut self,
        reservoir_id: ReservoirId,
        metrics: &StatusMetrics,
        timestamp: DateTime<Utc>,
    ) -> Result<StatusSnapshot, StoreError> {
        if let Some(annotation) = &metrics.min_volume {
            check_length("min_volume", annotation, MIN_VOLUME_MAX_CHARS)?;
        }

        let row = sqlx::query_as::<_, StatusRow>(&format!(
            "INSERT INTO reservoir_status (reservoir_id, npu, npu_2024, npu_2025, volume, \
             fpu_volume, volume_2024, volume_2025, filling, free_volume, daily_inflow_2024, \
             daily_inflow_2025, daily_outflow_2024, daily_outflow_2025, max_capacity, min_volume, \
             water_level, pollution_level, timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
             $18, $19) RETURNING {STATUS_COLUMNS}"
        ))
        .bind(reservoir_id.get())
        .bind(metrics.npu)
        .bind(metrics.npu_2024)
        .bind(metrics.npu_2025)
        .bind(metrics.volume)
        .bind(metrics.fpu_volume)
        .bind(metrics.volume_2024)
        .bind(metrics.volume_2025)
        .bind(metrics.filling)
        .bind(metrics.free_volume)
        .bind(metrics.daily_inflow_2024)
        .bind(metrics.daily_inflow_2025)
        .bind(metrics.daily_outflow_2024)
        .bind(metrics.daily_outflow_2025)
        .bind(metrics.max_capacity)
        .bind(metrics.min_volume.as_deref())
        .bind(metrics.water_level)
        .bind(metrics.pollution_level)
        .bind(timestamp)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            if sqlstate(&e).as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                StoreError::MissingReservoir(reservoir_id)
            } else {
                classify(e)
            }
        })?;

        Ok(StatusSnapshot::from(row))
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(classify)
    }
}

/// Returns the SQLSTATE of a database error, if any.
fn sqlstate(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned())
}

/// Maps constraint violations to dedicated variants.
fn classify(err: sqlx::Error) -> StoreError {
    let Some(code) = sqlstate(&err) else {
        return StoreError::Database(err);
    };
    let detail = err.as_database_error().map_or_else(String::new, |db| {
        db.constraint()
            .map_or_else(|| db.message().to_string(), ToString::to_string)
    });
    match code.as_str() {
        UNIQUE_VIOLATION => StoreError::DuplicateKey(detail),
        STRING_TOO_LONG => StoreError::ValueTooLong(detail),
        SERIALIZATION_FAILURE => StoreError::Conflict(format!("{code}: {detail}")),
        _ => StoreError::Database(err),
    }
}
