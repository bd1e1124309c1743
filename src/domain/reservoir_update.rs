//! Live update pushed to viewers after an ingestion batch commits.

use serde::Serialize;

use super::{Reservoir, ReservoirId};

/// Broadcast payload for one ingested record.
///
/// Coordinates are the values stored at commit time, so a reservoir created
/// by the same batch carries `null` for both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservoirUpdate {
    /// Reservoir identifier.
    pub id: ReservoirId,
    /// Reservoir name.
    pub name: String,
    /// Stored latitude.
    pub lat: Option<f64>,
    /// Stored longitude.
    pub lon: Option<f64>,
    /// Fill percentage from the ingested record.
    pub fill_percent: Option<f64>,
}

impl ReservoirUpdate {
    /// Builds the update for `reservoir` with the record's fill reading.
    #[must_use]
    pub fn new(reservoir: &Reservoir, fill_percent: Option<f64>) -> Self {
        Self {
            id: reservoir.id,
            name: reservoir.name.clone(),
            lat: reservoir.lat,
            lon: reservoir.lon,
            fill_percent,
        }
    }
}
