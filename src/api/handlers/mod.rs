//! REST endpoint handlers organized by resource.

pub mod ingest;
pub mod report;
pub mod reservoirs;
pub mod system;

use axum::Router;

use crate::app_state::AppState;
use crate::persistence::ReservoirStore;

/// Composes all resource routes.
pub fn routes<S: ReservoirStore>() -> Router<AppState<S>> {
    Router::new()
        .merge(reservoirs::routes())
        .merge(ingest::routes())
        .merge(report::routes())
        .merge(system::routes())
}
