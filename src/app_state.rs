//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::BroadcastHub;
use crate::persistence::ReservoirStore;
use crate::service::{IngestService, QueryService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug)]
pub struct AppState<S> {
    /// Batch ingestion and broadcast.
    pub ingest_service: Arc<IngestService<S>>,
    /// Read paths.
    pub query_service: Arc<QueryService<S>>,
    /// Viewer registry for the live feed.
    pub hub: BroadcastHub,
}

impl<S: ReservoirStore> AppState<S> {
    /// Wires the services around `store` and `hub`.
    #[must_use]
    pub fn new(store: S, hub: BroadcastHub) -> Self {
        let store = Arc::new(store);
        Self {
            ingest_service: Arc::new(IngestService::new(Arc::clone(&store), hub.clone())),
            query_service: Arc::new(QueryService::new(store)),
            hub,
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            ingest_service: Arc::clone(&self.ingest_service),
            query_service: Arc::clone(&self.query_service),
            hub: self.hub.clone(),
        }
    }
}
