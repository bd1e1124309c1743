//! Registry of connected viewers and fan-out of committed updates.
//!
//! [`BroadcastHub`] owns one unbounded [`tokio::sync::mpsc`] queue per
//! viewer, so a whole batch is queued without blocking the ingest path no
//! matter how many records it carries. A viewer whose receiving end is gone
//! is unregistered on the spot and the remaining viewers still get the
//! update. There is no replay, so a viewer only sees updates published while
//! it is registered.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use super::{ReservoirUpdate, ViewerId};

type Registry = HashMap<ViewerId, mpsc::UnboundedSender<ReservoirUpdate>>;

/// Shared, cloneable handle to the viewer registry.
#[derive(Debug, Clone, Default)]
pub struct BroadcastHub {
    viewers: Arc<Mutex<Registry>>,
}

impl BroadcastHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new viewer.
    ///
    /// The returned [`Viewer`] stays registered until it is dropped, until
    /// [`BroadcastHub::disconnect`] is called with its id, or until a
    /// delivery to it fails.
    #[must_use]
    pub fn connect(&self) -> Viewer {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = ViewerId::new();
        let count = {
            let mut viewers = self.lock();
            viewers.insert(id, sender);
            viewers.len()
        };
        tracing::debug!(viewer = %id, viewers = count, "viewer connected");
        Viewer {
            id,
            receiver,
            hub: self.clone(),
        }
    }

    /// Removes a viewer. Returns `false` if it was not registered.
    pub fn disconnect(&self, id: ViewerId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            tracing::debug!(viewer = %id, "viewer disconnected");
        }
        removed
    }

    /// Delivers `update` to every registered viewer.
    ///
    /// Returns the number of viewers the update was queued for. Viewers
    /// whose receiver has been dropped are unregistered.
    pub fn publish(&self, update: &ReservoirUpdate) -> usize {
        let mut viewers = self.lock();
        let mut failed = Vec::new();
        for (id, sender) in viewers.iter() {
            if sender.send(update.clone()).is_err() {
                tracing::warn!(viewer = %id, "dropping viewer after failed delivery");
                failed.push(*id);
            }
        }
        for id in &failed {
            viewers.remove(id);
        }
        viewers.len()
    }

    /// Returns the number of registered viewers.
    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn is_connected(&self, id: ViewerId) -> bool {
        self.lock().contains_key(&id)
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.viewers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped viewer registration.
///
/// Dropping the handle unregisters the viewer, so every exit path of a
/// connection task releases its slot.
#[derive(Debug)]
pub struct Viewer {
    id: ViewerId,
    receiver: mpsc::UnboundedReceiver<ReservoirUpdate>,
    hub: BroadcastHub,
}

impl Viewer {
    /// Returns this viewer's id.
    #[must_use]
    pub const fn id(&self) -> ViewerId {
        self.id
    }

    /// Waits for the next update in publish order.
    ///
    /// Returns `None` once the hub has unregistered this viewer and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<ReservoirUpdate> {
        self.receiver.recv().await
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.hub.disconnect(self.id);
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ReservoirId;

    fn make_update(id: i64, fill: f64) -> ReservoirUpdate {
        ReservoirUpdate {
            id: ReservoirId::new(id),
            name: format!("reservoir-{id}"),
            lat: None,
            lon: None,
            fill_percent: Some(fill),
        }
    }

    #[test]
    fn publish_without_viewers_delivers_nothing() {
        let hub = BroadcastHub::new();
        assert_eq!(hub.publish(&make_update(1, 50.0)), 0);
    }

    #[tokio::test]
    async fn every_viewer_receives_the_update() {
        let hub = BroadcastHub::new();
        let mut a = hub.connect();
        let mut b = hub.connect();

        assert_eq!(hub.publish(&make_update(1, 50.0)), 2);

        let Some(ua) = a.recv().await else {
            panic!("viewer a missed the update");
        };
        let Some(ub) = b.recv().await else {
            panic!("viewer b missed the update");
        };
        assert_eq!(ua, ub);
        assert_eq!(ua.fill_percent, Some(50.0));
    }

    #[tokio::test]
    async fn severed_viewer_is_removed_and_others_still_receive() {
        let hub = BroadcastHub::new();
        let mut alive = hub.connect();
        let severed = hub.connect();
        let severed_id = severed.id();
        assert_eq!(hub.viewer_count(), 2);

        drop(severed);
        assert!(!hub.is_connected(severed_id));

        assert_eq!(hub.publish(&make_update(2, 61.0)), 1);
        let Some(update) = alive.recv().await else {
            panic!("remaining viewer missed the update");
        };
        assert_eq!(update.id, ReservoirId::new(2));
        assert_eq!(hub.viewer_count(), 1);
    }

    #[tokio::test]
    async fn idle_viewer_keeps_every_queued_update() {
        let hub = BroadcastHub::new();
        let mut idle = hub.connect();

        for n in 0..1_000 {
            assert_eq!(hub.publish(&make_update(n, 1.0)), 1);
        }
        assert!(hub.is_connected(idle.id()));

        for n in 0..1_000 {
            let Some(update) = idle.recv().await else {
                panic!("update {n} was lost");
            };
            assert_eq!(update.id, ReservoirId::new(n));
        }
    }

    #[tokio::test]
    async fn unregistered_viewer_drains_then_ends() {
        let hub = BroadcastHub::new();
        let mut viewer = hub.connect();
        hub.publish(&make_update(1, 10.0));
        assert!(hub.disconnect(viewer.id()));

        assert!(viewer.recv().await.is_some());
        assert!(viewer.recv().await.is_none());
    }

    #[tokio::test]
    async fn updates_arrive_in_publish_order() {
        let hub = BroadcastHub::new();
        let mut viewer = hub.connect();
        for fill in [10.0, 20.0, 30.0] {
            hub.publish(&make_update(1, fill));
        }
        for expected in [10.0, 20.0, 30.0] {
            let Some(update) = viewer.recv().await else {
                panic!("missing update");
            };
            assert_eq!(update.fill_percent, Some(expected));
        }
    }

    #[test]
    fn disconnect_is_idempotent() {
        let hub = BroadcastHub::new();
        let viewer = hub.connect();
        let id = viewer.id();
        assert!(hub.disconnect(id));
        assert!(!hub.disconnect(id));
        drop(viewer);
        assert_eq!(hub.viewer_count(), 0);
    }
}
