//! Type-safe identifier for a connected live-feed viewer.
//!
//! [`ViewerId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that viewer
//! handles cannot be confused with other UUIDs or with reservoir ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a registered viewer.
///
/// Generated once when the viewer connects to the
/// [`super::BroadcastHub`] and used as the key of its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerId(uuid::Uuid);

impl ViewerId {
    /// Creates a new random `ViewerId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ViewerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(ViewerId::new(), ViewerId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let s = ViewerId::new().to_string();
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn usable_as_map_key() {
        use std::collections::HashMap;
        let id = ViewerId::new();
        let mut map = HashMap::new();
        map.insert(id, "viewer");
        assert_eq!(map.get(&id), Some(&"viewer"));
    }
}
