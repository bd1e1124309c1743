//! Reservoir directory: name → identity resolution.

use crate::domain::Reservoir;
use crate::persistence::{StoreError, StoreTransaction};

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The existing or newly created reservoir.
    pub reservoir: Reservoir,
    /// `true` if this call created it.
    pub created: bool,
}

/// Returns the reservoir named `name`, creating it if absent.
///
/// An existing reservoir is returned as stored: `category` is only applied
/// on creation. If another writer creates the same name first, the
/// insert's [`StoreError::DuplicateKey`] is absorbed and the winning row is
/// looked up instead.
///
/// # Errors
///
/// Returns a [`StoreError`] if the store fails, or
/// [`StoreError::DuplicateKey`] if the conflicting row is still not visible
/// after the retry.
pub async fn resolve<T: StoreTransaction>(
    tx: &mut T,
    name: &str,
    category: Option<&str>,
) -> Result<Resolution, StoreError> {
    if let Some(reservoir) = tx.find_reservoir(name).await? {
        return Ok(Resolution {
            reservoir,
            created: false,
        });
    }

    match tx.insert_reservoir(name, category).await {
        Ok(reservoir) => {
            tracing::info!(reservoir_id = %reservoir.id, reservoir = name, "reservoir created");
            Ok(Resolution {
                reservoir,
                created: true,
            })
        }
        Err(StoreError::DuplicateKey(key)) => {
            tracing::debug!(reservoir = name, "lost reservoir creation race, re-resolving");
            let reservoir = tx
                .find_reservoir(name)
                .await?
                .ok_or(StoreError::DuplicateKey(key))?;
            Ok(Resolution {
                reservoir,
                created: false,
            })
        }
        Err(err) => Err(err),
    }
}
