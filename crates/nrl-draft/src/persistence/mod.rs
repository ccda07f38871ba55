// Persistence gateway: JSON documents stored under logical keys.
//
// Back-ends implement `StateStore`. Callers never see a load or save failure
// as fatal: loads fall back to a default document, and saves go through the
// debounced `SaveScheduler`, which logs failures.

pub mod debounce;
pub mod local;
pub mod mirror;
pub mod remote;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

pub use debounce::SaveScheduler;
pub use local::LocalStore;
pub use mirror::MirroredStore;
pub use remote::RemoteStore;

/// Key/value store of whole JSON documents. `save` replaces, `delete` removes.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the document stored under `key`, or `None` if nothing is stored.
    async fn load(&self, key: &str) -> Result<Option<Value>>;

    async fn save(&self, key: &str, value: &Value) -> Result<()>;

    /// Remove the document under `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        (**self).save(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }
}

/// Load and decode a document, falling back to `T::default()` when nothing is
/// stored, the store fails, or the stored payload does not decode.
pub async fn load_document<T>(store: &dyn StateStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.load(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(doc) => {
                debug!("Loaded '{key}' from store");
                doc
            }
            Err(e) => {
                warn!("Stored '{key}' is malformed, starting empty: {e}");
                T::default()
            }
        },
        Ok(None) => {
            info!("No saved '{key}', starting empty");
            T::default()
        }
        Err(e) => {
            warn!("Failed to load '{key}', starting empty: {e:#}");
            T::default()
        }
    }
}

/// Delete everything stored under `key`.
pub async fn forget(store: &dyn StateStore, key: &str) -> Result<()> {
    store.delete(key).await?;
    info!("Cleared saved '{key}'");
    Ok(())
}
