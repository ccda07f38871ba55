// Primary store with a best-effort mirror (local SQLite mirrored to the backend).

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::StateStore;

/// Writes go to both stores; only the primary's failures are reported. Reads
/// prefer the primary and fall back to the mirror when the primary has nothing
/// or fails.
pub struct MirroredStore {
    primary: Box<dyn StateStore>,
    mirror: Box<dyn StateStore>,
}

impl MirroredStore {
    pub fn new(primary: Box<dyn StateStore>, mirror: Box<dyn StateStore>) -> Self {
        Self { primary, mirror }
    }
}

#[async_trait]
impl StateStore for MirroredStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let primary = match self.primary.load(key).await {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("Primary store load of '{key}' failed, trying mirror: {e:#}");
                Err(e)
            }
        };
        match self.mirror.load(key).await {
            Ok(Some(value)) => {
                debug!("Loaded '{key}' from mirror");
                Ok(Some(value))
            }
            Ok(None) => primary,
            Err(e) => {
                warn!("Mirror load of '{key}' failed: {e:#}");
                primary
            }
        }
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        let result = self.primary.save(key, value).await;
        if let Err(e) = self.mirror.save(key, value).await {
            warn!("Mirror save of '{key}' failed: {e:#}");
        }
        result
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let result = self.primary.delete(key).await;
        if let Err(e) = self.mirror.delete(key).await {
            warn!("Mirror delete of '{key}' failed: {e:#}");
        }
        result
    }
}
