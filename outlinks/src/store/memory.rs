use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Store, StoreError};
use crate::types::OutLink;

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    outlinks: RwLock<Option<Vec<OutLink>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outlinks(outlinks: Vec<OutLink>) -> Self {
        MemoryStore {
            outlinks: RwLock::new(Some(outlinks)),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read_all(&self) -> Result<Option<Vec<OutLink>>, StoreError> {
        let outlinks = self.outlinks.read().await.clone();
        tracing::debug!(
            count = outlinks.as_ref().map_or(0, Vec::len),
            "Read outlinks from memory"
        );
        Ok(outlinks)
    }

    async fn write_all(&self, outlinks: &[OutLink]) -> Result<(), StoreError> {
        *self.outlinks.write().await = Some(outlinks.to_vec());
        tracing::debug!(count = outlinks.len(), "Wrote outlinks to memory");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
