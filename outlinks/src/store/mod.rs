use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::StoreBackend;
use crate::types::OutLink;

pub mod kv;
pub mod memory;

pub use kv::KvStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("KV request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("KV returned an error: {0}")]
    Remote(String),
    #[error("KV returned unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("Unexpected KV reply: {0}")]
    UnexpectedReply(String),
    #[error("Could not (de)serialize outlinks: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Holds the whole outlink collection. Reads and writes are always of the full,
/// ordered sequence; there are no partial updates.
#[async_trait]
pub trait Store {
    /// `None` means the collection has never been written.
    async fn read_all(&self) -> Result<Option<Vec<OutLink>>, StoreError>;

    async fn write_all(&self, outlinks: &[OutLink]) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}

pub fn create_store(
    backend: &StoreBackend,
    key: &str,
    timeout: Duration,
) -> Result<Arc<dyn Store + Send + Sync>, StoreError> {
    match backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::RemoteKv { url, token } => Ok(Arc::new(KvStore::new(
            url.clone(),
            token.clone(),
            key.to_string(),
            timeout,
        )?)),
    }
}
