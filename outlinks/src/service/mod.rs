use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::store::{Store, StoreError};
use crate::types::{OutLink, OutLinkInput};
use crate::utils::generator::{generate_outlink_id, now_millis};

pub mod defaults;

use defaults::default_outlinks;

#[derive(Error, Debug)]
pub enum OutLinkError {
    #[error("Missing required field: {0}")]
    Validation(&'static str),
    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),
    #[error("Outlink not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Create, update and delete on top of a [`Store`].
///
/// Every operation re-reads the full collection and writes the full collection back.
/// Mutations inside this process are serialized; writers in other processes sharing
/// the same remote store can still overwrite each other.
pub struct OutLinkService {
    store: Arc<dyn Store + Send + Sync>,
    seed_defaults: bool,
    write_lock: Mutex<()>,
}

impl OutLinkService {
    pub fn new(store: Arc<dyn Store + Send + Sync>, seed_defaults: bool) -> Self {
        OutLinkService {
            store,
            seed_defaults,
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Runs once at startup: seeds an empty store and repairs legacy records
    /// (empty `adminPageUrl`, `updatedAt` earlier than `createdAt`).
    /// Returns how many records were repaired.
    pub async fn prepare(&self) -> Result<usize, OutLinkError> {
        let _guard = self.write_lock.lock().await;

        let Some(mut outlinks) = self.store.read_all().await? else {
            self.load().await?;
            return Ok(0);
        };

        let mut repaired = 0;
        for outlink in outlinks.iter_mut() {
            let mut changed = false;
            if outlink.admin_page_url.as_deref() == Some("") {
                outlink.admin_page_url = None;
                changed = true;
            }
            if outlink.updated_at < outlink.created_at {
                outlink.updated_at = outlink.created_at;
                changed = true;
            }
            if changed {
                repaired += 1;
            }
        }

        if repaired > 0 {
            self.store.write_all(&outlinks).await?;
            tracing::info!(repaired, "Normalized legacy outlinks");
        }
        Ok(repaired)
    }

    // Callers that go on to write must hold `write_lock`.
    async fn load(&self) -> Result<Vec<OutLink>, OutLinkError> {
        match self.store.read_all().await? {
            Some(outlinks) => Ok(outlinks),
            None if self.seed_defaults => {
                let outlinks = default_outlinks();
                self.store.write_all(&outlinks).await?;
                tracing::info!(
                    count = outlinks.len(),
                    backend = self.store.backend_name(),
                    "Seeded default outlinks"
                );
                Ok(outlinks)
            }
            None => Ok(Vec::new()),
        }
    }

    pub async fn list(&self) -> Result<Vec<OutLink>, OutLinkError> {
        if let Some(outlinks) = self.store.read_all().await? {
            return Ok(outlinks);
        }
        let _guard = self.write_lock.lock().await;
        self.load().await
    }

    pub async fn get(&self, id: &str) -> Result<OutLink, OutLinkError> {
        self.list()
            .await?
            .into_iter()
            .find(|outlink| outlink.id == id)
            .ok_or(OutLinkError::NotFound)
    }

    pub async fn create(&self, input: OutLinkInput) -> Result<OutLink, OutLinkError> {
        let fields = input.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut outlinks = self.load().await?;

        let now = now_millis();
        let outlink = OutLink::new(generate_outlink_id(now), fields, now);
        outlinks.push(outlink.clone());
        self.store.write_all(&outlinks).await?;

        metrics::counter!("outlinks_mutations_total", "op" => "create").increment(1);
        tracing::info!(id = %outlink.id, name = %outlink.name, "Created outlink");
        Ok(outlink)
    }

    pub async fn update(
        &self,
        id: Option<&str>,
        input: OutLinkInput,
    ) -> Result<OutLink, OutLinkError> {
        let id = id.ok_or(OutLinkError::MissingParameter("id"))?;
        let fields = input.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut outlinks = self.load().await?;

        let outlink = outlinks
            .iter_mut()
            .find(|outlink| outlink.id == id)
            .ok_or(OutLinkError::NotFound)?;
        outlink.apply(fields, now_millis());
        let updated = outlink.clone();
        self.store.write_all(&outlinks).await?;

        metrics::counter!("outlinks_mutations_total", "op" => "update").increment(1);
        tracing::info!(id = %updated.id, name = %updated.name, "Updated outlink");
        Ok(updated)
    }

    /// Removes the record and returns it.
    pub async fn delete(&self, id: Option<&str>) -> Result<OutLink, OutLinkError> {
        let id = id.ok_or(OutLinkError::MissingParameter("id"))?;

        let _guard = self.write_lock.lock().await;
        let mut outlinks = self.load().await?;

        let index = outlinks
            .iter()
            .position(|outlink| outlink.id == id)
            .ok_or(OutLinkError::NotFound)?;
        let deleted = outlinks.remove(index);
        self.store.write_all(&outlinks).await?;

        metrics::counter!("outlinks_mutations_total", "op" => "delete").increment(1);
        tracing::info!(id = %deleted.id, name = %deleted.name, "Deleted outlink");
        Ok(deleted)
    }
}
