use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::config::Config;
use crate::metrics_utils::setup_metrics_recorder;
use crate::service::OutLinkService;
use crate::store::create_store;

#[derive(Clone)]
pub struct State {
    pub service: Arc<OutLinkService>,
    pub enable_cors: bool,
    pub max_body_size: usize,
    pub metrics: Option<PrometheusHandle>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let backend = config.store_backend();
        let store = match create_store(&backend, &config.outlinks_key, config.kv_timeout()) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Failed to create outlinks store: {}", e);
                return Err(anyhow::anyhow!("Failed to create outlinks store: {}", e));
            }
        };
        tracing::info!(backend = store.backend_name(), "Using outlinks store");

        let service = Arc::new(OutLinkService::new(store, config.seed_defaults));
        if let Err(e) = service.prepare().await {
            tracing::error!(error = %e, "Failed to load outlinks at startup");
            return Err(anyhow::anyhow!("Failed to load outlinks at startup: {}", e));
        }

        let metrics = if config.enable_metrics {
            Some(setup_metrics_recorder()?)
        } else {
            None
        };

        Ok(State {
            service,
            enable_cors: config.enable_cors,
            max_body_size: config.max_body_size,
            metrics,
        })
    }
}
