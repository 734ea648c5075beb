use envconfig::Envconfig;
use std::{net::SocketAddr, str::FromStr, time::Duration};

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(default = "127.0.0.1:3001")]
    pub address: SocketAddr,

    // Both must be set (and non-empty) to use the remote KV backend.
    pub kv_rest_api_url: Option<String>,
    pub kv_rest_api_token: Option<String>,

    #[envconfig(default = "outlinks")]
    pub outlinks_key: String,

    #[envconfig(default = "5000")]
    pub kv_timeout_ms: u64,

    #[envconfig(default = "true")]
    pub enable_cors: bool,

    #[envconfig(default = "true")]
    pub seed_defaults: bool,

    #[envconfig(default = "1000000")]
    pub max_body_size: usize,

    #[envconfig(default = "false")]
    pub enable_metrics: bool,
}

/// Which storage backend holds the collection, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    RemoteKv { url: String, token: String },
}

impl Config {
    pub fn default_for_test() -> Self {
        Config {
            address: SocketAddr::from_str("127.0.0.1:0").unwrap(),
            kv_rest_api_url: None,
            kv_rest_api_token: None,
            outlinks_key: "outlinks".to_string(),
            kv_timeout_ms: 5000,
            enable_cors: true,
            seed_defaults: true,
            max_body_size: 1_000_000,
            enable_metrics: false,
        }
    }

    pub fn store_backend(&self) -> StoreBackend {
        let url = self.kv_rest_api_url.as_deref().filter(|s| !s.is_empty());
        let token = self.kv_rest_api_token.as_deref().filter(|s| !s.is_empty());

        match (url, token) {
            (Some(url), Some(token)) => StoreBackend::RemoteKv {
                url: url.to_string(),
                token: token.to_string(),
            },
            (None, None) => StoreBackend::Memory,
            _ => {
                tracing::warn!(
                    "Only one of KV_REST_API_URL and KV_REST_API_TOKEN is set, falling back to in-memory store"
                );
                StoreBackend::Memory
            }
        }
    }

    pub fn kv_timeout(&self) -> Duration {
        Duration::from_millis(self.kv_timeout_ms)
    }
}
