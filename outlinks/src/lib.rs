pub mod api;
pub mod config;
pub mod metrics_utils;
pub mod router;
pub mod server;
pub mod service;
pub mod state;
pub mod store;
pub mod types;
pub mod utils;
