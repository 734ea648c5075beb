use std::sync::Arc;

use crate::service::OutLinkService;
use crate::store::MemoryStore;
use crate::types::{OutLink, OutLinkInput};

/// A valid create/update body with the given name.
pub fn outlink_input(name: &str) -> OutLinkInput {
    OutLinkInput {
        name: Some(name.to_string()),
        description: Some(format!("{name} description")),
        is_applied: false,
        category: Some("Testing".to_string()),
        user_page_url: Some(format!("https://{}.example.com", name.to_lowercase())),
        admin_page_url: None,
    }
}

/// A service over an in-memory store that already holds `outlinks`, so nothing gets seeded.
pub fn memory_service(outlinks: Vec<OutLink>) -> Arc<OutLinkService> {
    Arc::new(OutLinkService::new(
        Arc::new(MemoryStore::with_outlinks(outlinks)),
        true,
    ))
}
