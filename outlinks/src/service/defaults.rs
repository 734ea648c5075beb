use chrono::{TimeZone, Utc};

use crate::types::OutLink;

/// The catalog a fresh deployment starts with.
pub fn default_outlinks() -> Vec<OutLink> {
    vec![
        seed(
            "1",
            "GPT Agent",
            "AI-powered conversational agent service",
            true,
            "AI Services",
            "https://agent.gptko.co.kr",
            Some("https://admin.agent.gptko.co.kr"),
            1,
        ),
        seed(
            "2",
            "Translation Service",
            "Multilingual translation and language learning platform",
            false,
            "Language Services",
            "https://translate.example.com",
            Some("https://admin.translate.example.com"),
            2,
        ),
        seed(
            "3",
            "Document Management",
            "Cloud-based document management system",
            true,
            "Productivity",
            "https://docs.example.com",
            None,
            3,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    name: &str,
    description: &str,
    is_applied: bool,
    category: &str,
    user_page_url: &str,
    admin_page_url: Option<&str>,
    day: u32,
) -> OutLink {
    let at = Utc
        .with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .single()
        .unwrap_or_default();
    OutLink {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        is_applied,
        category: category.to_string(),
        user_page_url: user_page_url.to_string(),
        admin_page_url: admin_page_url.map(str::to_string),
        created_at: at,
        updated_at: at,
    }
}
