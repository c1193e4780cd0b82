pub mod card;
pub mod filter;
pub mod listing;

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Sentinel stored as the link when a listing row has no href.
pub const LINK_NOT_FOUND: &str = "Link: Not Found";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; threadcast/0.1)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    pub title: String,
    /// Unix time from the listing's `data-time`; `None` when the row carries none.
    #[serde(rename = "time")]
    pub published_at: Option<i64>,
    pub link: String,
}

/// One row of a listing page, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub sticky: bool,
    pub thread: Thread,
}

/// Link preview for a single thread, consumed by the publisher.
#[derive(Debug, Clone)]
pub struct Card {
    pub uri: String,
    pub title: String,
    pub description: String,
    pub image: Vec<u8>,
}

#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch one listing page (1-based) and return its raw rows.
    async fn fetch_page(&self, page: u32) -> Result<Vec<ListingItem>>;
}

#[async_trait]
pub trait CardSource: Send + Sync {
    async fn build_card(&self, thread: &Thread) -> Result<Card>;
}

pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Resolve a site-relative path against the origin. Absolute URLs pass through.
pub(crate) fn absolutize(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}{}", origin.trim_end_matches('/'), path)
    }
}
