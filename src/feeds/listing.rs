use super::{absolutize, build_client, ListingItem, ListingSource, Thread, LINK_NOT_FOUND};
use crate::error::{check_status, BotError, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

const TOPIC_SELECTOR: &str = ".structItem-title a";
const STICKY_SELECTOR: &str = ".structItem-status--sticky";
const TIME_SELECTOR: &str = "time.u-dt";
const ROW_CLASS: &str = "structItem";

/// Fetches XenForo-style forum listings sorted by newest post date.
pub struct ListingFetcher {
    listing_url: String,
    origin: String,
    client: reqwest::Client,
}

impl ListingFetcher {
    pub fn new(listing_url: String, origin: String, timeout: Duration) -> Self {
        Self {
            listing_url,
            origin,
            client: build_client(timeout),
        }
    }
}

#[async_trait]
impl ListingSource for ListingFetcher {
    async fn fetch_page(&self, page: u32) -> Result<Vec<ListingItem>> {
        let page_param = page.to_string();
        let response = self
            .client
            .get(&self.listing_url)
            .query(&[
                ("order", "post_date"),
                ("direction", "desc"),
                ("page", page_param.as_str()),
            ])
            .send()
            .await?;

        let html = check_status(response)?.text().await?;
        let items = parse_listing(&html, &self.origin)?;
        debug!(page, rows = items.len(), "Parsed listing page");
        Ok(items)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| BotError::Shape(format!("bad selector {css}: {e}")))
}

/// Extract every thread row from a listing page, in page order.
///
/// Title anchors outside a `div.structItem` row are ignored. A row without a
/// `time.u-dt` (or with a non-numeric `data-time`) has an unknown time.
pub fn parse_listing(html: &str, origin: &str) -> Result<Vec<ListingItem>> {
    let topic_sel = selector(TOPIC_SELECTOR)?;
    let sticky_sel = selector(STICKY_SELECTOR)?;
    let time_sel = selector(TIME_SELECTOR)?;

    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for topic in document.select(&topic_sel) {
        let Some(row) = enclosing_row(topic) else {
            continue;
        };

        let sticky = row.select(&sticky_sel).next().is_some();

        let published_at = row
            .select(&time_sel)
            .next()
            .and_then(|time| time.value().attr("data-time"))
            .and_then(|raw| raw.trim().parse::<i64>().ok());

        let link = topic
            .value()
            .attr("href")
            .map(|href| absolutize(origin, href))
            .unwrap_or_else(|| LINK_NOT_FOUND.to_string());

        let title = topic.text().collect::<String>().trim().to_string();

        items.push(ListingItem {
            sticky,
            thread: Thread {
                title,
                published_at,
                link,
            },
        });
    }

    Ok(items)
}

fn enclosing_row(topic: ElementRef<'_>) -> Option<ElementRef<'_>> {
    topic.ancestors().filter_map(ElementRef::wrap).find(|el| {
        el.value().name() == "div" && el.value().classes().any(|class| class == ROW_CLASS)
    })
}
