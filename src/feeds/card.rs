use super::{absolutize, build_client, Card, CardSource, Thread};
use crate::error::{check_status, BotError, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

pub const NO_DESCRIPTION: &str = "No description";

const AVATAR_PREFIX: &str = "/data/avatar/";

/// Card fields read from a thread page, before the image is downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMeta {
    pub title: String,
    pub description: String,
    pub image_url: String,
}

pub struct CardBuilder {
    origin: String,
    client: reqwest::Client,
}

impl CardBuilder {
    pub fn new(origin: String, timeout: Duration) -> Self {
        Self {
            origin,
            client: build_client(timeout),
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        check_status(response)
    }
}

#[async_trait]
impl CardSource for CardBuilder {
    async fn build_card(&self, thread: &Thread) -> Result<Card> {
        let html = self.get(&thread.link).await?.text().await?;
        let meta = parse_card_meta(&html, &self.origin)?;
        debug!(link = %thread.link, image = %meta.image_url, "Parsed card");

        let image = self.get(&meta.image_url).await?.bytes().await?;

        Ok(Card {
            uri: thread.link.clone(),
            title: meta.title,
            description: meta.description,
            image: image.to_vec(),
        })
    }
}

/// Read the Open Graph card fields from a thread page.
///
/// `og:title` is required. The image is the first poster avatar if the page
/// has one, otherwise `og:image`.
pub fn parse_card_meta(html: &str, origin: &str) -> Result<CardMeta> {
    let document = Html::parse_document(html);

    let title = meta_property(&document, "og:title")
        .ok_or_else(|| BotError::Shape("og:title missing from thread page".to_string()))?;

    let description =
        meta_property(&document, "og:description").unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let image_url = avatar_src(&document)
        .map(|src| absolutize(origin, &src))
        .or_else(|| meta_property(&document, "og:image"))
        .ok_or_else(|| BotError::Shape("no avatar or og:image on thread page".to_string()))?;

    Ok(CardMeta {
        title,
        description,
        image_url,
    })
}

fn meta_property(document: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[property="{property}"]"#)).ok()?;
    let element = document.select(&selector).next()?;
    let content = element.value().attr("content")?.trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

fn avatar_src(document: &Html) -> Option<String> {
    let selector = Selector::parse("img[src]").ok()?;
    document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .find(|src| src.starts_with(AVATAR_PREFIX))
        .map(str::to_string)
}
