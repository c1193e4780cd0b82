use super::BlobRef;
use crate::feeds::Card;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Bluesky's post length limit, in characters.
pub const MAX_POST_CHARS: usize = 300;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(rename = "$type")]
    pub record_type: &'static str,
    pub text: String,
    pub created_at: String,
    pub langs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
    pub embed: Embed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<LinkFeature>,
}

/// Byte range into the UTF-8 encoding of the post text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkFeature {
    #[serde(rename = "$type")]
    pub feature_type: &'static str,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    #[serde(rename = "$type")]
    pub embed_type: &'static str,
    pub external: External,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct External {
    pub uri: String,
    pub title: String,
    pub description: String,
    pub thumb: BlobRef,
}

impl PostRecord {
    /// Compose a post whose text is the thread title linked to the thread,
    /// with the card attached as an external embed.
    pub fn compose(
        title: &str,
        link: &str,
        card: &Card,
        thumb: BlobRef,
        created_at: DateTime<Utc>,
        lang: &str,
    ) -> Self {
        let text = truncate_title(title);
        let facets = if text.is_empty() {
            Vec::new()
        } else {
            vec![Facet::link(0, text.len(), link)]
        };

        Self {
            record_type: super::POST_COLLECTION,
            text,
            created_at: format_created_at(created_at),
            langs: vec![lang.to_string()],
            facets,
            embed: Embed {
                embed_type: "app.bsky.embed.external",
                external: External {
                    uri: card.uri.clone(),
                    title: card.title.clone(),
                    description: card.description.clone(),
                    thumb,
                },
            },
        }
    }
}

impl Facet {
    pub fn link(byte_start: usize, byte_end: usize, uri: &str) -> Self {
        Self {
            index: ByteSlice {
                byte_start,
                byte_end,
            },
            features: vec![LinkFeature {
                feature_type: "app.bsky.richtext.facet#link",
                uri: uri.to_string(),
            }],
        }
    }
}

/// Cut a title longer than the post limit to `MAX_POST_CHARS` characters,
/// the last three being an ellipsis.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_POST_CHARS {
        return title.to_string();
    }
    let mut out: String = title
        .chars()
        .take(MAX_POST_CHARS - ELLIPSIS.len())
        .collect();
    out.push_str(ELLIPSIS);
    out
}

/// ISO-8601 UTC with a `Z` suffix.
pub fn format_created_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
