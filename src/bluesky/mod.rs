//! Publishing to Bluesky over the AT Protocol XRPC endpoints.

pub mod client;
pub mod record;

pub use client::BlueskyClient;
pub use record::PostRecord;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const POST_COLLECTION: &str = "app.bsky.feed.post";

/// Authenticated session, valid for a single run.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(rename = "accessJwt")]
    pub access_token: String,
    #[serde(rename = "did")]
    pub account_id: String,
}

/// Reference to an uploaded blob, embedded verbatim in a post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRef {
    #[serde(rename = "$type", default = "blob_type")]
    pub blob_type: String,
    #[serde(rename = "ref")]
    pub link: CidLink,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidLink {
    #[serde(rename = "$link")]
    pub link: String,
}

fn blob_type() -> String {
    "blob".to_string()
}

/// Confirmation returned by `createRecord`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRecord {
    pub uri: String,
    pub cid: String,
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn create_session(&self) -> Result<Session>;

    async fn upload_blob(&self, session: &Session, bytes: Vec<u8>) -> Result<BlobRef>;

    async fn create_record(&self, session: &Session, record: &PostRecord) -> Result<CreatedRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_response() {
        let json = r#"{"did":"did:plc:abc123","handle":"bot.bsky.social","accessJwt":"jwt-a","refreshJwt":"jwt-r"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token, "jwt-a");
        assert_eq!(session.account_id, "did:plc:abc123");
    }

    #[test]
    fn test_session_missing_token_is_error() {
        let json = r#"{"did":"did:plc:abc123"}"#;
        assert!(serde_json::from_str::<Session>(json).is_err());
    }

    #[test]
    fn test_blob_ref_keeps_wire_names() {
        let json = r#"{"$type":"blob","ref":{"$link":"bafkrei"},"mimeType":"image/png","size":2048}"#;
        let blob: BlobRef = serde_json::from_str(json).unwrap();
        assert_eq!(blob.link.link, "bafkrei");
        assert_eq!(blob.size, 2048);

        let back = serde_json::to_value(&blob).unwrap();
        assert_eq!(back["$type"], "blob");
        assert_eq!(back["ref"]["$link"], "bafkrei");
        assert_eq!(back["mimeType"], "image/png");
    }
}
