use super::{BlobRef, CreatedRecord, PostRecord, Publisher, Session, POST_COLLECTION};
use crate::error::{check_status, BotError, Result};
use crate::feeds::build_client;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BLOB_CONTENT_TYPE: &str = "image/png";

pub struct BlueskyClient {
    service: String,
    identifier: String,
    password: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadBlobResponse {
    blob: BlobRef,
}

impl BlueskyClient {
    pub fn new(service: &str, identifier: String, password: String, timeout: Duration) -> Self {
        Self {
            service: service.trim_end_matches('/').to_string(),
            identifier,
            password,
            client: build_client(timeout),
        }
    }

    fn xrpc(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service, method)
    }
}

#[async_trait]
impl Publisher for BlueskyClient {
    async fn create_session(&self) -> Result<Session> {
        let body = serde_json::json!({
            "identifier": self.identifier,
            "password": self.password,
        });

        let response = self
            .client
            .post(self.xrpc("com.atproto.server.createSession"))
            .json(&body)
            .send()
            .await?;

        Ok(check_status(response)?.json().await?)
    }

    async fn upload_blob(&self, session: &Session, bytes: Vec<u8>) -> Result<BlobRef> {
        let response = self
            .client
            .post(self.xrpc("com.atproto.repo.uploadBlob"))
            .bearer_auth(&session.access_token)
            .header(reqwest::header::CONTENT_TYPE, BLOB_CONTENT_TYPE)
            .body(bytes)
            .send()
            .await?;

        let uploaded: UploadBlobResponse = check_status(response)?.json().await?;
        Ok(uploaded.blob)
    }

    async fn create_record(&self, session: &Session, record: &PostRecord) -> Result<CreatedRecord> {
        let body = serde_json::json!({
            "repo": session.account_id,
            "collection": POST_COLLECTION,
            "record": record,
        });

        let response = self
            .client
            .post(self.xrpc("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BotError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
