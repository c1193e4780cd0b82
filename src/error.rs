use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("No Bluesky session for this run")]
    Unauthenticated,

    #[error("Watermark file {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BotError::Shape(err.to_string())
        } else {
            BotError::Network(err.to_string())
        }
    }
}

/// Turn a non-2xx response into a `Status` error, passing anything else through.
pub(crate) fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BotError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}
