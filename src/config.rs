use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one run. Every flag can also be given through its environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "threadcast", version, about = "Repost new forum threads to Bluesky")]
pub struct Config {
    /// Bluesky handle or email
    #[arg(long, env = "BLUE_LOGIN")]
    pub login: String,

    /// Bluesky app password
    #[arg(long, env = "BLUE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Listing pages to scan, newest first
    #[arg(long, env = "PAGES_TO_LOAD", default_value_t = 1)]
    pub pages: u32,

    /// File holding the unix time of the last run
    #[arg(long, env = "TIMESTAMP_FILE", default_value = "timestamp")]
    pub timestamp_file: PathBuf,

    #[arg(
        long,
        env = "LISTING_URL",
        default_value = "https://www.resetera.com/forums/gaming-forum.7/"
    )]
    pub listing_url: String,

    /// Prefix for site-relative thread and avatar links
    #[arg(long, env = "SITE_ORIGIN", default_value = "https://www.resetera.com")]
    pub site_origin: String,

    #[arg(long, env = "BSKY_SERVICE", default_value = "https://bsky.social")]
    pub bsky_service: String,

    /// Window used when no usable watermark is stored
    #[arg(long, env = "LOOKBACK_SECS", default_value_t = 7200)]
    pub lookback_secs: i64,

    #[arg(long, env = "POST_LANG", default_value = "en-US")]
    pub lang: String,

    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 20)]
    pub http_timeout_secs: u64,

    /// Scrape and log threads without posting or touching the watermark
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,
}

impl Config {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn log_summary(&self) {
        tracing::info!(
            login = %self.login,
            password = %mask(&self.password),
            pages = self.pages,
            timestamp_file = %self.timestamp_file.display(),
            listing_url = %self.listing_url,
            bsky_service = %self.bsky_service,
            dry_run = self.dry_run,
            "Config loaded"
        );
    }
}

/// Load `.env` from the working directory. A missing file is fine, a malformed one is not.
pub fn load_dotenv() -> anyhow::Result<()> {
    check_dotenv(dotenvy::dotenv().map(|_| ()))
}

fn check_dotenv(result: Result<(), dotenvy::Error>) -> anyhow::Result<()> {
    match result {
        Err(e) if !e.not_found() => Err(e).context("Failed to load .env file"),
        _ => Ok(()),
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        "<not set>".to_string()
    } else {
        format!("***({} chars)", secret.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config =
            Config::try_parse_from(["threadcast", "--login", "bot", "--password", "pw"]).unwrap();
        assert_eq!(config.pages, 1);
        assert_eq!(config.timestamp_file, PathBuf::from("timestamp"));
        assert_eq!(config.lookback_secs, 7200);
        assert_eq!(config.lang, "en-US");
        assert_eq!(config.http_timeout(), Duration::from_secs(20));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "threadcast",
            "--login",
            "bot",
            "--password",
            "pw",
            "--pages",
            "3",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(config.pages, 3);
        assert!(config.dry_run);
    }

    #[test]
    fn test_bad_page_count_is_rejected() {
        let result = Config::try_parse_from([
            "threadcast",
            "--login",
            "bot",
            "--password",
            "pw",
            "--pages",
            "many",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_dotenv_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_dotenv(dotenvy::from_path(dir.path().join(".env"))).is_ok());
    }

    #[test]
    fn test_malformed_dotenv_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "THREADCAST_TEST this is not an assignment\n").unwrap();

        let err = check_dotenv(dotenvy::from_path(&env_file)).unwrap_err();
        assert!(err.to_string().contains("Failed to load .env file"));
    }

    #[test]
    fn test_mask_hides_secret() {
        assert_eq!(mask("hunter2"), "***(7 chars)");
        assert_eq!(mask(""), "<not set>");
    }
}
