pub mod bluesky;
pub mod config;
pub mod error;
pub mod feeds;
pub mod run;
pub mod watermark;

pub use config::Config;
pub use error::{BotError, Result};
pub use run::{RunReport, RunSettings, Runner};

use bluesky::BlueskyClient;
use feeds::card::CardBuilder;
use feeds::listing::ListingFetcher;
use watermark::WatermarkStore;

/// Wire the HTTP-backed components from `config` and perform a single run.
pub async fn run_once(config: &Config) -> RunReport {
    let timeout = config.http_timeout();

    let runner = Runner::new(
        ListingFetcher::new(
            config.listing_url.clone(),
            config.site_origin.clone(),
            timeout,
        ),
        CardBuilder::new(config.site_origin.clone(), timeout),
        BlueskyClient::new(
            &config.bsky_service,
            config.login.clone(),
            config.password.clone(),
            timeout,
        ),
        WatermarkStore::new(config.timestamp_file.clone(), config.lookback_secs),
        RunSettings {
            pages: config.pages,
            lang: config.lang.clone(),
            dry_run: config.dry_run,
        },
    );

    runner.run().await
}
