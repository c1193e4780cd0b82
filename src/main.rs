use anyhow::{Context, Result};
use clap::Parser;
use threadcast::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    threadcast::config::load_dotenv().context("Startup failed")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,threadcast=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();

    let config = Config::parse();
    config.log_summary();

    let report = threadcast::run_once(&config).await;
    tracing::info!(
        pages_fetched = report.pages_fetched,
        pages_failed = report.pages_failed,
        threads = report.threads,
        published = report.published,
        failed = report.failed,
        watermark_saved = report.watermark_saved,
        "Run complete"
    );

    Ok(())
}
