//! One sequential pass: scrape listing pages, commit the watermark, then
//! publish each new thread oldest-first.

use crate::bluesky::{PostRecord, Publisher, Session};
use crate::error::{BotError, Result};
use crate::feeds::filter::ThreadFilter;
use crate::feeds::{CardSource, ListingSource, Thread};
use crate::watermark::WatermarkStore;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

pub struct RunSettings {
    pub pages: u32,
    pub lang: String,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub threads: usize,
    pub published: usize,
    pub failed: usize,
    pub watermark_saved: bool,
}

pub struct Runner<L, C, P> {
    listing: L,
    cards: C,
    publisher: P,
    watermark: WatermarkStore,
    settings: RunSettings,
}

impl<L, C, P> Runner<L, C, P>
where
    L: ListingSource,
    C: CardSource,
    P: Publisher,
{
    pub fn new(
        listing: L,
        cards: C,
        publisher: P,
        watermark: WatermarkStore,
        settings: RunSettings,
    ) -> Self {
        Self {
            listing,
            cards,
            publisher,
            watermark,
            settings,
        }
    }

    pub async fn run(&self) -> RunReport {
        let started_at = Utc::now();
        let mut report = RunReport::default();

        let watermark = self.watermark.load(started_at);
        info!(watermark, pages = self.settings.pages, "Starting run");

        let threads = self.scrape(watermark, &mut report).await;
        report.threads = threads.len();
        log_threads(&threads);

        if self.settings.dry_run {
            info!(threads = threads.len(), "Dry run, nothing published");
            return report;
        }

        // The watermark is the time scraping finished, not the newest thread seen.
        report.watermark_saved = self.watermark.save(Utc::now());

        let session = match self.publisher.create_session().await {
            Ok(session) => Some(session),
            Err(e) => {
                error!(error = %e, "Failed to create Bluesky session");
                None
            }
        };

        for thread in threads.iter().rev() {
            match self.publish(session.as_ref(), thread, started_at).await {
                Ok(()) => report.published += 1,
                Err(BotError::Unauthenticated) => {
                    warn!(link = %thread.link, "Skipping post, not authenticated");
                    report.failed += 1;
                }
                Err(e) => {
                    error!(link = %thread.link, error = %e, "Failed to post thread");
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn scrape(&self, watermark: i64, report: &mut RunReport) -> Vec<Thread> {
        let filter = ThreadFilter::new(watermark);
        let mut threads = Vec::new();

        for page in 1..=self.settings.pages {
            match self.listing.fetch_page(page).await {
                Ok(items) => {
                    report.pages_fetched += 1;
                    threads.extend(filter.apply(items));
                }
                Err(e) => {
                    error!(page, error = %e, "Failed to retrieve listing page");
                    report.pages_failed += 1;
                }
            }
        }

        threads
    }

    async fn publish(
        &self,
        session: Option<&Session>,
        thread: &Thread,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let session = session.ok_or(BotError::Unauthenticated)?;

        let mut card = self.cards.build_card(thread).await?;
        let image = std::mem::take(&mut card.image);
        let thumb = self.publisher.upload_blob(session, image).await?;

        let record = PostRecord::compose(
            &thread.title,
            &thread.link,
            &card,
            thumb,
            created_at,
            &self.settings.lang,
        );
        let created = self.publisher.create_record(session, &record).await?;

        info!(link = %thread.link, uri = %created.uri, cid = %created.cid, "Posted thread");
        Ok(())
    }
}

fn log_threads(threads: &[Thread]) {
    for thread in threads {
        info!(title = %thread.title, time = ?thread.published_at, link = %thread.link, "New thread");
    }
    match serde_json::to_string_pretty(threads) {
        Ok(json) => debug!("Threads:\n{json}"),
        Err(e) => warn!(error = %e, "Failed to serialize thread list"),
    }
}
