use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::dedup::DedupMemory;
use crate::discord::Delivery;
use crate::error::TickError;
use crate::fetch::{self, Fetcher};
use crate::listing;
use crate::parser::{self, ExtractOptions, Extraction, SkipReason};
use crate::settings::Settings;

/// Counts reported after each tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    pub rows: usize,
    pub sent: usize,
    pub skipped: usize,
}

/// Fetch → parse → per-row extraction → delivery, with the dedup memory it
/// owns carried from one tick to the next.
pub struct Pipeline<F, D> {
    fetcher: F,
    delivery: D,
    search_url: String,
    base_url: Url,
    channel_id: String,
    affiliate_id: String,
    options: ExtractOptions,
    memory: DedupMemory,
}

impl<F: Fetcher, D: Delivery> Pipeline<F, D> {
    pub fn new(fetcher: F, delivery: D, settings: &Settings, today: NaiveDate) -> Self {
        Pipeline {
            fetcher,
            delivery,
            search_url: fetch::search_url(&settings.base_url, &settings.keywords),
            base_url: settings.base_url.clone(),
            channel_id: settings.channel.clone(),
            affiliate_id: settings.affiliate_id.clone(),
            options: ExtractOptions {
                title_filter: settings.title_filter.clone(),
            },
            memory: DedupMemory::new(today),
        }
    }

    pub fn memory(&self) -> &DedupMemory {
        &self.memory
    }

    pub async fn tick(&mut self, cancel: &CancellationToken) -> Result<TickStats, TickError> {
        self.tick_on(Local::now().date_naive(), cancel).await
    }

    /// One pass over the listing page as of `today`. The date is fixed for the
    /// whole tick so a run crossing midnight cannot reset the memory halfway.
    ///
    /// A fetch or delivery failure ends the tick; rows after a failed delivery
    /// are left for the next tick.
    pub async fn tick_on(
        &mut self,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<TickStats, TickError> {
        self.memory.roll_to(today);

        let html = self.fetcher.fetch(&self.search_url).await?;
        let rows = listing::extract_rows(&html, &self.base_url);
        debug!(rows = rows.len(), "extracted listing rows");

        let mut stats = TickStats {
            rows: rows.len(),
            ..TickStats::default()
        };

        for entry in &rows {
            if cancel.is_cancelled() {
                info!("shutdown requested, stopping tick early");
                break;
            }

            match parser::process_entry(entry, &self.options, &mut self.memory) {
                Extraction::Kept(product) => {
                    let message = product.format(&self.affiliate_id);
                    self.delivery.send(&self.channel_id, &message).await?;
                    info!(title = %product.title, date = %product.date_added, "posted new product");
                    stats.sent += 1;
                }
                Extraction::Skipped { title, reason } => {
                    stats.skipped += 1;
                    match reason {
                        SkipReason::Anomaly(anomaly) => {
                            warn!(title = ?title, %anomaly, "skipping unparseable entry")
                        }
                        SkipReason::SearchLink => {
                            warn!(title = ?title, "entry links to the search page, discarding")
                        }
                        SkipReason::NotToday(date) => {
                            debug!(title = ?title, %date, "not added today, skipping")
                        }
                        other => debug!(title = ?title, reason = ?other, "skipping entry"),
                    }
                }
            }
        }

        Ok(stats)
    }
}

/// Tick immediately, then once per `interval` until `cancel` fires. Ticks
/// never overlap; intervals missed while a tick overruns are skipped.
pub async fn run<F: Fetcher, D: Delivery>(
    pipeline: &mut Pipeline<F, D>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let start = Instant::now();
        match pipeline.tick(&cancel).await {
            Ok(stats) => info!(
                rows = stats.rows,
                sent = stats.sent,
                skipped = stats.skipped,
                day = %pipeline.memory().current_day(),
                seen_today = pipeline.memory().len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "tick complete"
            ),
            Err(e) => error!("tick aborted: {}", e),
        }
    }

    info!("scheduler stopped");
}
