use crate::app::ports::{ContentStorePort, HttpClientPort, ObjectStorePort, RenderEnginePort};
use crate::collector::UrlCollector;
use crate::config::ScraperConfig;
use crate::constants::CategoryEndpoint;
use crate::error::{Result, ScraperError};
use crate::extractor::DetailExtractor;
use crate::images::ImagePipeline;
use crate::normalize::{build_event, InvalidRecord};
use crate::publisher::Publisher;
use crate::types::CandidateUrl;
use chrono::{Local, NaiveDate};
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Where the orchestrator is in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    CollectingUrls,
    ExtractingDetail,
    Normalizing,
    ProcessingImages,
    Publishing,
    Summarized,
}

/// Outcome of one run; produced even when every item failed
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    pub discovered: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Subset of `failed`: records dropped for an empty title or unresolvable date
    pub filtered: usize,
    pub errors: Vec<String>,
    pub duration_secs: f64,
}

impl RunSummary {
    pub fn print(&self) {
        println!("\n📊 Run summary:");
        println!("   Discovered URLs: {}", self.discovered);
        println!("   Attempted: {}", self.attempted);
        println!("   Published: {}", self.succeeded);
        println!("   Failed: {} ({} filtered as invalid)", self.failed, self.filtered);
        println!("   Duration: {:.1}s", self.duration_secs);
        if !self.errors.is_empty() {
            println!("\n⚠️  Errors encountered:");
            for error in &self.errors {
                println!("   - {}", error);
            }
        }
    }
}

#[derive(Debug, Error)]
enum ItemFailure {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ScraperError),
    #[error("invalid record: {0}")]
    Invalid(#[from] InvalidRecord),
    #[error("publish failed")]
    Publish,
}

/// Collaborators a run needs. Constructed before the run, released after it.
pub struct Services {
    pub engine: Arc<dyn RenderEnginePort>,
    pub http: Arc<dyn HttpClientPort>,
    pub object_store: Arc<dyn ObjectStorePort>,
    pub content_store: Arc<dyn ContentStorePort>,
}

/// Drives collect → extract → normalize → images → publish, one URL at a time.
pub struct Orchestrator {
    engine: Arc<dyn RenderEnginePort>,
    collector: UrlCollector,
    extractor: DetailExtractor,
    images: ImagePipeline,
    publisher: Publisher,
    pacing: Duration,
    max_events: Option<usize>,
    today: Option<NaiveDate>,
    state: RunState,
}

impl Orchestrator {
    pub fn new(services: Services, config: &ScraperConfig) -> Self {
        Self {
            collector: UrlCollector::new(services.engine.clone(), config),
            extractor: DetailExtractor::new(services.engine.clone(), config),
            images: ImagePipeline::new(services.http, services.object_store, config),
            publisher: Publisher::new(services.content_store, config.events_table.clone()),
            engine: services.engine,
            pacing: config.pacing(),
            max_events: config.max_events,
            today: None,
            state: RunState::Idle,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Vec<CategoryEndpoint>) -> Self {
        self.collector = self.collector.with_endpoints(endpoints);
        self
    }

    /// Pin the date used for year inference instead of reading the clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// One full pass. Item failures are counted, never propagated.
    pub async fn run(&mut self) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::default();

        self.transition(RunState::CollectingUrls);
        info!("📡 Collecting event URLs...");
        let mut candidates = self.collector.collect().await;
        summary.discovered = candidates.len();
        info!("✅ Discovered {} event URLs", candidates.len());
        println!("✅ Discovered {} event URLs", candidates.len());

        if let Some(max) = self.max_events {
            candidates.truncate(max);
        }

        for (i, candidate) in candidates.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.pacing).await;
            }
            summary.attempted += 1;
            let t_item = Instant::now();

            match self.process_item(candidate).await {
                Ok(()) => summary.succeeded += 1,
                Err(failure) => {
                    if matches!(failure, ItemFailure::Invalid(_)) {
                        summary.filtered += 1;
                        warn!("Skipping {}: {}", candidate.url, failure);
                    } else {
                        error!("Item {} failed: {}", candidate.url, failure);
                    }
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", candidate.url, failure));
                    counter!("ticket_scraper_events_failed_total").increment(1);
                }
            }

            histogram!("ticket_scraper_item_duration_seconds").record(t_item.elapsed().as_secs_f64());
            if (i + 1) % 10 == 0 {
                println!("   Processed {}/{} events", i + 1, candidates.len());
            }
        }

        self.transition(RunState::Summarized);
        summary.duration_secs = started.elapsed().as_secs_f64();
        info!(
            "Run finished: {} discovered, {} published, {} failed",
            summary.discovered, summary.succeeded, summary.failed
        );
        summary
    }

    #[instrument(skip(self, candidate), fields(url = %candidate.url))]
    async fn process_item(&mut self, candidate: &CandidateUrl) -> std::result::Result<(), ItemFailure> {
        self.transition(RunState::ExtractingDetail);
        let raw = self.extractor.extract(&candidate.url).await?;

        self.transition(RunState::Normalizing);
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let event = build_event(&raw, candidate, today)?;

        self.transition(RunState::ProcessingImages);
        let event = self.images.process(event).await;

        self.transition(RunState::Publishing);
        if self.publisher.publish(&event).await {
            Ok(())
        } else {
            Err(ItemFailure::Publish)
        }
    }

    /// Release the render engine session.
    pub async fn shutdown(self) -> Result<()> {
        self.engine.close().await
    }
}
