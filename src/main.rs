use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use ticket_scraper::app::ports::{ContentStorePort, ObjectStorePort};
use ticket_scraper::config::{Config, Credentials};
use ticket_scraper::infra::http_client::ReqwestHttp;
use ticket_scraper::infra::http_render::HttpRenderEngine;
use ticket_scraper::infra::in_memory::{DiscardObjectStore, InMemoryContentStore};
use ticket_scraper::infra::supabase_storage::SupabaseObjectStore;
use ticket_scraper::infra::supabase_store::SupabaseContentStore;
use ticket_scraper::pipeline::{Orchestrator, Services};
use ticket_scraper::logging;

#[derive(Parser)]
#[command(name = "ticket_scraper")]
#[command(about = "Scrape ticketed event listings and publish them to the content store")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the optional TOML config file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Process at most this many event pages
    #[arg(long)]
    limit: Option<usize>,

    /// Publish to memory and discard images instead of using real storage
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    // Dropped at the end of main, flushing buffered file logs
    let _log_guard = logging::init_logging();
    ticket_scraper::metrics::init_metrics();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?.scraper;
    if cli.limit.is_some() {
        config.max_events = cli.limit;
    }

    // Setup failures are fatal: missing credentials, unusable clients
    let (object_store, content_store): (Arc<dyn ObjectStorePort>, Arc<dyn ContentStorePort>) = if cli.dry_run {
        println!("🧪 Dry run: nothing will be uploaded or persisted");
        (Arc::new(DiscardObjectStore), Arc::new(InMemoryContentStore::new()))
    } else {
        let credentials = Credentials::from_env()?;
        (
            Arc::new(SupabaseObjectStore::new(&credentials)),
            Arc::new(SupabaseContentStore::new(&credentials)),
        )
    };

    let services = Services {
        engine: Arc::new(HttpRenderEngine::new(&config.user_agent)?),
        http: Arc::new(ReqwestHttp::new(&config.user_agent)?),
        object_store,
        content_store,
    };

    println!("🚀 Starting event scrape");
    info!("Starting run with {:?}", config);
    let mut orchestrator = Orchestrator::new(services, &config);
    let summary = orchestrator.run().await;
    summary.print();

    if let Err(e) = orchestrator.shutdown().await {
        error!("Render engine shutdown failed: {}", e);
    }
    Ok(())
}
