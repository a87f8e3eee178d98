use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
}

/// Tunables for a run. Every key is optional in `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Pause between successive detail pages
    pub pacing_ms: u64,
    /// Wait after navigation before querying the page
    pub settle_ms: u64,
    pub navigation_timeout_secs: u64,
    /// Cap on detail pages processed per run
    pub max_events: Option<usize>,
    pub thumbnail_width: u32,
    pub cover_width: u32,
    /// Fallback page images narrower than this are ignored
    pub min_image_width: u32,
    pub events_table: String,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 2000,
            settle_ms: 1500,
            navigation_timeout_secs: 30,
            max_events: None,
            thumbnail_width: 400,
            cover_width: 1200,
            min_image_width: 300,
            events_table: "events".to_string(),
            user_agent: "Mozilla/5.0 (compatible; ticket_scraper/0.1)".to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Config {
    /// Read `path` if it exists; a missing file means all defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Store and object-storage credentials, taken from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub supabase_url: String,
    pub service_role_key: String,
    pub bucket: String,
    pub prefix: String,
}

impl Credentials {
    /// Any missing required variable is a fatal setup error.
    pub fn from_env() -> Result<Self> {
        let supabase_url = match std::env::var("SUPABASE_URL") {
            Ok(u) if !u.trim().is_empty() => u,
            _ => {
                let project_ref = require("SUPABASE_PROJECT_REF")
                    .map_err(|_| ScraperError::Config("SUPABASE_URL or SUPABASE_PROJECT_REF must be set".to_string()))?;
                format!("https://{}.supabase.co", project_ref)
            }
        };

        Ok(Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            service_role_key: require("SUPABASE_SERVICE_ROLE_KEY")?,
            bucket: require("SUPABASE_BUCKET")?,
            prefix: std::env::var("SUPABASE_PREFIX").unwrap_or_default(),
        })
    }
}

fn require(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ScraperError::Config(format!("missing required environment variable {}", name))),
    }
}
