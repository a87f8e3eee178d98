use crate::error::Result;
use crate::render::{Extracted, Query};
use async_trait::async_trait;
use std::time::Duration;

/// Page loading and DOM querying. One page is "current" at a time.
#[async_trait]
pub trait RenderEnginePort: Send + Sync {
    /// Load `url` as the current page; fails on timeout or network error.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Run a query against the current page.
    async fn extract(&self, query: &Query) -> Result<Extracted>;

    /// Release the session. Called once at the end of a run.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Image object storage
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// Store `bytes` under `key` and return the public URL.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str, cache_control: &str) -> Result<String>;
}

/// Shared content store
#[async_trait]
pub trait ContentStorePort: Send + Sync {
    /// Insert or update `record` in `table`, resolving conflicts on `conflict_key`.
    async fn upsert(&self, table: &str, record: serde_json::Value, conflict_key: &str) -> Result<()>;
}

#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpGetResult>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
}
