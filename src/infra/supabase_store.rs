use crate::app::ports::ContentStorePort;
use crate::config::Credentials;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;

/// Content store over Supabase's PostgREST endpoint.
pub struct SupabaseContentStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseContentStore {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: credentials.supabase_url.clone(),
            service_key: credentials.service_role_key.clone(),
        }
    }
}

#[async_trait]
impl ContentStorePort for SupabaseContentStore {
    async fn upsert(&self, table: &str, record: serde_json::Value, conflict_key: &str) -> Result<()> {
        let endpoint = format!("{}/rest/v1/{}", self.base_url, table);
        let resp = self
            .client
            .post(&endpoint)
            .query(&[("on_conflict", conflict_key)])
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("apikey", self.service_key.clone())
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&record)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScraperError::Store {
                message: format!("{} upsert failed: {} - {}", table, status, body),
            });
        }
        Ok(())
    }
}
