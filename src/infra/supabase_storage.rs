use crate::app::ports::ObjectStorePort;
use crate::config::Credentials;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use tracing::debug;

/// Supabase Storage bucket used as the image object store.
pub struct SupabaseObjectStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
    prefix: String,
}

impl SupabaseObjectStore {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: credentials.supabase_url.clone(),
            service_key: credentials.service_role_key.clone(),
            bucket: credentials.bucket.clone(),
            prefix: credentials.prefix.trim_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix, key)
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            self.path_for(key)
        )
    }
}

#[async_trait]
impl ObjectStorePort for SupabaseObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str, cache_control: &str) -> Result<String> {
        let endpoint = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            self.path_for(key)
        );
        let resp = self
            .client
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("apikey", self.service_key.clone())
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, cache_control)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScraperError::Storage {
                message: format!("upload of {} failed: {} - {}", key, status, body),
            });
        }
        debug!("Uploaded {}", key);
        Ok(self.public_url(key))
    }
}
