use crate::app::ports::{ContentStorePort, ObjectStorePort};
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

type Table = HashMap<String, Value>;

/// In-memory content store for dry runs and tests. Upserts honour the conflict key.
#[derive(Default)]
pub struct InMemoryContentStore {
    tables: Mutex<HashMap<String, Table>>,
    inserts: AtomicUsize,
    updates: AtomicUsize,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .map(|t| t.get(table).map(|rows| rows.values().cloned().collect()).unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn get(&self, table: &str, key: &str) -> Option<Value> {
        self.tables.lock().ok()?.get(table)?.get(key).cloned()
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::Relaxed)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::Relaxed)
    }
}

fn poisoned<T>(_: T) -> ScraperError {
    ScraperError::Store { message: "in-memory store lock poisoned".to_string() }
}

#[async_trait]
impl ContentStorePort for InMemoryContentStore {
    async fn upsert(&self, table: &str, record: Value, conflict_key: &str) -> Result<()> {
        let key = record
            .get(conflict_key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ScraperError::MissingField(conflict_key.to_string()))?
            .to_string();

        let mut tables = self.tables.lock().map_err(poisoned)?;
        let rows = tables.entry(table.to_string()).or_default();
        let counter = match rows.get_mut(&key) {
            Some(existing) => {
                merge(existing, record);
                &self.updates
            }
            None => {
                rows.insert(key.clone(), record);
                &self.inserts
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);

        debug!("Upserted {} into {}", key, table);
        Ok(())
    }
}

// Column-wise overwrite, like a merge-duplicates upsert
fn merge(existing: &mut Value, incoming: Value) {
    match (existing.as_object_mut(), incoming) {
        (Some(target), Value::Object(source)) => {
            for (k, v) in source {
                target.insert(k, v);
            }
        }
        (_, incoming) => *existing = incoming,
    }
}

/// Object store that keeps nothing; used by `--dry-run`.
#[derive(Default)]
pub struct DiscardObjectStore;

#[async_trait]
impl ObjectStorePort for DiscardObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str, _cache_control: &str) -> Result<String> {
        debug!("Dry run: discarded {} ({} bytes)", key, bytes.len());
        Ok(format!("dry-run://{}", key))
    }
}
