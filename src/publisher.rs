use crate::app::ports::ContentStorePort;
use crate::types::NormalizedEvent;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Upsert conflict key; one row per source page
pub const CONFLICT_KEY: &str = "source_url";

/// Writes normalized events into the content store.
pub struct Publisher {
    store: Arc<dyn ContentStorePort>,
    table: String,
}

impl Publisher {
    pub fn new(store: Arc<dyn ContentStorePort>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Store errors are logged and reported as `false`, never propagated.
    #[instrument(skip(self, event), fields(source_url = %event.source_url))]
    pub async fn publish(&self, event: &NormalizedEvent) -> bool {
        let record = to_record(event, Utc::now());
        match self.store.upsert(&self.table, record, CONFLICT_KEY).await {
            Ok(()) => {
                info!("Published '{}' ({})", event.title, event.start_date);
                counter!("ticket_scraper_events_published_total", "category" => event.category.as_str()).increment(1);
                true
            }
            Err(e) => {
                error!("Failed to publish '{}': {}", event.title, e);
                false
            }
        }
    }
}

/// Store row for an event. The second block mirrors canonical fields under
/// the older column names other readers of the table still use.
pub fn to_record(event: &NormalizedEvent, updated_at: DateTime<Utc>) -> Value {
    json!({
        "title": event.title,
        "slug": event.slug,
        "description": event.description,
        "price": event.price,
        "price_currency": event.price_currency,
        "image_url": event.image_url,
        "cover_url": event.cover_url,
        "venue_name": event.venue_name,
        "venue_address": event.venue_address,
        "category": event.category.as_str(),
        "start_date": event.start_date,
        "end_date": event.end_date,
        "start_time": event.start_time,
        "source_url": event.source_url,
        "source_name": event.source_name,
        "affiliate_url": event.affiliate_url,
        "is_sold_out": event.is_sold_out,
        "is_active": event.is_active,
        "status": event.status,
        "is_hidden": false,
        "updated_at": updated_at.to_rfc3339(),

        "name": event.title,
        "date": event.start_date,
        "time": event.start_time,
        "venue": event.venue_name,
        "location": event.venue_address,
        "image": event.image_url,
        "thumbnail_url": event.image_url,
        "cover_image": event.cover_url,
        "currency": event.price_currency,
        "booking_url": event.affiliate_url,
        "source": event.source_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScraperError};
    use crate::infra::in_memory::InMemoryContentStore;
    use crate::types::Category;
    use async_trait::async_trait;

    fn event(title: &str) -> NormalizedEvent {
        NormalizedEvent {
            title: title.into(),
            slug: crate::normalize::create_slug(title),
            description: "desc".into(),
            price: Some(12.5),
            price_currency: "BHD".into(),
            image_url: "https://store/thumb.webp".into(),
            cover_url: "https://store/cover.webp".into(),
            venue_name: "Venue".into(),
            venue_address: "Bahrain".into(),
            category: Category::Comedy,
            start_date: "2026-11-01".into(),
            end_date: None,
            start_time: Some("20:00".into()),
            source_url: "https://manama.platinumlist.net/event-tickets/7/show".into(),
            source_name: "platinumlist".into(),
            affiliate_url: "https://platinumlist.net/aff/?partner=bhevents".into(),
            is_sold_out: false,
            is_active: true,
            status: "published".into(),
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ContentStorePort for FailingStore {
        async fn upsert(&self, _table: &str, _record: Value, _conflict_key: &str) -> Result<()> {
            Err(ScraperError::Store { message: "duplicate key value violates constraint".into() })
        }
    }

    #[test]
    fn test_record_shape() {
        let now = Utc::now();
        let record = to_record(&event("Laugh Out Loud"), now);
        assert_eq!(record["source_url"], "https://manama.platinumlist.net/event-tickets/7/show");
        assert_eq!(record["category"], "comedy");
        assert_eq!(record["is_hidden"], false);
        assert_eq!(record["updated_at"], now.to_rfc3339());
        assert_eq!(record["name"], record["title"]);
        assert_eq!(record["thumbnail_url"], record["image_url"]);
        assert_eq!(record["end_date"], Value::Null);
    }

    #[tokio::test]
    async fn test_republish_updates_same_row() {
        let store = Arc::new(InMemoryContentStore::new());
        let publisher = Publisher::new(store.clone(), "events");

        assert!(publisher.publish(&event("Laugh Out Loud")).await);
        assert!(publisher.publish(&event("Laugh Out Loud (Extra Show)")).await);

        let rows = store.rows("events");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "Laugh Out Loud (Extra Show)");
        assert_eq!(store.update_count(), 1);
    }

    #[tokio::test]
    async fn test_store_error_is_false() {
        let publisher = Publisher::new(Arc::new(FailingStore), "events");
        assert!(!publisher.publish(&event("Anything")).await);
    }
}
