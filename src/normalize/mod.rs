//! Field normalizers: pure functions from raw page strings to typed values,
//! plus `build_event` which assembles and validates a `NormalizedEvent`.

pub mod date;
pub mod price;
pub mod text;
pub mod time;

pub use date::{resolve_date, resolve_date_today};
pub use price::resolve_price;
pub use text::{affiliate_url, clean_description, create_slug};
pub use time::resolve_time;

use crate::category::classify;
use crate::constants::{
    DEFAULT_VENUE_ADDRESS, DEFAULT_VENUE_NAME, LOCAL_CURRENCY, SOURCE_NAME, STATUS_PUBLISHED,
};
use crate::types::{CandidateUrl, NormalizedEvent, RawExtraction};
use chrono::NaiveDate;
use thiserror::Error;

/// Why a raw extraction could not become an event. Filtered, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRecord {
    #[error("empty title")]
    EmptyTitle,
    #[error("unresolvable date: {0:?}")]
    UnresolvableDate(Option<String>),
}

/// Validate and default a raw extraction into the canonical record.
pub fn build_event(
    raw: &RawExtraction,
    candidate: &CandidateUrl,
    today: NaiveDate,
) -> Result<NormalizedEvent, InvalidRecord> {
    let title = raw
        .title
        .as_deref()
        .map(clean_description)
        .unwrap_or_default();
    if title.is_empty() {
        return Err(InvalidRecord::EmptyTitle);
    }

    let start_date = raw
        .date_text
        .as_deref()
        .and_then(|t| resolve_date(t, today))
        .ok_or_else(|| InvalidRecord::UnresolvableDate(raw.date_text.clone()))?;

    let price = resolve_price(raw.price_text.as_deref());
    let image_url = non_empty(raw.image_url.as_deref()).unwrap_or_default();

    Ok(NormalizedEvent {
        slug: create_slug(&title),
        description: raw
            .description_text
            .as_deref()
            .map(clean_description)
            .unwrap_or_default(),
        price: Some(price.price),
        price_currency: LOCAL_CURRENCY.to_string(),
        cover_url: image_url.clone(),
        image_url,
        venue_name: non_empty(raw.venue_name.as_deref())
            .unwrap_or_else(|| DEFAULT_VENUE_NAME.to_string()),
        venue_address: non_empty(raw.venue_address.as_deref())
            .unwrap_or_else(|| DEFAULT_VENUE_ADDRESS.to_string()),
        category: classify(&candidate.category, &title),
        start_date,
        end_date: None,
        start_time: raw.time_text.as_deref().and_then(resolve_time),
        source_url: candidate.url.clone(),
        source_name: SOURCE_NAME.to_string(),
        affiliate_url: affiliate_url(&candidate.url),
        is_sold_out: price.is_sold_out,
        is_active: !price.is_sold_out,
        status: STATUS_PUBLISHED.to_string(),
        title,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(clean_description)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn candidate() -> CandidateUrl {
        CandidateUrl {
            url: "https://manama.platinumlist.net/event-tickets/9001/wicked".to_string(),
            category: "theatre".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_build_full_event() {
        let raw = RawExtraction {
            title: Some("  Wicked: The Musical! ".to_string()),
            description_text: Some("The untold\n\nstory".to_string()),
            date_text: Some("Thu 12 Nov - Sat 14 Nov".to_string()),
            time_text: Some("8:00 PM".to_string()),
            price_text: Some("BHD 30".to_string()),
            venue_name: Some("Bahrain National Theatre".to_string()),
            venue_address: None,
            image_url: Some("https://cdn.example.com/wicked.jpg".to_string()),
        };

        let event = build_event(&raw, &candidate(), today()).unwrap();
        assert_eq!(event.title, "Wicked: The Musical!");
        assert_eq!(event.slug, "wicked-the-musical");
        assert_eq!(event.description, "The untold story");
        assert_eq!(event.start_date, "2026-11-12");
        assert_eq!(event.start_time.as_deref(), Some("20:00"));
        assert_eq!(event.price, Some(30.0));
        assert_eq!(event.price_currency, "BHD");
        assert_eq!(event.category, Category::Cultural);
        assert_eq!(event.venue_address, DEFAULT_VENUE_ADDRESS);
        assert_eq!(event.image_url, event.cover_url);
        assert_eq!(event.status, STATUS_PUBLISHED);
        assert_eq!(event.source_name, SOURCE_NAME);
        assert!(event.is_active && !event.is_sold_out);
    }

    #[test]
    fn test_sold_out_is_inactive() {
        let raw = RawExtraction {
            title: Some("Big Show".to_string()),
            date_text: Some("1 Dec".to_string()),
            price_text: Some("SOLD OUT".to_string()),
            ..Default::default()
        };
        let event = build_event(&raw, &candidate(), today()).unwrap();
        assert!(event.is_sold_out);
        assert!(!event.is_active);
        assert_eq!(event.price, Some(0.0));
        assert_eq!(event.venue_name, DEFAULT_VENUE_NAME);
    }

    #[test]
    fn test_missing_title_or_date_is_rejected() {
        let no_title = RawExtraction {
            title: Some("   ".to_string()),
            date_text: Some("1 Dec".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_event(&no_title, &candidate(), today()),
            Err(InvalidRecord::EmptyTitle)
        );

        let no_date = RawExtraction {
            title: Some("Tech Summit".to_string()),
            date_text: Some("Conference".to_string()),
            description_text: Some("Everything else is here".to_string()),
            price_text: Some("BHD 10".to_string()),
            venue_name: Some("Exhibition World".to_string()),
            image_url: Some("https://cdn.example.com/a.jpg".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            build_event(&no_date, &candidate(), today()),
            Err(InvalidRecord::UnresolvableDate(_))
        ));
    }
}
