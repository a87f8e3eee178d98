use serde::{Deserialize, Serialize};
use std::fmt;

/// A detail-page address together with the listing endpoint it was found under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateUrl {
    pub url: String,
    /// Name of the category endpoint, used as the raw category hint
    pub category: String,
}

/// Unvalidated strings pulled from one detail page. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExtraction {
    pub title: Option<String>,
    pub description_text: Option<String>,
    pub date_text: Option<String>,
    pub time_text: Option<String>,
    pub price_text: Option<String>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub image_url: Option<String>,
}

/// Canonical destination categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Comedy,
    Cultural,
    Sports,
    Festivals,
    Family,
    Nightlife,
    Concerts,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Comedy => "comedy",
            Category::Cultural => "cultural",
            Category::Sports => "sports",
            Category::Festivals => "festivals",
            Category::Family => "family",
            Category::Nightlife => "nightlife",
            Category::Concerts => "concerts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of price resolution. `price == 0.0` means free *or* not extracted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub price: f64,
    pub is_sold_out: bool,
}

/// The validated record handed to the image pipeline and the publisher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub title: String,
    pub slug: String,
    pub description: String,
    /// `None` means "contact for price"
    pub price: Option<f64>,
    pub price_currency: String,
    pub image_url: String,
    pub cover_url: String,
    pub venue_name: String,
    pub venue_address: String,
    pub category: Category,
    /// `YYYY-MM-DD`
    pub start_date: String,
    pub end_date: Option<String>,
    /// `HH:MM`, 24-hour
    pub start_time: Option<String>,
    pub source_url: String,
    pub source_name: String,
    pub affiliate_url: String,
    pub is_sold_out: bool,
    pub is_active: bool,
    pub status: String,
}

/// Derived image sizes produced by the image pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageVariant {
    Thumbnail,
    Cover,
}

impl ImageVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageVariant::Thumbnail => "thumbnail",
            ImageVariant::Cover => "cover",
        }
    }
}
