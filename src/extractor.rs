use crate::app::ports::RenderEnginePort;
use crate::config::ScraperConfig;
use crate::constants::IMAGE_EXCLUDE_MARKERS;
use crate::error::Result;
use crate::normalize::date::has_day_and_month;
use crate::render::PageQuery;
use crate::types::RawExtraction;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const TITLE_SELECTORS: &[&str] = &["h1.event-detail__title", "h1[itemprop=\"name\"]", ".event-title", "h1"];
const TITLE_META: (&str, &str) = ("meta[property=\"og:title\"]", "content");

const DATE_SELECTORS: &[&str] = &[
    ".event-detail__date",
    ".event-date",
    ".date-time .date",
    "[itemprop=\"startDate\"]",
    "time",
    ".date",
];
const DATE_META: &[(&str, &str)] = &[
    ("[itemprop=\"startDate\"]", "content"),
    ("[itemprop=\"startDate\"]", "datetime"),
    ("meta[property=\"event:start_time\"]", "content"),
];

const TIME_SELECTORS: &[&str] = &[".event-detail__time", ".event-time", ".date-time .time", ".time"];
const PRICE_SELECTORS: &[&str] = &[".event-detail__price", ".price", "[itemprop=\"price\"]"];
const VENUE_NAME_SELECTORS: &[&str] = &[".event-detail__venue-name", ".venue-name", "[itemprop=\"location\"] [itemprop=\"name\"]"];
const VENUE_ADDRESS_SELECTORS: &[&str] = &[".event-detail__venue-address", ".venue-address", "[itemprop=\"address\"]"];
const DESCRIPTION_SELECTORS: &[&str] = &[".event-detail__description", ".event-description", "[itemprop=\"description\"]"];
const DESCRIPTION_META: (&str, &str) = ("meta[name=\"description\"]", "content");

const IMAGE_CANDIDATES: &[(&str, &str)] = &[
    ("img.event-detail__image", "src"),
    (".event-gallery img", "src"),
    (".hero img", "src"),
    ("img.main-image", "src"),
    ("meta[property=\"og:image\"]", "content"),
];

/// Pulls raw field strings from one detail page.
pub struct DetailExtractor {
    engine: Arc<dyn RenderEnginePort>,
    settle: Duration,
    navigation_timeout: Duration,
    min_image_width: u32,
}

impl DetailExtractor {
    pub fn new(engine: Arc<dyn RenderEnginePort>, config: &ScraperConfig) -> Self {
        Self {
            engine,
            settle: config.settle(),
            navigation_timeout: config.navigation_timeout(),
            min_image_width: config.min_image_width,
        }
    }

    /// Navigation failure is an error; anything missing after that is just `None`.
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> Result<RawExtraction> {
        self.engine.navigate(url, self.navigation_timeout).await?;
        tokio::time::sleep(self.settle).await;

        let title = match self.first_text(TITLE_SELECTORS).await {
            Some(t) => Some(t),
            None => self.attr(TITLE_META.0, TITLE_META.1).await,
        };

        let date_text = self.date_text().await;

        let time_text = match self.first_text(TIME_SELECTORS).await {
            Some(t) => Some(t),
            // date lines often carry the start time too
            None => date_text.clone(),
        };

        let description_text = match self.first_text(DESCRIPTION_SELECTORS).await {
            Some(d) => Some(d),
            None => self.attr(DESCRIPTION_META.0, DESCRIPTION_META.1).await,
        };

        Ok(RawExtraction {
            title,
            description_text,
            date_text,
            time_text,
            price_text: self.first_text(PRICE_SELECTORS).await,
            venue_name: self.first_text(VENUE_NAME_SELECTORS).await,
            venue_address: self.first_text(VENUE_ADDRESS_SELECTORS).await,
            image_url: self.image_url().await,
        })
    }

    // First selector text that reads like "<day> <month>", else structured metadata
    async fn date_text(&self) -> Option<String> {
        for selector in DATE_SELECTORS {
            if let Some(text) = self.text(selector).await {
                if has_day_and_month(&text) {
                    return Some(text);
                }
                debug!("Date candidate '{}' from {} rejected", text, selector);
            }
        }
        for (selector, attr) in DATE_META {
            if let Some(value) = self.attr(selector, attr).await {
                return Some(value);
            }
        }
        None
    }

    async fn image_url(&self) -> Option<String> {
        for (selector, attr) in IMAGE_CANDIDATES {
            if let Some(src) = self.attr(selector, attr).await {
                if is_usable_image(&src) {
                    return Some(src);
                }
                debug!("Image candidate {} rejected", src);
            }
        }

        let images = match self.engine.images().await {
            Ok(images) => images,
            Err(e) => {
                debug!("Image scan failed: {}", e);
                return None;
            }
        };
        images
            .into_iter()
            .find(|img| img.width.is_some_and(|w| w > self.min_image_width) && is_usable_image(&img.src))
            .map(|img| img.src)
    }

    async fn first_text(&self, selectors: &[&str]) -> Option<String> {
        for selector in selectors {
            if let Some(text) = self.text(selector).await {
                return Some(text);
            }
        }
        None
    }

    // Query failures are per-field and never abort the page
    async fn text(&self, selector: &str) -> Option<String> {
        match self.engine.text(selector).await {
            Ok(t) => t.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                debug!("Query {} failed: {}", selector, e);
                None
            }
        }
    }

    async fn attr(&self, selector: &str, attr: &str) -> Option<String> {
        match self.engine.attr(selector, attr).await {
            Ok(v) => v.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                debug!("Query {}@{} failed: {}", selector, attr, e);
                None
            }
        }
    }
}

/// Promo art, banners and logos are never used as event imagery.
pub fn is_usable_image(src: &str) -> bool {
    let lower = src.to_lowercase();
    !IMAGE_EXCLUDE_MARKERS.iter().any(|m| lower.contains(m))
}
