use crate::app::ports::{HttpClientPort, ObjectStorePort};
use crate::config::ScraperConfig;
use crate::constants::{IMAGE_CACHE_CONTROL, IMAGE_CONTENT_TYPE};
use crate::error::{Result, ScraperError};
use crate::types::{ImageVariant, NormalizedEvent};
use chrono::Utc;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Fetches an event's source image, derives thumbnail and cover variants,
/// and uploads them to object storage.
pub struct ImagePipeline {
    http: Arc<dyn HttpClientPort>,
    store: Arc<dyn ObjectStorePort>,
    thumbnail_width: u32,
    cover_width: u32,
}

impl ImagePipeline {
    pub fn new(http: Arc<dyn HttpClientPort>, store: Arc<dyn ObjectStorePort>, config: &ScraperConfig) -> Self {
        Self {
            http,
            store,
            thumbnail_width: config.thumbnail_width,
            cover_width: config.cover_width,
        }
    }

    /// Rewrites `image_url` (thumbnail) and `cover_url` (cover) on success.
    /// Any failure leaves the affected URL pointing at the original image.
    #[instrument(skip(self, event), fields(slug = %event.slug))]
    pub async fn process(&self, mut event: NormalizedEvent) -> NormalizedEvent {
        if event.image_url.is_empty() {
            debug!("No source image");
            return event;
        }

        let source = match self.fetch(&event.image_url).await {
            Ok(img) => img,
            Err(e) => {
                warn!("Keeping original image {}: {}", event.image_url, e);
                counter!("ticket_scraper_image_failures_total", "stage" => "fetch").increment(1);
                return event;
            }
        };

        for variant in [ImageVariant::Thumbnail, ImageVariant::Cover] {
            match self.upload_variant(&source, &event.slug, variant).await {
                Ok(url) => {
                    counter!("ticket_scraper_image_uploads_total", "variant" => variant.as_str()).increment(1);
                    match variant {
                        ImageVariant::Thumbnail => event.image_url = url,
                        ImageVariant::Cover => event.cover_url = url,
                    }
                }
                Err(e) => {
                    warn!("{} variant failed for {}: {}", variant.as_str(), event.slug, e);
                    counter!("ticket_scraper_image_failures_total", "stage" => "upload").increment(1);
                }
            }
        }
        event
    }

    async fn fetch(&self, url: &str) -> Result<DynamicImage> {
        let resp = self.http.get(url).await?;
        if !(200..300).contains(&resp.status) {
            return Err(ScraperError::ImageFetch(format!("{} returned status {}", url, resp.status)));
        }
        Ok(image::load_from_memory(&resp.bytes)?)
    }

    async fn upload_variant(&self, source: &DynamicImage, slug: &str, variant: ImageVariant) -> Result<String> {
        let width = match variant {
            ImageVariant::Thumbnail => self.thumbnail_width,
            ImageVariant::Cover => self.cover_width,
        };
        let bytes = render_variant(source, width)?;
        let key = object_key(slug, variant, Utc::now().timestamp_millis());
        self.store
            .put(&key, bytes, IMAGE_CONTENT_TYPE, IMAGE_CACHE_CONTROL)
            .await
    }
}

/// Resize to `target_width` keeping aspect ratio (never upscaling) and encode as WebP.
pub fn render_variant(source: &DynamicImage, target_width: u32) -> Result<Vec<u8>> {
    let resized = if source.width() > target_width {
        source.resize(target_width, u32::MAX, FilterType::Lanczos3)
    } else {
        source.clone()
    };
    let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());
    let mut buf = Vec::new();
    // image 0.25 only encodes lossless WebP; size savings come from the downscale
    rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buf))?;
    Ok(buf)
}

/// `events/<slug>/<variant>-<millis>.webp`; the timestamp keeps retries from overwriting.
pub fn object_key(slug: &str, variant: ImageVariant, timestamp_millis: i64) -> String {
    let slug = if slug.is_empty() { "untitled" } else { slug };
    format!("events/{}/{}-{}.webp", slug, variant.as_str(), timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::HttpGetResult;
    use crate::types::Category;
    use async_trait::async_trait;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;
    use tokio::sync::Mutex;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    struct FixedHttp {
        result: Option<HttpGetResult>,
    }

    #[async_trait]
    impl HttpClientPort for FixedHttp {
        async fn get(&self, _url: &str) -> Result<HttpGetResult> {
            self.result.clone().ok_or_else(|| ScraperError::ImageFetch("connection refused".into()))
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        keys: Mutex<Vec<(String, String, String)>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl ObjectStorePort for RecordingStore {
        async fn put(&self, key: &str, _bytes: Vec<u8>, content_type: &str, cache_control: &str) -> Result<String> {
            if self.fail_on.is_some_and(|v| key.contains(v)) {
                return Err(ScraperError::Storage { message: "403".into() });
            }
            self.keys
                .lock()
                .await
                .push((key.to_string(), content_type.to_string(), cache_control.to_string()));
            Ok(format!("https://store.example.com/{}", key))
        }
    }

    fn event() -> NormalizedEvent {
        NormalizedEvent {
            title: "Jazz Night".into(),
            slug: "jazz-night".into(),
            description: String::new(),
            price: Some(0.0),
            price_currency: "BHD".into(),
            image_url: "https://cdn.example.com/jazz.png".into(),
            cover_url: "https://cdn.example.com/jazz.png".into(),
            venue_name: "Venue".into(),
            venue_address: "Bahrain".into(),
            category: Category::Concerts,
            start_date: "2026-11-01".into(),
            end_date: None,
            start_time: None,
            source_url: "https://manama.platinumlist.net/event-tickets/1/jazz".into(),
            source_name: "platinumlist".into(),
            affiliate_url: "https://platinumlist.net/aff/?x".into(),
            is_sold_out: false,
            is_active: true,
            status: "published".into(),
        }
    }

    fn ok_image(bytes: Vec<u8>) -> Arc<dyn HttpClientPort> {
        Arc::new(FixedHttp {
            result: Some(HttpGetResult { status: 200, bytes }),
        })
    }

    fn config() -> ScraperConfig {
        ScraperConfig { thumbnail_width: 40, cover_width: 120, ..ScraperConfig::default() }
    }

    #[test]
    fn test_variant_downscales_but_never_upscales() {
        let source = image::load_from_memory(&png(200, 100)).unwrap();

        let small = image::load_from_memory(&render_variant(&source, 50).unwrap()).unwrap();
        assert_eq!((small.width(), small.height()), (50, 25));

        let same = image::load_from_memory(&render_variant(&source, 1000).unwrap()).unwrap();
        assert_eq!((same.width(), same.height()), (200, 100));
    }

    #[test]
    fn test_smaller_variant_encodes_smaller() {
        let photo = DynamicImage::ImageRgb8(RgbImage::from_fn(1600, 800, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
        }));
        let thumbnail = render_variant(&photo, 400).unwrap();
        let cover = render_variant(&photo, 1200).unwrap();
        assert!(thumbnail.len() < cover.len());
        assert_eq!(image::load_from_memory(&thumbnail).unwrap().width(), 400);
    }

    #[test]
    fn test_object_key_layout() {
        assert_eq!(
            object_key("jazz-night", ImageVariant::Cover, 1700000000000),
            "events/jazz-night/cover-1700000000000.webp"
        );
        assert_eq!(object_key("", ImageVariant::Thumbnail, 1), "events/untitled/thumbnail-1.webp");
    }

    #[tokio::test]
    async fn test_both_variants_uploaded() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = ImagePipeline::new(ok_image(png(300, 150)), store.clone(), &config());

        let out = pipeline.process(event()).await;
        assert!(out.image_url.contains("/events/jazz-night/thumbnail-"));
        assert!(out.cover_url.contains("/events/jazz-night/cover-"));

        let keys = store.keys.lock().await;
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|(_, ct, cc)| ct == IMAGE_CONTENT_TYPE && cc == IMAGE_CACHE_CONTROL));
    }

    #[tokio::test]
    async fn test_one_variant_failing_does_not_block_the_other() {
        let store = Arc::new(RecordingStore { fail_on: Some("thumbnail"), ..Default::default() });
        let pipeline = ImagePipeline::new(ok_image(png(300, 150)), store, &config());

        let out = pipeline.process(event()).await;
        assert_eq!(out.image_url, "https://cdn.example.com/jazz.png");
        assert!(out.cover_url.contains("/cover-"));
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_event_unchanged() {
        let store = Arc::new(RecordingStore::default());
        let http: Arc<dyn HttpClientPort> = Arc::new(FixedHttp { result: None });
        let pipeline = ImagePipeline::new(http, store.clone(), &config());

        assert_eq!(pipeline.process(event()).await, event());
        assert!(store.keys.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_bytes_leave_event_unchanged() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = ImagePipeline::new(ok_image(b"<html>not an image</html>".to_vec()), store, &config());
        assert_eq!(pipeline.process(event()).await, event());
    }
}
