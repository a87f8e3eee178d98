use crate::app::ports::RenderEnginePort;
use crate::error::{Result, ScraperError};
use crate::render::{Extracted, PageImage, Query};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Render engine backed by a plain HTTP fetch and the `scraper` DOM.
/// Pages are re-parsed per query; the parsed tree is not `Send`.
pub struct HttpRenderEngine {
    client: reqwest::Client,
    current: Mutex<Option<LoadedPage>>,
}

struct LoadedPage {
    url: Url,
    html: String,
}

impl HttpRenderEngine {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            current: Mutex::new(None),
        })
    }
}

#[async_trait]
impl RenderEnginePort for HttpRenderEngine {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let nav_err = |message: String| ScraperError::Navigation {
            url: url.to_string(),
            message,
        };
        let parsed = Url::parse(url).map_err(|e| nav_err(e.to_string()))?;
        let resp = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| nav_err(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(nav_err(format!("status {}", resp.status())));
        }
        let final_url = resp.url().clone();
        let html = resp.text().await.map_err(|e| nav_err(e.to_string()))?;
        debug!("Loaded {} ({} bytes)", final_url, html.len());

        *self.current.lock().await = Some(LoadedPage { url: final_url, html });
        Ok(())
    }

    async fn extract(&self, query: &Query) -> Result<Extracted> {
        let guard = self.current.lock().await;
        let page = guard
            .as_ref()
            .ok_or_else(|| ScraperError::Render("no page loaded".to_string()))?;
        evaluate(&page.html, Some(&page.url), query)
    }

    async fn close(&self) -> Result<()> {
        *self.current.lock().await = None;
        Ok(())
    }
}

/// Evaluate a query against an HTML document. URL-valued attributes
/// (`href`, `src`, `data-src`) are resolved against `base` like a browser would.
pub fn evaluate(html: &str, base: Option<&Url>, query: &Query) -> Result<Extracted> {
    let document = Html::parse_document(html);
    match query {
        Query::Text { selector } => {
            let sel = parse_selector(selector)?;
            let text = document
                .select(&sel)
                .map(element_text)
                .find(|t| !t.is_empty());
            Ok(Extracted::Text(text))
        }
        Query::Attr { selector, attr } => {
            let sel = parse_selector(selector)?;
            let value = document
                .select(&sel)
                .filter_map(|el| attribute(el, attr, base))
                .next();
            Ok(Extracted::Text(value))
        }
        Query::AllAttrs { selector, attr } => {
            let sel = parse_selector(selector)?;
            let values = document
                .select(&sel)
                .filter_map(|el| attribute(el, attr, base))
                .collect();
            Ok(Extracted::Texts(values))
        }
        Query::Images => {
            let sel = parse_selector("img")?;
            let images = document
                .select(&sel)
                .filter_map(|el| {
                    // Without layout the only width hints are the attribute and srcset descriptors
                    let widest = el.value().attr("srcset").and_then(widest_candidate);
                    let src = attribute(el, "src", base)
                        .or_else(|| attribute(el, "data-src", base))
                        .or_else(|| widest.and_then(|(url, _)| resolve(url, base)))?;
                    let width = el
                        .value()
                        .attr("width")
                        .and_then(parse_pixels)
                        .or(widest.map(|(_, w)| w));
                    Some(PageImage { src, width })
                })
                .collect();
            Ok(Extracted::Images(images))
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScraperError::Render(format!("bad selector '{}': {:?}", selector, e)))
}

fn element_text(el: ElementRef<'_>) -> String {
    let joined = el.text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn attribute(el: ElementRef<'_>, attr: &str, base: Option<&Url>) -> Option<String> {
    let raw = el.value().attr(attr)?.trim();
    if raw.is_empty() {
        return None;
    }
    if matches!(attr, "href" | "src" | "data-src") {
        return resolve(raw, base);
    }
    Some(raw.to_string())
}

fn resolve(raw: &str, base: Option<&Url>) -> Option<String> {
    match base {
        Some(base) => base.join(raw).ok().map(|u| u.to_string()),
        None => Some(raw.to_string()),
    }
}

// Largest "<url> <n>w" entry of a srcset; density ("2x") entries carry no width
fn widest_candidate(srcset: &str) -> Option<(&str, u32)> {
    srcset
        .split(',')
        .filter_map(|candidate| {
            let mut parts = candidate.split_whitespace();
            let url = parts.next()?;
            let width = parts.next()?.strip_suffix('w')?.parse().ok()?;
            Some((url, width))
        })
        .max_by_key(|(_, width)| *width)
}

// "640", "640px"
fn parse_pixels(value: &str) -> Option<u32> {
    let digits: String = value.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head>
          <meta property="og:image" content="https://cdn.example.com/og.jpg">
        </head><body>
          <h1 class="title">  </h1>
          <h1 class="title">Jazz <b>Night</b></h1>
          <a href="/event-tickets/1/jazz">one</a>
          <a href="https://other.example.com/x">two</a>
          <img src="/img/small.png" width="120">
          <img data-src="https://cdn.example.com/big.jpg" width="800px">
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://manama.platinumlist.net/concerts").unwrap()
    }

    #[test]
    fn test_text_skips_empty_matches() {
        let got = evaluate(PAGE, None, &Query::Text { selector: "h1.title".into() }).unwrap();
        assert_eq!(got, Extracted::Text(Some("Jazz Night".to_string())));
    }

    #[test]
    fn test_attrs_resolve_relative_links() {
        let query = Query::AllAttrs { selector: "a[href]".into(), attr: "href".into() };
        let got = evaluate(PAGE, Some(&base()), &query).unwrap();
        assert_eq!(
            got,
            Extracted::Texts(vec![
                "https://manama.platinumlist.net/event-tickets/1/jazz".to_string(),
                "https://other.example.com/x".to_string(),
            ])
        );
    }

    #[test]
    fn test_meta_attr() {
        let query = Query::Attr { selector: r#"meta[property="og:image"]"#.into(), attr: "content".into() };
        let got = evaluate(PAGE, Some(&base()), &query).unwrap();
        assert_eq!(got, Extracted::Text(Some("https://cdn.example.com/og.jpg".to_string())));
    }

    #[test]
    fn test_images_with_widths() {
        let got = evaluate(PAGE, Some(&base()), &Query::Images).unwrap();
        assert_eq!(
            got,
            Extracted::Images(vec![
                PageImage { src: "https://manama.platinumlist.net/img/small.png".into(), width: Some(120) },
                PageImage { src: "https://cdn.example.com/big.jpg".into(), width: Some(800) },
            ])
        );
    }

    #[test]
    fn test_image_width_from_srcset() {
        let page = r#"
            <img src="/img/poster-400.jpg" srcset="/img/poster-400.jpg 400w, /img/poster-1200.jpg 1200w">
            <img data-srcset="x" srcset="/img/hero-800.jpg 800w, /img/hero-1600.jpg 1600w">
            <img src="/img/retina.jpg" srcset="/img/retina@2x.jpg 2x">
        "#;
        let got = evaluate(page, Some(&base()), &Query::Images).unwrap();
        assert_eq!(
            got,
            Extracted::Images(vec![
                PageImage { src: "https://manama.platinumlist.net/img/poster-400.jpg".into(), width: Some(1200) },
                PageImage { src: "https://manama.platinumlist.net/img/hero-1600.jpg".into(), width: Some(1600) },
                PageImage { src: "https://manama.platinumlist.net/img/retina.jpg".into(), width: None },
            ])
        );
    }

    #[test]
    fn test_widest_candidate() {
        assert_eq!(widest_candidate("a.jpg 320w, b.jpg 960w,c.jpg 640w"), Some(("b.jpg", 960)));
        assert_eq!(widest_candidate("a.jpg 1x, b.jpg 2x"), None);
        assert_eq!(widest_candidate(""), None);
    }

    #[test]
    fn test_bad_selector_is_an_error() {
        assert!(evaluate(PAGE, None, &Query::Text { selector: "[[".into() }).is_err());
    }

    #[tokio::test]
    async fn test_extract_without_page_fails() {
        let engine = HttpRenderEngine::new("test-agent").unwrap();
        assert!(engine.extract(&Query::Images).await.is_err());
    }
}
