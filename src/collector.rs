use crate::app::ports::RenderEnginePort;
use crate::config::ScraperConfig;
use crate::constants::{CategoryEndpoint, CATEGORY_ENDPOINTS, EXCLUDED_PATH_MARKERS, SOURCE_HOST, TICKET_PATH_MARKER};
use crate::error::Result;
use crate::render::PageQuery;
use crate::types::CandidateUrl;
use metrics::counter;
use reqwest::Url;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Walks the category listing pages and gathers event detail URLs.
pub struct UrlCollector {
    engine: Arc<dyn RenderEnginePort>,
    endpoints: Vec<CategoryEndpoint>,
    settle: Duration,
    navigation_timeout: Duration,
}

impl UrlCollector {
    pub fn new(engine: Arc<dyn RenderEnginePort>, config: &ScraperConfig) -> Self {
        Self {
            engine,
            endpoints: CATEGORY_ENDPOINTS.to_vec(),
            settle: config.settle(),
            navigation_timeout: config.navigation_timeout(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Vec<CategoryEndpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Deduplicated candidates across every endpoint. A failing endpoint
    /// contributes nothing; an empty result is not an error.
    pub async fn collect(&self) -> Vec<CandidateUrl> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for endpoint in &self.endpoints {
            match self.collect_endpoint(endpoint).await {
                Ok(urls) => {
                    let before = candidates.len();
                    for url in urls {
                        if seen.insert(url.clone()) {
                            candidates.push(CandidateUrl {
                                url,
                                category: endpoint.name.to_string(),
                            });
                        }
                    }
                    info!("{}: {} new event URLs", endpoint.name, candidates.len() - before);
                }
                Err(e) => {
                    warn!("Failed to collect from {} ({}): {}", endpoint.name, endpoint.url, e);
                    counter!("ticket_scraper_endpoint_failures_total", "endpoint" => endpoint.name).increment(1);
                }
            }
        }

        counter!("ticket_scraper_urls_discovered_total").increment(candidates.len() as u64);
        candidates
    }

    #[instrument(skip(self), fields(endpoint = %endpoint.name))]
    async fn collect_endpoint(&self, endpoint: &CategoryEndpoint) -> Result<Vec<String>> {
        self.engine.navigate(endpoint.url, self.navigation_timeout).await?;
        tokio::time::sleep(self.settle).await;

        let hrefs = self.engine.all_attrs("a[href]", "href").await?;
        let mut seen = HashSet::new();
        Ok(hrefs
            .iter()
            .filter_map(|href| candidate_url(href))
            .filter(|url| seen.insert(url.clone()))
            .collect())
    }
}

/// Canonical detail URL for a link, or `None` if it is not an event ticket page.
/// Query string and fragment are dropped so tracking parameters do not defeat dedup.
pub fn candidate_url(href: &str) -> Option<String> {
    let mut url = Url::parse(href).ok()?;
    let host = url.host_str()?;
    if host != SOURCE_HOST && !host.ends_with(&format!(".{}", SOURCE_HOST)) {
        return None;
    }

    let path = url.path();
    if !path.contains(TICKET_PATH_MARKER) {
        return None;
    }
    if EXCLUDED_PATH_MARKERS.iter().any(|m| path.contains(m)) {
        return None;
    }

    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::http_render::evaluate;
    use crate::render::{Extracted, Query};
    use crate::error::ScraperError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Serves canned HTML per URL; unknown URLs fail navigation.
    struct CannedPages {
        pages: HashMap<&'static str, &'static str>,
        current: tokio::sync::Mutex<Option<(Url, &'static str)>>,
    }

    #[async_trait]
    impl RenderEnginePort for CannedPages {
        async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
            let html = self.pages.get(url).ok_or_else(|| ScraperError::Navigation {
                url: url.to_string(),
                message: "timeout".to_string(),
            })?;
            *self.current.lock().await = Some((Url::parse(url).unwrap(), html));
            Ok(())
        }

        async fn extract(&self, query: &Query) -> Result<Extracted> {
            let guard = self.current.lock().await;
            let (url, html) = guard.as_ref().unwrap();
            evaluate(html, Some(url), query)
        }
    }

    const CONCERTS: &str = r##"
        <a href="/event-tickets/100/amr-diab">A</a>
        <a href="/event-tickets/100/amr-diab?utm_source=x#top">A again</a>
        <a href="https://manama.platinumlist.net/event-tickets/200/jazz">B</a>
        <a href="https://manama.platinumlist.net/things-to-do/event-tickets/300/desert">excluded</a>
        <a href="https://manama.platinumlist.net/attraction/400/water-park">not a ticket</a>
        <a href="https://elsewhere.com/event-tickets/500/x">other host</a>
    "##;

    const COMEDY: &str = r##"
        <a href="/event-tickets/200/jazz">B dup across endpoints</a>
        <a href="/event-tickets/600/stand-up">C</a>
    "##;

    fn engine() -> Arc<dyn RenderEnginePort> {
        let mut pages = HashMap::new();
        pages.insert("https://manama.platinumlist.net/concerts", CONCERTS);
        pages.insert("https://manama.platinumlist.net/comedy", COMEDY);
        Arc::new(CannedPages { pages, current: tokio::sync::Mutex::new(None) })
    }

    fn config() -> ScraperConfig {
        ScraperConfig { settle_ms: 0, ..ScraperConfig::default() }
    }

    #[test]
    fn test_candidate_url_filters() {
        assert_eq!(
            candidate_url("https://manama.platinumlist.net/event-tickets/1/x?a=b#c").as_deref(),
            Some("https://manama.platinumlist.net/event-tickets/1/x")
        );
        assert_eq!(candidate_url("https://platinumlist.net/event-tickets/1/x").as_deref(), Some("https://platinumlist.net/event-tickets/1/x"));
        assert_eq!(candidate_url("https://manama.platinumlist.net/things-to-do/event-tickets/1/x"), None);
        assert_eq!(candidate_url("https://manama.platinumlist.net/tour/event-tickets/1/x"), None);
        assert_eq!(candidate_url("https://notplatinumlist.net/event-tickets/1/x"), None);
        assert_eq!(candidate_url("/event-tickets/1/x"), None);
    }

    #[tokio::test]
    async fn test_collect_dedups_and_survives_failed_endpoint() {
        let collector = UrlCollector::new(engine(), &config()).with_endpoints(vec![
            CategoryEndpoint { name: "concerts", url: "https://manama.platinumlist.net/concerts" },
            CategoryEndpoint { name: "sports", url: "https://manama.platinumlist.net/sports" },
            CategoryEndpoint { name: "comedy", url: "https://manama.platinumlist.net/comedy" },
        ]);

        let found = collector.collect().await;
        let urls: HashSet<_> = found.iter().map(|c| c.url.as_str()).collect();

        assert_eq!(found.len(), 3);
        assert!(urls.contains("https://manama.platinumlist.net/event-tickets/100/amr-diab"));
        assert!(urls.contains("https://manama.platinumlist.net/event-tickets/200/jazz"));
        assert!(urls.contains("https://manama.platinumlist.net/event-tickets/600/stand-up"));
        assert!(found.iter().all(|c| !c.url.contains("/things-to-do/")));

        let stand_up = found.iter().find(|c| c.url.ends_with("stand-up")).unwrap();
        assert_eq!(stand_up.category, "comedy");
    }

    #[tokio::test]
    async fn test_collect_with_nothing_reachable_is_empty() {
        let collector = UrlCollector::new(engine(), &config()).with_endpoints(vec![
            CategoryEndpoint { name: "sports", url: "https://manama.platinumlist.net/sports" },
        ]);
        assert!(collector.collect().await.is_empty());
    }
}
