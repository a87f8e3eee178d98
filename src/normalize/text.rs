use crate::constants::{AFFILIATE_BASE_URL, AFFILIATE_PARTNER_CODE};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

static AFFILIATE_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse(AFFILIATE_BASE_URL).expect("AFFILIATE_BASE_URL is a valid URL"));

/// URL-safe display key derived from a title. Not unique across events.
pub fn create_slug(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lower, "");
    let hyphenated = WHITESPACE.replace_all(stripped.trim(), "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Collapse all whitespace (including newlines) to single spaces.
pub fn clean_description(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Wrap a source URL in the partner redirect. Deterministic for a given input.
pub fn affiliate_url(source_url: &str) -> String {
    let mut url = AFFILIATE_BASE.clone();
    url.query_pairs_mut()
        .append_pair("partner", AFFILIATE_PARTNER_CODE)
        .append_pair("url", source_url);
    url.to_string()
}
