use crate::constants::USD_TO_LOCAL_RATE;
use crate::types::PriceInfo;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap());

const SOLD_OUT_MARKERS: &[&str] = &["sold out", "sold-out", "soldout"];
const FOREIGN_CURRENCY_MARKERS: &[&str] = &["$", "usd"];

/// Resolve a displayed price into local currency.
///
/// Sold-out text wins over any number in it. Absent or unparsable text gives
/// `price: 0.0`, which therefore also means "free".
pub fn resolve_price(text: Option<&str>) -> PriceInfo {
    let not_found = PriceInfo { price: 0.0, is_sold_out: false };
    let Some(text) = text else {
        return not_found;
    };
    let lower = text.to_lowercase();

    if SOLD_OUT_MARKERS.iter().any(|m| lower.contains(m)) {
        return PriceInfo { price: 0.0, is_sold_out: true };
    }

    let Some(amount) = NUMBER
        .find(&lower)
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
    else {
        return not_found;
    };

    let price = if FOREIGN_CURRENCY_MARKERS.iter().any(|m| lower.contains(m)) {
        round_fils(amount * USD_TO_LOCAL_RATE)
    } else {
        amount
    };

    PriceInfo { price, is_sold_out: false }
}

// Local currency has three minor-unit digits
fn round_fils(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
