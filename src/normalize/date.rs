use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").unwrap());
static DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)?\b").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").unwrap());
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+").unwrap());
static RANGE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+to\s+|[-\u{2013}\u{2014}]").unwrap());

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// Look a month up by full name or by an abbreviation of at least three letters
/// ("Jan", "Sept", "Febr"). Returns 1-based month number.
pub fn month_from_name(token: &str) -> Option<u32> {
    let token = token.to_lowercase();
    if token.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| name.starts_with(token.as_str()))
        .map(|i| i as u32 + 1)
}

/// Resolve free-form date text such as "Fri 23 Jan - Sun 25 Jan" into
/// `YYYY-MM-DD`, relative to `today` when the text carries no year.
///
/// Only the first date of a range is kept; its day comes from the first piece and
/// a missing month is borrowed from the next piece that has one ("12-14 Dec").
/// Day and month are both required.
/// A missing year is inferred: months earlier than today's month roll over to
/// next year. The string is assembled from components, never via timezone
/// conversion.
pub fn resolve_date(text: &str, today: NaiveDate) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // Structured metadata (startDate attributes) arrives as ISO-8601
    if let Some(caps) = ISO_DATE.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return format_components(year, month, day);
    }

    // "12-14 Dec" and "23-Jan-2027" split into pieces that only make a date together
    let pieces: Vec<&str> = RANGE_SEPARATOR.split(text).map(str::trim).collect();

    let day = find_day(pieces.first()?)?;
    let month_at = pieces.iter().position(|p| month_in(p).is_some())?;
    let month = month_in(pieces[month_at])?;

    // A year may trail the month ("23-Jan-2027") but never belongs to a later date's month
    let trailing = pieces.get(month_at + 1).filter(|p| month_in(p).is_none());
    let year = match pieces[..=month_at].iter().chain(trailing).find_map(|p| year_in(p)) {
        Some(y) => y,
        None if month < today.month() => today.year() + 1,
        None => today.year(),
    };

    format_components(year, month, day)
}

/// `resolve_date` against the local calendar date
pub fn resolve_date_today(text: &str) -> Option<String> {
    resolve_date(text, Local::now().date_naive())
}

/// True when the text looks like "<day> <month name>", e.g. "23 Jan", "5th March" or "23-Jan"
pub fn has_day_and_month(text: &str) -> bool {
    static DAY_MONTH: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)?[\s-]+([A-Za-z]{3,})").unwrap());
    DAY_MONTH
        .captures_iter(text)
        .any(|c| month_from_name(&c[2]).is_some())
}

// First 1-2 digit number that is not part of a clock time like "20:00"
fn find_day(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    DAY.captures_iter(text).find_map(|caps| {
        let m = caps.get(1)?;
        let before = m.start().checked_sub(1).map(|i| bytes[i]);
        let after = bytes.get(m.end()).copied();
        if before == Some(b':') || after == Some(b':') {
            return None;
        }
        let day: u32 = m.as_str().parse().ok()?;
        (1..=31).contains(&day).then_some(day)
    })
}

fn month_in(text: &str) -> Option<u32> {
    WORD.find_iter(text).find_map(|m| month_from_name(m.as_str()))
}

fn year_in(text: &str) -> Option<i32> {
    YEAR.captures(text).and_then(|c| c[1].parse().ok())
}

fn format_components(year: i32, month: u32, day: u32) -> Option<String> {
    // Reject impossible dates like 31 Feb
    NaiveDate::from_ymd_opt(year, month, day)?;
    Some(format!("{:04}-{:02}-{:02}", year, month, day))
}
