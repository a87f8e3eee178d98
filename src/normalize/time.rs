use once_cell::sync::Lazy;
use regex::Regex;

static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2}):(\d{2})(?:\s*([ap])\.?\s*m\b\.?)?").unwrap());

/// Extract the first `H:MM` / `HH:MM` (optionally am/pm) and return it as 24-hour `HH:MM`.
pub fn resolve_time(text: &str) -> Option<String> {
    let caps = CLOCK.captures(text)?;
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;

    match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(ref meridiem) if meridiem == "p" && hour < 12 => hour += 12,
        Some(ref meridiem) if meridiem == "a" && hour == 12 => hour = 0,
        _ => {}
    }

    if hour > 23 || minute > 59 {
        return None;
    }
    Some(format!("{:02}:{:02}", hour, minute))
}
