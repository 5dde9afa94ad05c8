//! Start-time extraction from deep links.
//!
//! Recognized forms: `?t=100`, `?t=100s`, `?t=1m40s`, `?t=1h2m3s`, `?start=100`
//! and the fragment variant `#t=100`.

use url::Url;

use crate::core::time::{self, Time, ZERO};

const TIME_KEYS: [&str; 2] = ["t", "start"];

/// Parse a locator as a URL, tolerating a missing scheme (`youtu.be/abc?t=5`).
pub(crate) fn parse_locator(locator: &str) -> Option<Url> {
    let trimmed = locator.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{trimmed}")).ok()
        }
        Err(_) => None,
    }
}

/// Parse one time-parameter value. `None` when the value is not a time.
fn parse_time_value(raw: &str) -> Option<Time> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(seconds) = raw.parse::<f64>() {
        return (seconds.is_finite() && seconds >= 0.0).then(|| time::from_seconds(seconds));
    }

    let mut total: i64 = 0;
    let mut digits = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c.to_ascii_lowercase() {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        let value: i64 = digits.parse().ok()?;
        total = total.checked_add(value.checked_mul(unit)?)?;
        digits.clear();
    }
    if !digits.is_empty() {
        // trailing bare number counts as seconds, e.g. "1m5"
        total = total.checked_add(digits.parse().ok()?)?;
    }
    total.checked_mul(time::constants::NANOS_PER_SECOND)
}

/// Extract the embedded start time from a locator, or zero if it has none.
pub fn embedded_start_time(locator: &str) -> Time {
    let Some(url) = parse_locator(locator) else {
        return ZERO;
    };

    let from_query = url
        .query_pairs()
        .find(|(key, _)| TIME_KEYS.iter().any(|k| *k == &**key))
        .and_then(|(_, value)| parse_time_value(&value));
    if let Some(start) = from_query {
        return start;
    }

    url.fragment()
        .and_then(|fragment| {
            fragment.split('&').find_map(|pair| {
                let (key, value) = pair.split_once('=')?;
                TIME_KEYS.contains(&key).then(|| parse_time_value(value)).flatten()
            })
        })
        .unwrap_or(ZERO)
}

/// Combine a deep-linked start with an explicitly requested one.
/// The later of the two wins, so a deep link is never regressed to zero.
pub fn resolve_start(locator: &str, requested: Time) -> Time {
    embedded_start_time(locator).max(time::clamp_non_negative(requested))
}
