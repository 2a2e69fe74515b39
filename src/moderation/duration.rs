//! Mute duration parsing and display.

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;

/// Parse `<integer><unit>` into milliseconds.
///
/// Units are `m`, `h`, `d` and `w` (case-insensitive). Zero, negative and
/// overflowing values are rejected.
pub fn parse_duration(spec: &str) -> Option<i64> {
    let spec = spec.trim();
    let unit = spec.chars().last()?;
    let digits = &spec[..spec.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let multiplier = match unit.to_ascii_lowercase() {
        'm' => MINUTE_MS,
        'h' => HOUR_MS,
        'd' => DAY_MS,
        'w' => WEEK_MS,
        _ => return None,
    };
    let value: i64 = digits.parse().ok()?;
    value.checked_mul(multiplier).filter(|ms| *ms > 0)
}

/// Render milliseconds with Russian unit suffixes, two most significant units.
pub fn format_duration(millis: i64) -> String {
    let seconds = millis.max(0) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}д {}ч", days, hours % 24)
    } else if hours > 0 {
        format!("{}ч {}м", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{minutes}м")
    } else {
        format!("{seconds}с")
    }
}
