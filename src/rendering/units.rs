//! Human-readable byte sizes and durations.

use std::time::Duration;

/// Decimal (SI) unit suffixes, base 1000.
const DECIMAL_UNITS: [&str; 9] = ["B", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Scales `bytes` down by 1000 until it fits the largest sensible unit.
fn scale(bytes: i64) -> (f64, &'static str) {
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < DECIMAL_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    (value, DECIMAL_UNITS[unit])
}

/// Formats `value` with four significant digits, dropping trailing zeros.
fn four_significant(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    #[allow(clippy::cast_possible_truncation)]
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = usize::try_from(3 - magnitude).unwrap_or(0);
    let formatted = format!("{value:.decimals$}");
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

/// Formats a byte count with decimal units: `500kB`, `1MB`, `1.235GB`.
#[must_use]
pub fn human_size(bytes: i64) -> String {
    let (value, unit) = scale(bytes);
    format!("{}{unit}", four_significant(value))
}

/// Formats a byte count with two fixed decimals: `1.50MB`.
#[must_use]
pub fn precise_size(bytes: i64) -> String {
    let (value, unit) = scale(bytes);
    format!("{value:.2}{unit}")
}

/// Formats an elapsed duration the way `docker` does: `3 hours`, `About a minute`.
#[must_use]
pub fn human_duration(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    if seconds < 1 {
        return "Less than a second".to_string();
    }
    if seconds == 1 {
        return "1 second".to_string();
    }
    if seconds < 60 {
        return format!("{seconds} seconds");
    }

    let minutes = seconds / 60;
    if minutes == 1 {
        return "About a minute".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} minutes");
    }

    // Rounded to the nearest hour.
    let hours = (seconds + 1800) / 3600;
    match hours {
        1 => "About an hour".to_string(),
        h if h < 48 => format!("{h} hours"),
        h if h < 24 * 7 * 2 => format!("{} days", h / 24),
        h if h < 24 * 30 * 2 => format!("{} weeks", h / 24 / 7),
        h if h < 24 * 365 * 2 => format!("{} months", h / 24 / 30),
        _ => format!("{} years", seconds / 3600 / 24 / 365),
    }
}
