//! Flag value parsers.

use std::time::Duration;

/// Nanoseconds per supported unit suffix.
fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        "d" => 86_400 * 1_000_000_000,
        "w" => 604_800 * 1_000_000_000,
        _ => return None,
    })
}

/// Parses a duration such as `24h`, `1h30m`, `1.5h` or `0`.
///
/// Units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`, `d`, `w`.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let text = input.trim();
    if text.is_empty() {
        return Err("duration must not be empty".to_string());
    }
    if text.starts_with('-') {
        return Err(format!("duration must not be negative: '{input}'"));
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = text.strip_prefix('+').unwrap_or(text);
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return Err(format!("invalid duration '{input}': expected a number"));
        }

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(format!("invalid duration '{input}': missing unit after '{number}'"));
        }
        let per_unit = unit_nanos(unit)
            .ok_or_else(|| format!("invalid duration '{input}': unknown unit '{unit}'"))?;

        let nanos = component_nanos(number, per_unit)
            .ok_or_else(|| format!("invalid duration '{input}': '{number}' is not a number"))?;
        total = total
            .checked_add(nanos)
            .ok_or_else(|| format!("duration '{input}' is too large"))?;
        rest = next;
    }

    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| format!("duration '{input}' is too large"))
}

/// Converts `whole.fraction` of a unit to nanoseconds.
fn component_nanos(number: &str, per_unit: u128) -> Option<u128> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if fraction.contains('.') {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(per_unit)?;

    if !fraction.is_empty() {
        // Keep precision to the nanosecond; further digits are dropped.
        let digits: String = fraction.chars().take(18).collect();
        let scale = 10u128.pow(u32::try_from(digits.len()).ok()?);
        let numerator: u128 = digits.parse().ok()?;
        nanos = nanos.checked_add(numerator.checked_mul(per_unit)? / scale)?;
    }
    Some(nanos)
}

/// Parses a non-negative megabyte budget.
pub fn parse_storage_mb(input: &str) -> Result<f64, String> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid storage budget '{input}': expected a number of megabytes"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!(
            "invalid storage budget '{input}': must be a non-negative number of megabytes"
        ));
    }
    Ok(value)
}
