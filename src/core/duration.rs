//! Human-readable durations such as `5m30s` or `1w2d`.
//!
//! Units are `s`, `m`, `h`, `d` and `w` (case-insensitive). Groups may be
//! separated by whitespace and repeat; their values add up.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

static GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*([smhdw])").unwrap());

const UNITS: &[(char, u64)] = &[('w', 604_800), ('d', 86_400), ('h', 3_600), ('m', 60), ('s', 1)];

/// Error returned when a duration string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("invalid duration `{0}`, expected e.g. `30s`, `5m30s` or `1w2d`")]
    Invalid(String),

    #[error("duration `{0}` is too long")]
    Overflow(String),
}

fn seconds_per(unit: &str) -> u64 {
    let unit = unit.chars().next().map(|c| c.to_ascii_lowercase());
    UNITS
        .iter()
        .find(|(u, _)| Some(*u) == unit)
        .map(|(_, secs)| *secs)
        .unwrap_or(0)
}

/// Parse a duration such as `90s`, `5m30s` or `1h 15m`.
///
/// The whole input must be made of `<number><unit>` groups.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let trimmed = input.trim();
    let invalid = || DurationParseError::Invalid(input.to_string());
    let overflow = || DurationParseError::Overflow(input.to_string());

    let mut seconds: u64 = 0;
    let mut end = 0;
    let mut groups = 0;
    for caps in GROUP.captures_iter(trimmed) {
        let (Some(whole), Some(amount), Some(unit)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            return Err(invalid());
        };
        if !trimmed[end..whole.start()].trim().is_empty() {
            return Err(invalid());
        }
        end = whole.end();
        groups += 1;

        let amount: u64 = amount.as_str().parse().map_err(|_| overflow())?;
        seconds = amount
            .checked_mul(seconds_per(unit.as_str()))
            .and_then(|s| seconds.checked_add(s))
            .ok_or_else(overflow)?;
    }

    if groups == 0 || !trimmed[end..].trim().is_empty() {
        return Err(invalid());
    }
    Ok(Duration::from_secs(seconds))
}

/// Format whole seconds with the largest units first, e.g. `1h30m`.
///
/// Sub-second precision is dropped; zero formats as `0s`.
pub fn format_duration(duration: Duration) -> String {
    let mut rest = duration.as_secs();
    if rest == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, secs) in UNITS {
        let count = rest / secs;
        if count > 0 {
            out.push_str(&format!("{}{}", count, unit));
            rest %= secs;
        }
    }
    out
}
