//! Human friendly duration formatting.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// A `Duration` whose `Display` uses [`format_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FormattedDuration(pub Duration);

impl fmt::Display for FormattedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl From<Duration> for FormattedDuration {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

/// Format a duration for humans.
///
/// Microseconds drop their fraction (`"12 µs"`), milliseconds keep at most
/// two fractional digits (`"1.23 ms"`). Longer durations use the compact
/// `1h2m3.5s` form.
pub fn format_duration(d: Duration) -> String {
    let s = compact_duration(d);
    if let Some(value) = s.strip_suffix("µs") {
        let int = value.split('.').next().unwrap_or(value);
        return format!("{int} µs");
    }
    if let Some(value) = s.strip_suffix("ms") {
        return match value.split_once('.') {
            Some((int, frac)) if frac.len() > 2 => format!("{int}.{} ms", &frac[..2]),
            _ => format!("{value} ms"),
        };
    }
    s
}

/// Coarse duration: `"2d 3hr"`, `"1hr 5m"` or `"7m"`.
pub fn duration_to_string(d: Duration) -> String {
    let total_minutes = d.as_secs() / 60;
    let minutes = total_minutes % 60;
    let total_hours = total_minutes / 60;
    let days = total_hours / 24;
    let hours = total_hours % 24;
    if days > 0 {
        return format!("{days}d {hours}hr");
    }
    if hours > 0 {
        return format!("{hours}hr {minutes}m");
    }
    format!("{minutes}m")
}

/// Time elapsed since `t`, formatted with [`duration_to_string`].
///
/// Times in the future count as zero.
pub fn time_since_as_string(t: DateTime<Utc>) -> String {
    let elapsed = (Utc::now() - t).to_std().unwrap_or(Duration::ZERO);
    duration_to_string(elapsed)
}

/// Compact unit-suffixed representation, e.g. `750ns`, `1.5µs`, `2m0.25s`.
fn compact_duration(d: Duration) -> String {
    let nanos = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        let (int, frac) = split_fraction(nanos, 3);
        return format!("{int}{frac}µs");
    }
    if nanos < 1_000_000_000 {
        let (int, frac) = split_fraction(nanos, 6);
        return format!("{int}{frac}ms");
    }

    let (secs, frac) = split_fraction(nanos, 9);
    let mut out = format!("{}{frac}s", secs % 60);
    let minutes = secs / 60;
    if minutes > 0 {
        out = format!("{}m{out}", minutes % 60);
        let hours = minutes / 60;
        if hours > 0 {
            out = format!("{hours}h{out}");
        }
    }
    out
}

/// Split `v` into its integer part and a `.ddd` fraction with `prec` digits,
/// trailing zeros removed. The fraction is empty when it is zero.
fn split_fraction(v: u64, prec: u32) -> (u64, String) {
    let scale = 10u64.pow(prec);
    let int = v / scale;
    let frac = v % scale;
    if frac == 0 {
        return (int, String::new());
    }
    let digits = format!("{frac:0width$}", width = prec as usize);
    (int, format!(".{}", digits.trim_end_matches('0')))
}
