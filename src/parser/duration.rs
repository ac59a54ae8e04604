// SimLog - GPL-3.0-or-later
// This file is part of SimLog.
//
// Copyright (C) 2026 SimLog Contributors
//
// SimLog is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SimLog is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with SimLog.  If not, see <https://www.gnu.org/licenses/>.

//! Duration tokens such as `350µs`, `12ms` or `1.5s` embedded in log text.
//!
//! All durations are normalized to whole microseconds and represented as
//! [`chrono::Duration`].

use crate::error::{Error, Result};
use chrono::Duration;
use fancy_regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// ASCII digits only. Alternation order matters: two-character units come
/// before the bare `s`.
pub(crate) const DURATION_TOKEN: &str = r"[0-9]+(?:\.[0-9]+)?(?:µs|μs|ms|s)";

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)(µs|μs|ms|s)").expect("valid regex literal")
});

/// Time unit suffix of a duration token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Micros,
    Millis,
    Seconds,
}

impl Unit {
    /// Number of microseconds in one unit
    pub const fn micros_per_unit(self) -> f64 {
        match self {
            Self::Micros => 1.0,
            Self::Millis => 1_000.0,
            Self::Seconds => 1_000_000.0,
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            // micro sign (U+00B5) and greek small mu (U+03BC)
            "µs" | "μs" => Ok(Self::Micros),
            "ms" => Ok(Self::Millis),
            "s" => Ok(Self::Seconds),
            other => Err(Error::UnknownUnit(other.to_string())),
        }
    }
}

/// Find the first `<number><unit>` token in `text` and convert it.
///
/// Returns a zero duration when no token is present.
pub fn parse_duration(text: &str) -> Result<Duration> {
    let Ok(Some(caps)) = DURATION_PATTERN.captures(text) else {
        return Ok(Duration::zero());
    };

    let unit: Unit = caps[2].parse()?;
    let value: f64 = caps[1]
        .parse()
        .map_err(|_| Error::UnknownUnit(caps[0].to_string()))?;

    Ok(Duration::microseconds(
        (value * unit.micros_per_unit()).round() as i64,
    ))
}

/// Total length of `duration` in microseconds, as used by the diff queries
pub fn as_micros(duration: Duration) -> f64 {
    duration
        .num_microseconds()
        .map_or_else(|| duration.num_milliseconds() as f64 * 1_000.0, |us| us as f64)
}

/// Format a duration with 3 significant digits and an appropriate unit
pub fn format_duration(duration: Duration) -> String {
    let sign = if duration < Duration::zero() { "-" } else { "" };
    let abs = duration.abs();

    let (value, unit) = if abs.num_days() >= 1 {
        (abs.num_seconds() as f64 / 86400.0, "d")
    } else if abs.num_hours() >= 1 {
        (abs.num_seconds() as f64 / 3600.0, "h")
    } else if abs.num_minutes() >= 1 {
        (abs.num_milliseconds() as f64 / 60_000.0, "m")
    } else if abs.num_seconds() >= 1 {
        (as_micros(abs) / 1_000_000.0, "s")
    } else if abs.num_milliseconds() >= 1 {
        (as_micros(abs) / 1_000.0, "ms")
    } else {
        (as_micros(abs), "µs")
    };

    if value >= 100.0 {
        format!("{sign}{value:.0}{unit}")
    } else if value >= 10.0 {
        format!("{sign}{value:.1}{unit}")
    } else {
        format!("{sign}{value:.2}{unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_normalize_to_micros() {
        assert_eq!(parse_duration("7µs").expect("parse"), Duration::microseconds(7));
        assert_eq!(parse_duration("1ms").expect("parse"), Duration::microseconds(1_000));
        assert_eq!(parse_duration("1s").expect("parse"), Duration::microseconds(1_000_000));
        assert_eq!(parse_duration("3μs").expect("parse"), Duration::microseconds(3));
    }

    #[test]
    fn test_fractional_values() {
        assert_eq!(parse_duration("1.5ms").expect("parse"), Duration::microseconds(1_500));
        assert_eq!(parse_duration("0.25s").expect("parse"), Duration::microseconds(250_000));
    }

    #[test]
    fn test_millis_not_read_as_seconds() {
        let d = parse_duration("took 42ms to finish").expect("parse");
        assert_eq!(d, Duration::milliseconds(42));
    }

    #[test]
    fn test_first_token_wins() {
        let d = parse_duration("encode: 2ms, decode: 9s").expect("parse");
        assert_eq!(d, Duration::milliseconds(2));
    }

    #[test]
    fn test_no_token_is_zero() {
        assert_eq!(parse_duration("no duration here").expect("parse"), Duration::zero());
        assert_eq!(parse_duration("").expect("parse"), Duration::zero());
    }

    #[test]
    fn test_non_ascii_digits_are_not_a_duration() {
        assert_eq!(parse_duration("٣ms").expect("parse"), Duration::zero());
        assert_eq!(parse_duration("٣ms then 4ms").expect("parse"), Duration::milliseconds(4));
    }

    #[test]
    fn test_unknown_unit() {
        let err = "ns".parse::<Unit>().expect_err("ns is not supported");
        assert!(matches!(err, Error::UnknownUnit(ref u) if u == "ns"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::microseconds(350)), "350µs");
        assert_eq!(format_duration(Duration::microseconds(1_500)), "1.50ms");
        assert_eq!(format_duration(Duration::milliseconds(12_300)), "12.3s");
        assert_eq!(format_duration(Duration::milliseconds(-2)), "-2.00ms");
    }

    #[test]
    fn test_as_micros() {
        assert_eq!(as_micros(Duration::seconds(2)), 2_000_000.0);
    }
}
