//! Time value classification.
//!
//! TSDB accepts three spellings for a query boundary or datum timestamp:
//!
//! - relative: `72000ms-ago`, `5m-ago`, `2n-ago` (`n` is months)
//! - absolute: `2014/07/18`, `2014/07/18 09:34`, `2014/07/18-09:34:42`
//! - timestamp: Unix seconds (10 digits) or milliseconds (13 digits)
//!
//! Strings are only ever relative or absolute; numbers are only ever timestamps.

use crate::error::{ClientError, ClientResult};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    Relative,
    Absolute,
    Timestamp,
    Invalid,
}

/// An unclassified time input, either text or a number.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTime {
    Text(String),
    Number(f64),
}

impl From<&str> for RawTime {
    fn from(s: &str) -> Self {
        RawTime::Text(s.to_string())
    }
}

impl From<String> for RawTime {
    fn from(s: String) -> Self {
        RawTime::Text(s)
    }
}

impl From<u64> for RawTime {
    fn from(n: u64) -> Self {
        RawTime::Number(n as f64)
    }
}

impl From<i64> for RawTime {
    fn from(n: i64) -> Self {
        RawTime::Number(n as f64)
    }
}

impl From<f64> for RawTime {
    fn from(n: f64) -> Self {
        RawTime::Number(n)
    }
}

impl From<TimeValue> for RawTime {
    fn from(value: TimeValue) -> Self {
        match value {
            TimeValue::Relative(s) | TimeValue::Absolute(s) => RawTime::Text(s),
            TimeValue::Timestamp(n) => RawTime::Number(n as f64),
        }
    }
}

/// A validated time value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeValue {
    Relative(String),
    Absolute(String),
    Timestamp(u64),
}

impl TimeValue {
    /// Classifies `raw`, rejecting anything that is not a recognised format.
    pub fn parse(raw: impl Into<RawTime>) -> ClientResult<Self> {
        let raw = raw.into();
        match (format(&raw)?, raw) {
            (TimeFormat::Absolute, RawTime::Text(s)) => Ok(TimeValue::Absolute(s)),
            (TimeFormat::Relative, RawTime::Text(s)) => Ok(TimeValue::Relative(s)),
            (TimeFormat::Timestamp, RawTime::Number(n)) => Ok(TimeValue::Timestamp(n as u64)),
            (_, raw) => Err(ClientError::InvalidTimeFormat(describe(&raw))),
        }
    }

    pub fn format(&self) -> TimeFormat {
        match self {
            TimeValue::Relative(_) => TimeFormat::Relative,
            TimeValue::Absolute(_) => TimeFormat::Absolute,
            TimeValue::Timestamp(_) => TimeFormat::Timestamp,
        }
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeValue::Relative(s) | TimeValue::Absolute(s) => f.write_str(s),
            TimeValue::Timestamp(n) => write!(f, "{}", n),
        }
    }
}

fn absolute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}(?:[ -]\d{1,2}:\d{2}(?::\d{2})?)?$")
            .expect("absolute time pattern compiles")
    })
}

fn relative_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d*(?:ms|[smhdwny])-ago$").expect("relative time pattern compiles")
    })
}

/// Returns whether `time` is a relative time string, e.g. `72000ms-ago`.
pub fn relative(time: &str) -> bool {
    relative_pattern().is_match(time)
}

/// Returns whether `time` is an absolute time string, e.g. `2014/07/14-9:23:23`.
pub fn absolute(time: &str) -> bool {
    absolute_pattern().is_match(time)
}

/// Returns whether `time` is a Unix timestamp in seconds or milliseconds.
pub fn timestamp(time: f64) -> bool {
    if !time.is_finite() || time < 0.0 || time.fract() != 0.0 || time >= 1e13 {
        return false;
    }
    let digits = (time as u64).to_string().len();
    digits == 10 || digits == 13
}

/// Classifies a time input. Absolute is tried before relative for strings.
pub fn format(time: &RawTime) -> ClientResult<TimeFormat> {
    let classified = match time {
        RawTime::Text(s) if absolute(s) => TimeFormat::Absolute,
        RawTime::Text(s) if relative(s) => TimeFormat::Relative,
        RawTime::Text(_) => TimeFormat::Invalid,
        RawTime::Number(n) if n.is_nan() => {
            return Err(ClientError::invalid_argument(
                "time must be either a string or numeric",
            ));
        }
        RawTime::Number(n) if timestamp(*n) => TimeFormat::Timestamp,
        RawTime::Number(_) => TimeFormat::Invalid,
    };
    Ok(classified)
}

fn describe(raw: &RawTime) -> String {
    match raw {
        RawTime::Text(s) => format!("'{}'", s),
        RawTime::Number(n) => n.to_string(),
    }
}
