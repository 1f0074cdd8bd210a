//! Single data points in line-protocol form.
//!
//! `<metric> <timestamp> <value> [<tagk>=<tagv> ...]`
//!
//! A [`Datum`] can be reused as a line factory: set metric and tags once,
//! then update timestamp and value before each [`Datum::to_line`].

use crate::error::{ClientError, ClientResult};
use crate::tags::Tags;
use crate::time::{RawTime, TimeValue};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datum {
    metric: Option<String>,
    timestamp: Option<TimeValue>,
    value: Option<f64>,
    tags: Tags,
}

impl Datum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metric(&self) -> Option<&str> {
        self.metric.as_deref()
    }

    pub fn set_metric(&mut self, name: impl Into<String>) -> ClientResult<&mut Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ClientError::invalid_argument("metric name must be a non-empty string"));
        }
        self.metric = Some(name);
        Ok(self)
    }

    pub fn timestamp(&self) -> Option<&TimeValue> {
        self.timestamp.as_ref()
    }

    pub fn set_timestamp(&mut self, value: impl Into<RawTime>) -> ClientResult<&mut Self> {
        self.timestamp = Some(TimeValue::parse(value)?);
        Ok(self)
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn set_value(&mut self, value: f64) -> ClientResult<&mut Self> {
        if !value.is_finite() {
            return Err(ClientError::invalid_argument("value must be a finite number"));
        }
        self.value = Some(value);
        Ok(self)
    }

    pub fn tags(&self) -> IndexMap<String, String> {
        self.tags.to_map()
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key)
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.tags.insert(key, value);
        self
    }

    pub fn remove_tag(&mut self, key: &str) -> &mut Self {
        self.tags.remove(key);
        self
    }

    /// Serializes the datum. Metric, timestamp and value must all be set;
    /// a value of zero counts as set.
    pub fn to_line(&self) -> ClientResult<String> {
        let metric = self
            .metric
            .as_deref()
            .ok_or(ClientError::IncompleteDatum { field: "metric" })?;
        let timestamp = self
            .timestamp
            .as_ref()
            .ok_or(ClientError::IncompleteDatum { field: "timestamp" })?;
        let value = self.value.ok_or(ClientError::IncompleteDatum { field: "value" })?;

        let mut line = format!("{} {} {}", metric, timestamp, value);
        if !self.tags.is_empty() {
            line.push(' ');
            self.tags.write_pairs(&mut line, ' ');
        }
        Ok(line)
    }
}

/// Newline-joins the lines of several data points.
pub fn to_batch<'a>(data: impl IntoIterator<Item = &'a Datum>) -> ClientResult<String> {
    let lines = data
        .into_iter()
        .map(Datum::to_line)
        .collect::<ClientResult<Vec<_>>>()?;
    Ok(lines.join("\n"))
}
