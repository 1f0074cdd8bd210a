//! Query URL construction.
//!
//! Produces URLs of the form
//!
//! ```text
//! http://<host>:<port>/api/query?ms=<bool>&arrays=<bool>&show_tsuids=<bool>
//!     &no_annotations=<bool>&global_annotations=<bool>&start=<time>[&end=<time>]
//!     &m=<agg>:[rate{<counter>,<max>,<reset>}:][<downsample>:]<metric>[{k=v,...}]
//!     &tsuids=<agg>:[...]<id>,<id>,...
//! ```
//!
//! [`serialize`] writes a complete URL in one pass. [`UrlTemplate`] renders
//! everything except the time range once and splices `start`/`end` in per
//! request, which is what a poller over a sliding window wants.

use super::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::query::{QuerySpec, QueryTarget, RateOptions};
use crate::time::TimeValue;
use tracing::debug;

pub const START_PLACEHOLDER: &str = "{{start}}";
pub const END_PLACEHOLDER: &str = "{{end}}";

const END_FRAGMENT: &str = "end={{end}}&";

/// `http://<host>:<port>/api/<path>`
pub fn endpoint(config: &ClientConfig, path: &str) -> String {
    format!("http://{}:{}/api/{}", config.host(), config.port(), path)
}

/// Serializes `config` into a complete query URL.
pub fn serialize(config: &ClientConfig) -> ClientResult<String> {
    let start = required_start(config)?;
    ensure_queries(config)?;

    let mut url = String::with_capacity(256);
    write_head(config, &mut url);

    url.push_str("start=");
    url.push_str(&start.to_string());
    url.push('&');
    if let Some(end) = config.end() {
        url.push_str("end=");
        url.push_str(&end.to_string());
        url.push('&');
    }

    write_queries(config.queries(), &mut url)?;
    Ok(url)
}

/// A query URL with `{{start}}` and `{{end}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
    start_at: usize,
    end_at: usize,
}

impl UrlTemplate {
    /// Renders every part of the URL that does not depend on the time range.
    pub fn compile(config: &ClientConfig) -> ClientResult<Self> {
        ensure_queries(config)?;

        let mut template = String::with_capacity(256);
        write_head(config, &mut template);

        template.push_str("start=");
        let start_at = template.len();
        template.push_str(START_PLACEHOLDER);
        template.push('&');

        let end_at = template.len();
        template.push_str(END_FRAGMENT);

        write_queries(config.queries(), &mut template)?;

        debug!(
            "Compiled URL template for {} queries ({} bytes)",
            config.queries().len(),
            template.len()
        );

        Ok(Self {
            template,
            start_at,
            end_at,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitutes the time range. Without an end time the whole
    /// `end={{end}}&` fragment is dropped.
    pub fn instantiate(&self, start: &TimeValue, end: Option<&TimeValue>) -> String {
        let start = start.to_string();
        let end = end.map(|e| e.to_string());

        let mut url = String::with_capacity(self.template.len() + 32);
        url.push_str(&self.template[..self.start_at]);
        url.push_str(&start);
        url.push_str(&self.template[self.start_at + START_PLACEHOLDER.len()..self.end_at]);
        if let Some(end) = end {
            url.push_str("end=");
            url.push_str(&end);
            url.push('&');
        }
        url.push_str(&self.template[self.end_at + END_FRAGMENT.len()..]);
        url
    }

    /// Substitutes the time range currently held by `config`.
    pub fn instantiate_for(&self, config: &ClientConfig) -> ClientResult<String> {
        let start = required_start(config)?;
        Ok(self.instantiate(start, config.end()))
    }
}

fn required_start(config: &ClientConfig) -> ClientResult<&TimeValue> {
    config
        .start()
        .ok_or_else(|| ClientError::not_initialized("must first specify a query start time"))
}

fn ensure_queries(config: &ClientConfig) -> ClientResult<()> {
    if config.queries().is_empty() {
        return Err(ClientError::not_initialized(
            "must first set queries before building a URL",
        ));
    }
    Ok(())
}

fn write_head(config: &ClientConfig, out: &mut String) {
    out.push_str(&endpoint(config, "query"));
    out.push('?');

    out.push_str("ms=");
    out.push_str(bool_str(config.ms_resolution()));
    out.push('&');

    out.push_str("arrays=");
    out.push_str(bool_str(config.arrays_output()));
    out.push('&');

    out.push_str("show_tsuids=");
    out.push_str(bool_str(config.tsuids_output()));
    out.push('&');

    let (no_annotations, global_annotations) = config.annotations().flags();
    out.push_str("no_annotations=");
    out.push_str(bool_str(no_annotations));
    out.push('&');
    out.push_str("global_annotations=");
    out.push_str(bool_str(global_annotations));
    out.push('&');
}

fn write_queries(queries: &[QuerySpec], out: &mut String) -> ClientResult<()> {
    for (i, query) in queries.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        write_query(query, out)?;
    }
    Ok(())
}

fn write_query(query: &QuerySpec, out: &mut String) -> ClientResult<()> {
    query.validate()?;

    match query.target() {
        QueryTarget::Metric { .. } => out.push_str("m="),
        QueryTarget::Tsuids { .. } => out.push_str("tsuids="),
    }

    out.push_str(query.aggregator());
    out.push(':');

    if query.rate() {
        write_rate(&query.rate_options(), out);
    }

    if let Some(downsample) = query.downsample() {
        out.push_str(downsample);
        out.push(':');
    }

    match query.target() {
        QueryTarget::Tsuids { tsuids } => {
            if let Some(tsuids) = tsuids {
                out.push_str(tsuids.as_str());
            }
        }
        QueryTarget::Metric { metric, tags } => {
            if let Some(metric) = metric {
                out.push_str(metric);
            }
            tags.write_filter(out);
        }
    }
    Ok(())
}

/// `rate{<counter>,<counter max or empty>,<reset value>}:`
fn write_rate(options: &RateOptions, out: &mut String) {
    let counter_max = options
        .counter_max
        .map(|max| max.to_string())
        .unwrap_or_default();
    out.push_str(&format!(
        "rate{{{},{},{}}}:",
        options.counter, counter_max, options.reset_value
    ));
}

fn bool_str(flag: bool) -> &'static str {
    if flag {
        "true"
    } else {
        "false"
    }
}
