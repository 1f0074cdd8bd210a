//! Sub-query specifications.
//!
//! A [`QuerySpec`] addresses series either by metric name plus tag filters or
//! by an explicit list of TSUIDs. Both kinds share the same operator settings:
//! aggregator, optional downsampler and the rate transform.

pub mod rate;
pub mod tsuids;

pub use rate::{RateOptions, RateOptionsUpdate};
pub use tsuids::TsuidList;

use crate::error::{ClientError, ClientResult};
use crate::tags::Tags;
use indexmap::IndexMap;

pub const DEFAULT_AGGREGATOR: &str = "avg";

/// What a sub-query selects.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTarget {
    Metric { metric: Option<String>, tags: Tags },
    Tsuids { tsuids: Option<TsuidList> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    target: QueryTarget,
    aggregator: String,
    downsample: Option<String>,
    rate: bool,
    rate_options: RateOptions,
}

impl QuerySpec {
    fn with_target(target: QueryTarget) -> Self {
        Self {
            target,
            aggregator: DEFAULT_AGGREGATOR.to_string(),
            downsample: None,
            rate: false,
            rate_options: RateOptions::default(),
        }
    }

    /// An empty metric query. The metric name must be set before serialization.
    pub fn new_metric() -> Self {
        Self::with_target(QueryTarget::Metric {
            metric: None,
            tags: Tags::new(),
        })
    }

    /// An empty TSUID query. The TSUIDs must be set before serialization.
    pub fn new_tsuids() -> Self {
        Self::with_target(QueryTarget::Tsuids { tsuids: None })
    }

    pub fn target(&self) -> &QueryTarget {
        &self.target
    }

    /// `"metric"` or `"tsuids"`.
    pub fn kind(&self) -> &'static str {
        match self.target {
            QueryTarget::Metric { .. } => "metric",
            QueryTarget::Tsuids { .. } => "tsuids",
        }
    }

    pub fn aggregator(&self) -> &str {
        &self.aggregator
    }

    pub fn set_aggregator(&mut self, aggregator: impl Into<String>) -> ClientResult<&mut Self> {
        let aggregator = aggregator.into();
        if aggregator.is_empty() {
            return Err(ClientError::invalid_argument("aggregator must be a non-empty string"));
        }
        self.aggregator = aggregator;
        Ok(self)
    }

    pub fn downsample(&self) -> Option<&str> {
        self.downsample.as_deref()
    }

    /// Sets a downsampler such as `5m-avg`. An empty string clears it.
    pub fn set_downsample(&mut self, downsample: impl Into<String>) -> &mut Self {
        let downsample = downsample.into();
        self.downsample = if downsample.is_empty() { None } else { Some(downsample) };
        self
    }

    pub fn clear_downsample(&mut self) -> &mut Self {
        self.downsample = None;
        self
    }

    pub fn rate(&self) -> bool {
        self.rate
    }

    pub fn set_rate(&mut self, rate: bool) -> &mut Self {
        self.rate = rate;
        self
    }

    /// A copy of the current rate options.
    pub fn rate_options(&self) -> RateOptions {
        self.rate_options
    }

    /// Merges the supplied fields into the rate options; omitted fields are kept.
    pub fn set_rate_options(&mut self, update: RateOptionsUpdate) -> ClientResult<&mut Self> {
        self.rate_options = self.rate_options.merged(update)?;
        Ok(self)
    }

    /// The metric name. Fails on a TSUID query.
    pub fn metric(&self) -> ClientResult<Option<&str>> {
        match &self.target {
            QueryTarget::Metric { metric, .. } => Ok(metric.as_deref()),
            QueryTarget::Tsuids { .. } => Err(tsuids_unsupported("metric")),
        }
    }

    pub fn set_metric(&mut self, name: impl Into<String>) -> ClientResult<&mut Self> {
        let name = name.into();
        match &mut self.target {
            QueryTarget::Metric { metric, .. } => {
                if name.is_empty() {
                    return Err(ClientError::invalid_argument("metric name must be a non-empty string"));
                }
                *metric = Some(name);
                Ok(self)
            }
            QueryTarget::Tsuids { .. } => Err(tsuids_unsupported("metric")),
        }
    }

    /// A copy of all tags. Fails on a TSUID query.
    pub fn tags(&self) -> ClientResult<IndexMap<String, String>> {
        Ok(self.metric_tags("tags")?.to_map())
    }

    /// The value for one tag key, if set. Fails on a TSUID query.
    pub fn tag(&self, key: &str) -> ClientResult<Option<&str>> {
        Ok(self.metric_tags("tags")?.get(key))
    }

    /// Sets a tag filter; the value may be literal, `*` or `a|b`.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) -> ClientResult<&mut Self> {
        match &mut self.target {
            QueryTarget::Metric { tags, .. } => {
                tags.insert(key, value);
                Ok(self)
            }
            QueryTarget::Tsuids { .. } => Err(tsuids_unsupported("tags")),
        }
    }

    /// Removes a tag filter. Removing an absent key is not an error.
    pub fn remove_tag(&mut self, key: &str) -> ClientResult<&mut Self> {
        match &mut self.target {
            QueryTarget::Metric { tags, .. } => {
                tags.remove(key);
                Ok(self)
            }
            QueryTarget::Tsuids { .. } => Err(tsuids_unsupported("dtag")),
        }
    }

    /// The TSUID list, empty when unset. Fails on a metric query.
    pub fn tsuids(&self) -> ClientResult<Vec<String>> {
        match &self.target {
            QueryTarget::Tsuids { tsuids } => {
                Ok(tsuids.as_ref().map(TsuidList::to_vec).unwrap_or_default())
            }
            QueryTarget::Metric { .. } => Err(metric_unsupported()),
        }
    }

    /// Accepts a comma-delimited string or a sequence of TSUIDs.
    pub fn set_tsuids(&mut self, list: impl Into<TsuidList>) -> ClientResult<&mut Self> {
        match &mut self.target {
            QueryTarget::Tsuids { tsuids } => {
                *tsuids = Some(list.into());
                Ok(self)
            }
            QueryTarget::Metric { .. } => Err(metric_unsupported()),
        }
    }

    /// Checks that the query carries its metric name or TSUIDs.
    pub fn validate(&self) -> ClientResult<()> {
        let complete = match &self.target {
            QueryTarget::Metric { metric, .. } => metric.is_some(),
            QueryTarget::Tsuids { tsuids } => tsuids.as_ref().is_some_and(|t| !t.is_empty()),
        };
        if complete {
            Ok(())
        } else {
            Err(ClientError::invalid_query(
                "query must either have a set metric name or list of TSUIDs",
            ))
        }
    }

    fn metric_tags(&self, op: &str) -> ClientResult<&Tags> {
        match &self.target {
            QueryTarget::Metric { tags, .. } => Ok(tags),
            QueryTarget::Tsuids { .. } => Err(tsuids_unsupported(op)),
        }
    }
}

fn tsuids_unsupported(op: &str) -> ClientError {
    ClientError::unsupported(format!("{}() is not supported by TSUID queries", op))
}

fn metric_unsupported() -> ClientError {
    ClientError::unsupported("tsuids() is only supported by TSUID queries")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = QuerySpec::new_metric();
        assert_eq!(query.aggregator(), "avg");
        assert_eq!(query.downsample(), None);
        assert!(!query.rate());
        assert_eq!(query.rate_options(), RateOptions::default());
        assert_eq!(query.metric().unwrap(), None);
        assert!(query.tags().unwrap().is_empty());
        assert_eq!(query.kind(), "metric");
        assert_eq!(QuerySpec::new_tsuids().kind(), "tsuids");
    }

    #[test]
    fn test_builder_chain() {
        let mut query = QuerySpec::new_metric();
        query
            .set_metric("cpu.utilization")
            .unwrap()
            .set_aggregator("sum")
            .unwrap()
            .set_downsample("5m-avg")
            .set_rate(true)
            .set_tag("nid", "1234|5678")
            .unwrap();

        assert_eq!(query.metric().unwrap(), Some("cpu.utilization"));
        assert_eq!(query.aggregator(), "sum");
        assert_eq!(query.downsample(), Some("5m-avg"));
        assert!(query.rate());
        assert_eq!(query.tag("nid").unwrap(), Some("1234|5678"));
        assert_eq!(query.tag("missing").unwrap(), None);

        query.clear_downsample();
        assert_eq!(query.downsample(), None);
        query.set_downsample("");
        assert_eq!(query.downsample(), None);
    }

    #[test]
    fn test_rejects_empty_names() {
        let mut query = QuerySpec::new_metric();
        assert!(matches!(query.set_metric(""), Err(ClientError::InvalidArgument { .. })));
        assert!(matches!(query.set_aggregator(""), Err(ClientError::InvalidArgument { .. })));
        assert_eq!(query.aggregator(), "avg");
    }

    #[test]
    fn test_tags_copy_is_detached() {
        let mut query = QuerySpec::new_metric();
        query.set_tag("host", "a").unwrap();

        let mut copy = query.tags().unwrap();
        copy.insert("host".to_string(), "b".to_string());
        copy.insert("extra".to_string(), "x".to_string());

        assert_eq!(query.tag("host").unwrap(), Some("a"));
        assert_eq!(query.tag("extra").unwrap(), None);
    }

    #[test]
    fn test_remove_tag_is_idempotent() {
        let mut query = QuerySpec::new_metric();
        query.set_tag("host", "a").unwrap();
        query.remove_tag("host").unwrap();
        query.remove_tag("host").unwrap();
        assert!(query.tags().unwrap().is_empty());
    }

    #[test]
    fn test_tsuid_query_rejects_tag_operations() {
        let mut query = QuerySpec::new_tsuids();
        assert!(matches!(
            query.set_tag("x", "y"),
            Err(ClientError::UnsupportedOperation { .. })
        ));
        assert!(matches!(query.tags(), Err(ClientError::UnsupportedOperation { .. })));
        assert!(matches!(query.tag("x"), Err(ClientError::UnsupportedOperation { .. })));
        assert!(matches!(
            query.remove_tag("x"),
            Err(ClientError::UnsupportedOperation { .. })
        ));
        assert!(matches!(query.metric(), Err(ClientError::UnsupportedOperation { .. })));
    }

    #[test]
    fn test_metric_query_rejects_tsuids() {
        let mut query = QuerySpec::new_metric();
        assert!(matches!(query.tsuids(), Err(ClientError::UnsupportedOperation { .. })));
        assert!(matches!(
            query.set_tsuids("000001000001000001"),
            Err(ClientError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_tsuids_round_trip() {
        let ids = vec!["000001000001000001".to_string(), "000001000001000002".to_string()];

        let mut from_list = QuerySpec::new_tsuids();
        from_list.set_tsuids(ids.clone()).unwrap();
        assert_eq!(from_list.tsuids().unwrap(), ids);

        let mut from_str = QuerySpec::new_tsuids();
        from_str.set_tsuids("000001000001000001,000001000001000002").unwrap();
        assert_eq!(from_str.tsuids().unwrap(), ids);

        let again = from_str.tsuids().unwrap();
        from_str.set_tsuids(again).unwrap();
        assert_eq!(from_str.tsuids().unwrap(), ids);
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            QuerySpec::new_metric().validate(),
            Err(ClientError::InvalidQuery { .. })
        ));
        assert!(matches!(
            QuerySpec::new_tsuids().validate(),
            Err(ClientError::InvalidQuery { .. })
        ));

        let mut empty_ids = QuerySpec::new_tsuids();
        empty_ids.set_tsuids(Vec::<String>::new()).unwrap();
        assert!(empty_ids.validate().is_err());

        let mut query = QuerySpec::new_metric();
        query.set_metric("mem.free").unwrap();
        assert!(query.validate().is_ok());
    }
}
