pub mod request;
pub mod url;

pub use request::{HttpGet, ReqwestTransport};
pub use url::UrlTemplate;

use crate::error::{ClientError, ClientResult};
use crate::query::QuerySpec;
use crate::settings::Settings;
use crate::time::{RawTime, TimeValue};
use serde_json::Value;
use std::str::FromStr;
use tracing::info;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4242;

/// Which annotations the server includes in query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Annotations {
    #[default]
    None,
    Local,
    All,
}

impl Annotations {
    pub const ALLOWED: [&'static str; 3] = ["none", "local", "all"];

    /// `(no_annotations, global_annotations)`
    pub fn flags(self) -> (bool, bool) {
        match self {
            Annotations::None => (true, false),
            Annotations::Local => (false, false),
            Annotations::All => (false, true),
        }
    }
}

impl FromStr for Annotations {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Annotations::None),
            "local" => Ok(Annotations::Local),
            "all" => Ok(Annotations::All),
            _ => Err(ClientError::invalid_argument(format!(
                "annotations must be one of {:?}, got '{}'",
                Annotations::ALLOWED,
                s
            ))),
        }
    }
}

/// Everything that goes into one query URL.
///
/// Queries are owned by the config. Changes made through [`queries_mut`]
/// show up in every URL built afterwards.
///
/// [`queries_mut`]: ClientConfig::queries_mut
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    host: String,
    port: u16,
    ms_resolution: bool,
    arrays_output: bool,
    tsuids_output: bool,
    annotations: Annotations,
    start: Option<TimeValue>,
    end: Option<TimeValue>,
    queries: Vec<QuerySpec>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ms_resolution: true,
            arrays_output: true,
            tsuids_output: false,
            annotations: Annotations::None,
            start: None,
            end: None,
            queries: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: impl Into<String>) -> &mut Self {
        self.host = host.into();
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    pub fn ms_resolution(&self) -> bool {
        self.ms_resolution
    }

    pub fn set_ms_resolution(&mut self, flag: bool) -> &mut Self {
        self.ms_resolution = flag;
        self
    }

    pub fn arrays_output(&self) -> bool {
        self.arrays_output
    }

    pub fn set_arrays_output(&mut self, flag: bool) -> &mut Self {
        self.arrays_output = flag;
        self
    }

    pub fn tsuids_output(&self) -> bool {
        self.tsuids_output
    }

    pub fn set_tsuids_output(&mut self, flag: bool) -> &mut Self {
        self.tsuids_output = flag;
        self
    }

    pub fn annotations(&self) -> Annotations {
        self.annotations
    }

    /// Accepts `none`, `local` or `all`, in any case.
    pub fn set_annotations(&mut self, mode: &str) -> ClientResult<&mut Self> {
        self.annotations = mode.parse()?;
        Ok(self)
    }

    pub fn set_annotation_mode(&mut self, mode: Annotations) -> &mut Self {
        self.annotations = mode;
        self
    }

    pub fn start(&self) -> Option<&TimeValue> {
        self.start.as_ref()
    }

    pub fn set_start(&mut self, value: impl Into<RawTime>) -> ClientResult<&mut Self> {
        self.start = Some(TimeValue::parse(value)?);
        Ok(self)
    }

    /// `None` means the query runs up to the time of the read.
    pub fn end(&self) -> Option<&TimeValue> {
        self.end.as_ref()
    }

    pub fn set_end(&mut self, value: impl Into<RawTime>) -> ClientResult<&mut Self> {
        self.end = Some(TimeValue::parse(value)?);
        Ok(self)
    }

    pub fn clear_end(&mut self) -> &mut Self {
        self.end = None;
        self
    }

    pub fn queries(&self) -> &[QuerySpec] {
        &self.queries
    }

    pub fn queries_mut(&mut self) -> &mut Vec<QuerySpec> {
        &mut self.queries
    }

    /// Replaces all queries. At least one query is required.
    pub fn set_queries(&mut self, queries: impl IntoIterator<Item = QuerySpec>) -> ClientResult<&mut Self> {
        let queries: Vec<QuerySpec> = queries.into_iter().collect();
        if queries.is_empty() {
            return Err(ClientError::invalid_argument("at least one query must be provided"));
        }
        self.queries = queries;
        Ok(self)
    }

    pub fn push_query(&mut self, query: QuerySpec) -> &mut Self {
        self.queries.push(query);
        self
    }

    /// The full query URL for the current configuration.
    pub fn url(&self) -> ClientResult<String> {
        url::serialize(self)
    }

    /// A reusable URL template; see [`UrlTemplate::instantiate`].
    pub fn template(&self) -> ClientResult<UrlTemplate> {
        UrlTemplate::compile(self)
    }
}

/// Query client: a [`ClientConfig`] plus an HTTP transport.
pub struct Client<T: HttpGet = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl Client<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Self::from_settings(&Settings::default(), config)
    }

    /// Uses the timeout from `settings` for the HTTP client.
    pub fn from_settings(settings: &Settings, config: ClientConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(settings.timeout())?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: HttpGet> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// Runs the configured query.
    pub async fn get(&self) -> ClientResult<Value> {
        let url = self.config.url()?;
        info!(
            "Running {} queries against {}:{}",
            self.config.queries().len(),
            self.config.host(),
            self.config.port()
        );
        request::fetch(&self.transport, &url).await
    }

    /// Runs the configured query through a precompiled template, using the
    /// config's current time range.
    pub async fn get_with(&self, template: &UrlTemplate) -> ClientResult<Value> {
        let url = template.instantiate_for(&self.config)?;
        request::fetch(&self.transport, &url).await
    }

    /// Aggregation functions the server supports.
    pub async fn aggregators(&self) -> ClientResult<Value> {
        self.fetch_endpoint("aggregators").await
    }

    /// Up to `max` stored metric names.
    pub async fn suggest_metrics(&self, max: usize) -> ClientResult<Value> {
        self.fetch_endpoint(&format!("suggest?type=metrics&max={}&q=", max)).await
    }

    /// The server's running configuration.
    pub async fn server_config(&self) -> ClientResult<Value> {
        self.fetch_endpoint("config").await
    }

    pub async fn version(&self) -> ClientResult<Value> {
        self.fetch_endpoint("version").await
    }

    /// Asks the server to purge its in-memory caches.
    pub async fn drop_caches(&self) -> ClientResult<Value> {
        self.fetch_endpoint("dropcaches").await
    }

    async fn fetch_endpoint(&self, path: &str) -> ClientResult<Value> {
        let url = url::endpoint(&self.config, path);
        request::fetch(&self.transport, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpGet for Recorder {
        async fn get(&self, url: &str) -> ClientResult<String> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(r#"{"ok":true}"#.to_string())
        }
    }

    fn metric_query(metric: &str) -> QuerySpec {
        let mut query = QuerySpec::new_metric();
        query.set_metric(metric).unwrap();
        query
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.port(), 4242);
        assert!(config.ms_resolution());
        assert!(config.arrays_output());
        assert!(!config.tsuids_output());
        assert_eq!(config.annotations(), Annotations::None);
        assert_eq!(config.start(), None);
        assert_eq!(config.end(), None);
        assert!(config.queries().is_empty());
    }

    #[test]
    fn test_annotations_parsing() {
        let mut config = ClientConfig::default();
        config.set_annotations("LOCAL").unwrap();
        assert_eq!(config.annotations(), Annotations::Local);
        config.set_annotations("all").unwrap();
        assert_eq!(config.annotations(), Annotations::All);

        let err = config.set_annotations("global").unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument { .. }));
        assert!(err.to_string().contains("local"));
        assert_eq!(config.annotations(), Annotations::All);
    }

    #[test]
    fn test_time_setters_validate() {
        let mut config = ClientConfig::default();
        assert!(matches!(config.set_start("yesterday"), Err(ClientError::InvalidTimeFormat(_))));
        assert!(matches!(config.set_start(45u64), Err(ClientError::InvalidTimeFormat(_))));
        assert!(matches!(config.set_end(f64::NAN), Err(ClientError::InvalidArgument { .. })));
        assert_eq!(config.start(), None);

        config.set_start("1h-ago").unwrap().set_end("2014/07/22 10:00").unwrap();
        assert_eq!(config.start(), Some(&TimeValue::Relative("1h-ago".into())));
        assert_eq!(config.end(), Some(&TimeValue::Absolute("2014/07/22 10:00".into())));

        config.clear_end();
        assert_eq!(config.end(), None);
    }

    #[test]
    fn test_set_queries_replaces_list() {
        let mut config = ClientConfig::default();
        config.set_queries(vec![metric_query("a"), metric_query("b")]).unwrap();
        config.set_queries(vec![metric_query("c")]).unwrap();
        assert_eq!(config.queries().len(), 1);
        assert_eq!(config.queries()[0].metric().unwrap(), Some("c"));

        assert!(matches!(
            config.set_queries(Vec::new()),
            Err(ClientError::InvalidArgument { .. })
        ));
        assert_eq!(config.queries().len(), 1);
    }

    #[test]
    fn test_query_edits_affect_later_urls() {
        let mut config = ClientConfig::default();
        config.set_start(1406003885818u64).unwrap();
        config.set_queries(vec![metric_query("cpu.utilization")]).unwrap();
        let before = config.url().unwrap();

        config.queries_mut()[0].set_tag("host", "web01").unwrap();
        let after = config.url().unwrap();

        assert_ne!(before, after);
        assert!(after.ends_with("m=avg:cpu.utilization{host=web01}"));
    }

    #[test]
    fn test_client_builds_endpoint_urls() {
        let mut config = ClientConfig::default();
        config.set_host("tsdb").set_port(4000);
        let client = Client::with_transport(config, Recorder::default());

        tokio_test::block_on(async {
            client.aggregators().await.unwrap();
            client.suggest_metrics(25).await.unwrap();
            client.server_config().await.unwrap();
            client.version().await.unwrap();
            assert_eq!(client.drop_caches().await.unwrap(), json!({"ok": true}));
        });

        let urls = client.transport.urls.lock().unwrap().clone();
        assert_eq!(
            urls,
            vec![
                "http://tsdb:4000/api/aggregators",
                "http://tsdb:4000/api/suggest?type=metrics&max=25&q=",
                "http://tsdb:4000/api/config",
                "http://tsdb:4000/api/version",
                "http://tsdb:4000/api/dropcaches",
            ]
        );
    }

    #[test]
    fn test_client_query_requires_start() {
        let mut config = ClientConfig::default();
        config.push_query(metric_query("a.b"));
        let client = Client::with_transport(config, Recorder::default());

        let err = tokio_test::block_on(client.get()).unwrap_err();
        assert!(matches!(err, ClientError::NotInitialized { .. }));
        assert!(client.transport.urls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_client_query_through_template() {
        let mut config = ClientConfig::default();
        config.set_start(1406003885818u64).unwrap();
        config.push_query(metric_query("a.b"));
        let mut client = Client::with_transport(config, Recorder::default());
        let template = client.config().template().unwrap();

        tokio_test::block_on(client.get_with(&template)).unwrap();
        client.config_mut().set_start(1406003897818u64).unwrap();
        tokio_test::block_on(client.get_with(&template)).unwrap();

        let urls = client.transport.urls.lock().unwrap().clone();
        assert!(urls[0].contains("start=1406003885818&m=avg:a.b"));
        assert!(urls[1].contains("start=1406003897818&m=avg:a.b"));
    }
}
