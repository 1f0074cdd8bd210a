//! HTTP GET transport and response classification.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Performs a GET and hands back the raw response body.
///
/// Implementations report transport failures as
/// [`ClientError::UpstreamUnreachable`]; decoding the body is left to
/// [`classify_body`].
#[async_trait]
pub trait HttpGet: Send + Sync {
    async fn get(&self, url: &str) -> ClientResult<String>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::UpstreamUnreachable(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpGet for ReqwestTransport {
    async fn get(&self, url: &str) -> ClientResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::UpstreamUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("GET {} returned status {}", url, status);
        }

        response
            .text()
            .await
            .map_err(|e| ClientError::UpstreamUnreachable(e.to_string()))
    }
}

/// Decodes a response body: empty → `EmptyResponse`, not JSON →
/// `MalformedResponse`, `[]` → `NoData`.
pub fn classify_body(body: &str) -> ClientResult<Value> {
    if body.is_empty() {
        return Err(ClientError::EmptyResponse);
    }
    let data: Value =
        serde_json::from_str(body).map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
    if matches!(&data, Value::Array(items) if items.is_empty()) {
        return Err(ClientError::NoData);
    }
    Ok(data)
}

/// GETs `url` through `transport` and classifies the response.
pub async fn fetch<T: HttpGet + ?Sized>(transport: &T, url: &str) -> ClientResult<Value> {
    let request_id = uuid::Uuid::new_v4();
    debug!("GET {} ({})", url, request_id);

    let result = match transport.get(url).await {
        Ok(body) => classify_body(&body),
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        warn!("Request {} failed: {}", request_id, e);
    } else {
        debug!("Request {} completed", request_id);
    }
    result
}
