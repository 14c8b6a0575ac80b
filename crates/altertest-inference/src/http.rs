//! HTTP inference service: `POST { "input": ... }` → `{ "output": ... }`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use altertest_core::inference::DEFAULT_INFERENCE_TIMEOUT;
use altertest_core::traits::InferenceService;

use crate::error::InferenceError;

/// Client for a single external inference endpoint.
pub struct HttpInferenceService {
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpInferenceService {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout,
            client,
        })
    }

    /// Service with the default 45s timeout and no credentials.
    pub fn with_endpoint(endpoint: &str) -> anyhow::Result<Self> {
        Self::new(endpoint, None, DEFAULT_INFERENCE_TIMEOUT)
    }
}

#[derive(Serialize)]
struct InferRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct InferResponse {
    output: Option<String>,
}

#[async_trait]
impl InferenceService for HttpInferenceService {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, input), fields(endpoint = %self.endpoint, input_len = input.len()))]
    async fn infer(&self, input: &str) -> anyhow::Result<String> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InferRequest { input });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout(self.timeout.as_secs())
            } else if e.is_connect() {
                InferenceError::Network(format!(
                    "inference service not reachable at {}",
                    self.endpoint
                ))
            } else {
                InferenceError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message: body,
            }
            .into());
        }

        let body: InferResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout(self.timeout.as_secs())
            } else {
                InferenceError::MalformedResponse(format!("failed to parse response: {e}"))
            }
        })?;

        body.output
            .ok_or_else(|| InferenceError::MalformedResponse("missing `output` field".into()).into())
    }
}
