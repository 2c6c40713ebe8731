//! Bedrock runtime client over HTTP
//!
//! Credentials are resolved by the caller and handed over as a bearer
//! token. The HTTP client is built on first use, so constructing an
//! invoker never touches the network or validates credentials.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::backend::traits::ImageInvoker;
use crate::error::{AppError, Result};

/// Connection settings for the Bedrock runtime and control plane
#[derive(Debug, Clone, Default)]
pub struct BedrockConfig {
    pub region: String,
    /// Runtime endpoint override (defaults to the regional endpoint)
    pub endpoint_url: Option<String>,
    /// Control plane endpoint override, used by the credential probe
    pub control_endpoint_url: Option<String>,
    pub bearer_token: Option<String>,
    /// Client-wide timeout; no timeout when unset
    pub timeout_ms: Option<u64>,
}

impl BedrockConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    fn runtime_base(&self) -> String {
        self.endpoint_url
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", self.region))
    }

    fn control_base(&self) -> String {
        self.control_endpoint_url
            .clone()
            .unwrap_or_else(|| format!("https://bedrock.{}.amazonaws.com", self.region))
    }
}

/// Caller-owned Bedrock handle shared by every variant pipeline
pub struct BedrockInvoker {
    config: BedrockConfig,
    client: OnceCell<Client>,
}

#[derive(Debug, Deserialize)]
struct FoundationModelList {
    #[serde(default, rename = "modelSummaries")]
    model_summaries: Vec<FoundationModelSummary>,
}

#[derive(Debug, Deserialize)]
struct FoundationModelSummary {
    #[serde(rename = "modelId")]
    model_id: String,
}

impl BedrockInvoker {
    /// Create an invoker; no connection is made until the first call
    pub fn new(config: BedrockConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    /// Build the HTTP client once, failing if no credential was supplied
    async fn ensure_client(&self) -> Result<&Client> {
        self.client
            .get_or_try_init(|| async {
                let token = self.config.bearer_token.as_deref().ok_or_else(|| {
                    AppError::Credential("no Bedrock bearer token configured".to_string())
                })?;

                let mut headers = HeaderMap::new();
                let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| AppError::Credential(format!("invalid bearer token: {}", e)))?;
                auth.set_sensitive(true);
                headers.insert(AUTHORIZATION, auth);
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

                let mut builder = Client::builder().default_headers(headers);
                if let Some(timeout_ms) = self.config.timeout_ms {
                    builder = builder.timeout(Duration::from_millis(timeout_ms));
                }
                let client = builder.build().map_err(|e| {
                    AppError::Backend(format!("failed to create HTTP client: {}", e))
                })?;

                debug!(region = %self.config.region, "Initialized Bedrock client");
                Ok::<Client, AppError>(client)
            })
            .await
    }

    fn invoke_url(&self, model_id: &str) -> Result<Url> {
        let mut url = parse_base(&self.config.runtime_base())?;
        url.path_segments_mut()
            .map_err(|_| AppError::Validation("endpoint URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["model", model_id, "invoke"]);
        Ok(url)
    }

    /// Lightweight capability probe: list models that produce images
    pub async fn list_image_models(&self) -> Result<Vec<String>> {
        let client = self.ensure_client().await?;
        let mut url = parse_base(&self.config.control_base())?;
        url.path_segments_mut()
            .map_err(|_| AppError::Validation("endpoint URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("foundation-models");
        url.query_pairs_mut().append_pair("byOutputModality", "IMAGE");

        let response = client.get(url).send().await.map_err(transport_error)?;
        let body = read_success_body(response).await?;
        let list: FoundationModelList = serde_json::from_str(&body)
            .map_err(|e| AppError::Decode(format!("invalid model list: {}", e)))?;

        Ok(list.model_summaries.into_iter().map(|m| m.model_id).collect())
    }
}

#[async_trait]
impl ImageInvoker for BedrockInvoker {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn invoke(
        &self,
        model_id: &str,
        body: &Value,
        deadline: Option<Duration>,
    ) -> Result<Value> {
        let client = self.ensure_client().await?;
        let url = self.invoke_url(model_id)?;

        debug!(model_id = %model_id, url = %url, "Invoking model");

        let mut request = client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        if let Some(deadline) = deadline {
            request = request.timeout(deadline);
        }

        let response = request.send().await.map_err(transport_error)?;
        let text = read_success_body(response).await?;

        serde_json::from_str(&text)
            .map_err(|e| AppError::Decode(format!("response is not valid JSON: {}", e)))
    }
}

fn parse_base(base: &str) -> Result<Url> {
    Url::parse(base)
        .map_err(|e| AppError::Validation(format!("invalid endpoint URL '{}': {}", base, e)))
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Backend(format!("request timed out: {}", e))
    } else {
        AppError::Backend(format!("request failed: {}", e))
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::Backend(format!("failed to read response body: {}", e)))?;

    if status.is_success() {
        return Ok(body);
    }

    warn!(status = %status, "Bedrock call failed");
    Err(classify_http_error(status, &body))
}

/// Map an HTTP failure to the credential or backend error
pub fn classify_http_error(status: StatusCode, body: &str) -> AppError {
    let message = extract_message(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.trim().to_string()
        }
    });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Credential(message),
        StatusCode::TOO_MANY_REQUESTS => AppError::Backend(format!("throttled: {}", message)),
        _ => AppError::Backend(format!("{}: {}", status.as_u16(), message)),
    }
}

fn extract_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("message")
        .or_else(|| json.get("Message"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
