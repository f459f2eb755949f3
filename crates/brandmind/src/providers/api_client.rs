use std::fmt;
use std::time::Duration;

use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Default bound on any single upstream HTTP exchange. The advisory
/// per-attempt race in the retry executor is tighter; this is the hard stop
/// for calls the executor has already abandoned.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub enum AuthMethod {
    BearerToken(String),
    ApiKey { header_name: String, key: String },
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::BearerToken(_) => f.debug_tuple("BearerToken").field(&"[hidden]").finish(),
            AuthMethod::ApiKey { header_name, .. } => f
                .debug_struct("ApiKey")
                .field("header_name", header_name)
                .field("key", &"[hidden]")
                .finish(),
        }
    }
}

pub struct ApiResponse {
    pub status: StatusCode,
    pub payload: Option<Value>,
}

impl ApiResponse {
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let payload = response.json().await.ok();
        Self { status, payload }
    }
}

/// Thin wrapper over reqwest: a host, an auth method and default headers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    host: String,
    auth: AuthMethod,
    default_headers: HeaderMap,
}

impl ApiClient {
    pub fn new(host: impl Into<String>, auth: AuthMethod) -> Result<Self> {
        Self::with_timeout(host, auth, DEFAULT_CLIENT_TIMEOUT)
    }

    pub fn with_timeout(
        host: impl Into<String>,
        auth: AuthMethod,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            host: host.into(),
            auth,
            default_headers: HeaderMap::new(),
        })
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(key.as_bytes())?;
        let header_value = HeaderValue::from_str(value)?;
        self.default_headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn build_url(&self, path: &str) -> Result<url::Url> {
        let mut base_url =
            url::Url::parse(&self.host).map_err(|e| anyhow::anyhow!("invalid base URL: {}", e))?;

        // An empty path means the host is already the full endpoint.
        if path.is_empty() {
            return Ok(base_url);
        }

        // Url::join treats a base without a trailing slash as a file and
        // replaces its last segment; normalize before joining.
        let base_path = base_url.path();
        if !base_path.is_empty() && base_path != "/" && !base_path.ends_with('/') {
            base_url.set_path(&format!("{}/", base_path));
        }

        base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| anyhow::anyhow!("failed to construct URL: {}", e))
    }

    pub async fn api_post(&self, path: &str, payload: &Value) -> Result<ApiResponse> {
        let url = self.build_url(path)?;
        let mut request = self
            .client
            .post(url)
            .headers(self.default_headers.clone())
            .json(payload);

        request = match &self.auth {
            AuthMethod::BearerToken(token) => request.bearer_auth(token),
            AuthMethod::ApiKey { header_name, key } => {
                request.header(header_name.as_str(), key.as_str())
            }
        };

        let response = request.send().await?;
        Ok(ApiResponse::from_response(response).await)
    }
}
