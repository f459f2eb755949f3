//! The secured server-side proxy transport. The proxy holds the real
//! provider API keys; the client authenticates with a public, non-secret
//! key and names the provider it wants in the request body.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use super::api_client::{ApiClient, AuthMethod};
use super::base::{Provider, ProviderKind, ProviderResult, Usage};
use super::errors::{map_http_error, ProviderError};
use super::google::GOOGLE_DEFAULT_MODEL;
use super::openai::{OPENAI_DEFAULT_MODEL, OPENAI_VISION_MODEL};
use crate::context::{Context, QueryType};

pub const PROXY_PROVIDER_NAME: &str = "proxy";

/// Process-lifetime handle on the proxy endpoint. Per-request provider and
/// query-type choices are bound via [`ProxyTransport::provider`].
#[derive(Clone)]
pub struct ProxyTransport {
    api_client: ApiClient,
}

impl ProxyTransport {
    pub fn from_env() -> Result<Option<Self>> {
        let config = crate::config::Config::global();
        let url: String = match config.get_param("BRANDMIND_PROXY_URL") {
            Ok(url) => url,
            Err(_) => return Ok(None),
        };
        let token: String = config.get_param("BRANDMIND_PROXY_TOKEN")?;
        Ok(Some(Self::new(ApiClient::new(
            url,
            AuthMethod::BearerToken(token),
        )?)))
    }

    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// Bind this transport to one provider choice for one request.
    pub fn provider(&self, kind: ProviderKind, query_type: QueryType) -> ProxyProvider {
        ProxyProvider {
            api_client: self.api_client.clone(),
            kind,
            query_type,
        }
    }
}

pub struct ProxyProvider {
    api_client: ApiClient,
    kind: ProviderKind,
    query_type: QueryType,
}

impl ProxyProvider {
    fn model_for(&self, context: &Context) -> &'static str {
        match self.kind {
            ProviderKind::OpenAi if context.has_inline_images() => OPENAI_VISION_MODEL,
            ProviderKind::OpenAi => OPENAI_DEFAULT_MODEL,
            ProviderKind::Google => GOOGLE_DEFAULT_MODEL,
        }
    }
}

#[async_trait]
impl Provider for ProxyProvider {
    fn name(&self) -> &str {
        PROXY_PROVIDER_NAME
    }

    async fn generate(
        &self,
        prompt: &str,
        context: &Context,
    ) -> Result<ProviderResult, ProviderError> {
        let model = self.model_for(context);
        let payload = json!({
            "message": prompt,
            "provider": self.kind.as_str(),
            "queryType": self.query_type.as_str(),
            "model": model,
            "context": context,
        });

        let response = self.api_client.api_post("", &payload).await?;
        if !response.status.is_success() {
            return Err(map_http_error(response.status, response.payload.as_ref()));
        }

        let body = response.payload.ok_or_else(|| {
            ProviderError::MalformedResponse("proxy response body was not JSON".to_string())
        })?;

        // An error field in a 2xx body still counts as a transport failure.
        if let Some(error) = body.get("error").and_then(|e| e.as_str()) {
            return Err(ProviderError::RequestFailed(format!(
                "proxy reported: {}",
                error
            )));
        }

        let text = body
            .get("response")
            .or_else(|| body.get("message"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "proxy response missing both `response` and `message`".to_string(),
                )
            })?;

        Ok(ProviderResult::new(text, model, Usage::default()))
    }
}
