use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::api_client::{ApiClient, AuthMethod};
use super::base::{Provider, ProviderResult, Usage};
use super::errors::{map_http_error, ProviderError};
use super::formats::google::{create_request, get_usage, response_to_text};
use crate::context::Context;
use crate::prompt::PromptCache;

pub const GOOGLE_PROVIDER_NAME: &str = "google";
pub const GOOGLE_API_HOST: &str = "https://generativelanguage.googleapis.com";
/// Gemini models are multimodal across the board, so image attachments do
/// not force a model switch here.
pub const GOOGLE_DEFAULT_MODEL: &str = "gemini-2.5-flash";

const DEFAULT_TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: i32 = 2048;

pub struct GoogleProvider {
    api_client: ApiClient,
    model: String,
    prompts: Arc<PromptCache>,
}

impl GoogleProvider {
    pub fn from_env(prompts: Arc<PromptCache>) -> Result<Self> {
        let config = crate::config::Config::global();
        let api_key = config.get_secret("GOOGLE_API_KEY")?;
        let host: String = config
            .get_param("GOOGLE_HOST")
            .unwrap_or_else(|_| GOOGLE_API_HOST.to_string());
        let model: String = config
            .get_param("GOOGLE_MODEL")
            .unwrap_or_else(|_| GOOGLE_DEFAULT_MODEL.to_string());

        let auth = AuthMethod::ApiKey {
            header_name: "x-goog-api-key".to_string(),
            key: api_key,
        };
        let api_client = ApiClient::new(host, auth)?;
        Ok(Self::new(api_client, model, prompts))
    }

    pub fn new(api_client: ApiClient, model: impl Into<String>, prompts: Arc<PromptCache>) -> Self {
        Self {
            api_client,
            model: model.into(),
            prompts,
        }
    }
}

#[async_trait]
impl Provider for GoogleProvider {
    fn name(&self) -> &str {
        GOOGLE_PROVIDER_NAME
    }

    async fn generate(
        &self,
        prompt: &str,
        context: &Context,
    ) -> Result<ProviderResult, ProviderError> {
        let system_prompt = self.prompts.system_prompt(context);
        let payload = create_request(
            &system_prompt,
            prompt,
            context,
            DEFAULT_TEMPERATURE,
            MAX_OUTPUT_TOKENS,
        );

        let path = format!("v1beta/models/{}:generateContent", self.model);
        let response = self.api_client.api_post(&path, &payload).await?;
        if !response.status.is_success() {
            return Err(map_http_error(response.status, response.payload.as_ref()));
        }

        let body = response.payload.ok_or_else(|| {
            ProviderError::MalformedResponse("generateContent body was not JSON".to_string())
        })?;
        let text = response_to_text(&body)?;
        let usage = get_usage(&body).unwrap_or_else(|err| {
            debug!(error = %err, "no usage metadata in Gemini response");
            Usage::default()
        });

        Ok(ProviderResult::new(text, self.model.clone(), usage))
    }
}
