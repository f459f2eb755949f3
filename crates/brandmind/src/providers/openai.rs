use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::api_client::{ApiClient, AuthMethod};
use super::base::{Provider, ProviderResult, Usage};
use super::errors::{map_http_error, ProviderError};
use super::formats::openai::{create_request, get_usage, response_to_text};
use crate::context::Context;
use crate::prompt::PromptCache;

pub const OPENAI_PROVIDER_NAME: &str = "openai";
pub const OPENAI_API_HOST: &str = "https://api.openai.com";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Model variant used whenever the request carries inline image payloads.
pub const OPENAI_VISION_MODEL: &str = "gpt-4o";

const BASE_PATH: &str = "v1/chat/completions";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: i32 = 2048;

pub struct OpenAiProvider {
    api_client: ApiClient,
    model: String,
    prompts: Arc<PromptCache>,
}

impl OpenAiProvider {
    pub fn from_env(prompts: Arc<PromptCache>) -> Result<Self> {
        let config = crate::config::Config::global();
        let api_key = config.get_secret("OPENAI_API_KEY")?;
        let host: String = config
            .get_param("OPENAI_HOST")
            .unwrap_or_else(|_| OPENAI_API_HOST.to_string());
        let model: String = config
            .get_param("OPENAI_MODEL")
            .unwrap_or_else(|_| OPENAI_DEFAULT_MODEL.to_string());

        let api_client = ApiClient::new(host, AuthMethod::BearerToken(api_key))?;
        Ok(Self::new(api_client, model, prompts))
    }

    pub fn new(api_client: ApiClient, model: impl Into<String>, prompts: Arc<PromptCache>) -> Self {
        Self {
            api_client,
            model: model.into(),
            prompts,
        }
    }

    /// Text-only requests use the configured model; inline images force the
    /// vision-capable variant.
    pub fn model_for(&self, context: &Context) -> &str {
        if context.has_inline_images() {
            OPENAI_VISION_MODEL
        } else {
            &self.model
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        OPENAI_PROVIDER_NAME
    }

    async fn generate(
        &self,
        prompt: &str,
        context: &Context,
    ) -> Result<ProviderResult, ProviderError> {
        let model = self.model_for(context);
        let system_prompt = self.prompts.system_prompt(context);
        let payload = create_request(
            model,
            &system_prompt,
            prompt,
            context,
            DEFAULT_TEMPERATURE,
            MAX_OUTPUT_TOKENS,
        );

        let response = self.api_client.api_post(BASE_PATH, &payload).await?;
        if !response.status.is_success() {
            return Err(map_http_error(response.status, response.payload.as_ref()));
        }

        let body = response.payload.ok_or_else(|| {
            ProviderError::MalformedResponse("chat completion body was not JSON".to_string())
        })?;
        let text = response_to_text(&body)?;
        let usage = get_usage(&body).unwrap_or_else(|err| {
            debug!(error = %err, "no usage data in OpenAI response");
            Usage::default()
        });

        Ok(ProviderResult::new(text, model, usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FileAttachment;

    fn provider() -> OpenAiProvider {
        let client = ApiClient::new(OPENAI_API_HOST, AuthMethod::BearerToken("test".into()))
            .expect("client");
        OpenAiProvider::new(client, OPENAI_DEFAULT_MODEL, Arc::new(PromptCache::new()))
    }

    #[test]
    fn image_attachment_upgrades_the_model() {
        let context = Context::new().with_attachment(FileAttachment {
            name: "logo.png".into(),
            mime_type: "image/png".into(),
            size_bytes: 3,
            data: Some(vec![1, 2, 3]),
        });
        assert_eq!(provider().model_for(&context), OPENAI_VISION_MODEL);
    }

    #[test]
    fn text_only_request_keeps_the_default_model() {
        assert_eq!(provider().model_for(&Context::new()), OPENAI_DEFAULT_MODEL);
    }

    #[test]
    fn metadata_only_attachment_does_not_upgrade() {
        let context = Context::new().with_attachment(FileAttachment {
            name: "brief.pdf".into(),
            mime_type: "application/pdf".into(),
            size_bytes: 2048,
            data: None,
        });
        assert_eq!(provider().model_for(&context), OPENAI_DEFAULT_MODEL);
    }
}
