use std::sync::Arc;

use anyhow::Result;

use super::base::{Provider, ProviderKind};
use super::google::GoogleProvider;
use super::openai::OpenAiProvider;
use crate::prompt::PromptCache;

/// Build a direct adapter from environment configuration.
pub fn create(kind: ProviderKind, prompts: Arc<PromptCache>) -> Result<Box<dyn Provider>> {
    match kind {
        ProviderKind::OpenAi => Ok(Box::new(OpenAiProvider::from_env(prompts)?)),
        ProviderKind::Google => Ok(Box::new(GoogleProvider::from_env(prompts)?)),
    }
}
