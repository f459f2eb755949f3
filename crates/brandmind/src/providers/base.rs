use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::ProviderError;
use crate::context::Context;

/// Conversation turns beyond this bound are dropped from provider payloads,
/// oldest first.
pub const MAX_HISTORY_TURNS: usize = 6;

/// The two upstream providers the core can route to. OpenAI is the
/// creative/strategic default; Google handles analytical-leaning queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Google,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Google => "google",
        }
    }

    /// The fallback partner once this provider is exhausted.
    pub fn other(&self) -> Self {
        match self {
            ProviderKind::OpenAi => ProviderKind::Google,
            ProviderKind::Google => ProviderKind::OpenAi,
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ProviderKind::OpenAi),
            "google" => Ok(ProviderKind::Google),
            other => Err(anyhow::anyhow!("unknown provider: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Normalized output of one successful adapter invocation. Failures travel
/// as [`ProviderError`] instead; exactly one of the two arms is ever
/// meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResult {
    pub text: String,
    pub model: String,
    pub usage: Usage,
}

impl ProviderResult {
    pub fn new(text: impl Into<String>, model: impl Into<String>, usage: Usage) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            usage,
        }
    }
}

/// Contract shared by the proxy-backed and direct adapters: one normalized
/// request in, one normalized response (or error) out. Exactly one outbound
/// network call per invocation; retry policy lives in the executor, not
/// here.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, context: &Context)
        -> Result<ProviderResult, ProviderError>;
}
