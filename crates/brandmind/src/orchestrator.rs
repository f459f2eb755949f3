//! The fallback orchestrator behind `process_query`.
//!
//! Transport fallback is an explicit state machine: proxy first, then the
//! selected provider direct, then the other provider. Stages run strictly
//! sequentially; there is no fan-out.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::consultation::{ConsultationLevel, ConsultationResult};
use crate::context::{Context, QueryType};
use crate::formatting::format_response;
use crate::prompt::PromptCache;
use crate::providers::base::{Provider, ProviderKind, ProviderResult};
use crate::providers::errors::ProviderError;
use crate::providers::factory;
use crate::providers::proxy::ProxyTransport;
use crate::providers::retry::{execute_with_retry, DEFAULT_MAX_ATTEMPTS};
use crate::selector::select_provider_with_default;
use crate::validation::{validate, ValidationResult};

/// Quality score at or above which a response ships as-is.
pub const QUALITY_THRESHOLD: u8 = 80;

/// Top-level generate-validate passes before settling for enhancement.
pub const MAX_VALIDATION_PASSES: usize = 3;

/// Transport states for one generation attempt, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportStage {
    PrimaryTransport,
    DirectProvider,
    SecondaryProvider,
    Exhausted,
}

impl TransportStage {
    fn first(has_proxy: bool) -> Self {
        if has_proxy {
            TransportStage::PrimaryTransport
        } else {
            TransportStage::DirectProvider
        }
    }

    fn next(self) -> Self {
        match self {
            TransportStage::PrimaryTransport => TransportStage::DirectProvider,
            TransportStage::DirectProvider => TransportStage::SecondaryProvider,
            TransportStage::SecondaryProvider | TransportStage::Exhausted => {
                TransportStage::Exhausted
            }
        }
    }
}

/// Outcome states once a generation attempt has text in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewOutcome {
    FormatFinal,
    Retry,
    EnhanceAndFinalize,
}

fn review(score: u8, pass: usize, max_passes: usize) -> ReviewOutcome {
    if score >= QUALITY_THRESHOLD {
        ReviewOutcome::FormatFinal
    } else if pass < max_passes {
        ReviewOutcome::Retry
    } else {
        ReviewOutcome::EnhanceAndFinalize
    }
}

pub struct ConsultationEngine {
    proxy: Option<ProxyTransport>,
    openai: Box<dyn Provider>,
    google: Box<dyn Provider>,
    prompts: Arc<PromptCache>,
    default_provider: ProviderKind,
    max_attempts: usize,
}

impl ConsultationEngine {
    /// Wire everything from environment configuration. The proxy transport
    /// is optional; without it the state machine starts at the direct
    /// provider.
    pub fn from_env() -> Result<Self> {
        let config = crate::config::Config::global();
        let prompts = Arc::new(PromptCache::new());
        let default_provider = config
            .get_param::<String>("BRANDMIND_DEFAULT_PROVIDER")
            .ok()
            .and_then(|name| name.parse().ok())
            .unwrap_or(ProviderKind::OpenAi);

        Ok(Self {
            proxy: ProxyTransport::from_env()?,
            openai: factory::create(ProviderKind::OpenAi, prompts.clone())?,
            google: factory::create(ProviderKind::Google, prompts.clone())?,
            prompts,
            default_provider,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    pub fn new(
        proxy: Option<ProxyTransport>,
        openai: Box<dyn Provider>,
        google: Box<dyn Provider>,
    ) -> Self {
        Self {
            proxy,
            openai,
            google,
            prompts: Arc::new(PromptCache::new()),
            default_provider: ProviderKind::OpenAi,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn prompts(&self) -> Arc<PromptCache> {
        self.prompts.clone()
    }

    fn direct(&self, kind: ProviderKind) -> &dyn Provider {
        match kind {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::Google => self.google.as_ref(),
        }
    }

    /// The public surface of the core. Always resolves to a well-formed
    /// [`ConsultationResult`]; every internal failure is converted to the
    /// terminal unavailability result rather than propagated.
    pub async fn process_query(
        &self,
        query: &str,
        context: &Context,
        query_type: QueryType,
    ) -> ConsultationResult {
        let primary = select_provider_with_default(query, self.default_provider);
        debug!(provider = primary.as_str(), query_type = query_type.as_str(), "provider selected");

        let mut prompt = query.to_string();
        for pass in 1..=MAX_VALIDATION_PASSES {
            let generated = match self
                .generate_with_fallback(&prompt, context, query_type, primary)
                .await
            {
                Ok(result) => result,
                Err(err) => {
                    error!(error = %err, "all transports exhausted");
                    return ConsultationResult::unavailable();
                }
            };

            let validation = validate(&generated.text);
            debug!(
                pass,
                score = validation.score,
                issues = validation.issues.len(),
                "response scored"
            );

            match review(validation.score, pass, MAX_VALIDATION_PASSES) {
                ReviewOutcome::FormatFinal => {
                    info!(
                        model = %generated.model,
                        score = validation.score,
                        "consultation ready at executive level"
                    );
                    return self.finalize(generated, validation, ConsultationLevel::Executive);
                }
                ReviewOutcome::Retry => {
                    warn!(pass, score = validation.score, "below threshold, regenerating");
                    prompt = augment_prompt(query, &validation);
                }
                ReviewOutcome::EnhanceAndFinalize => {
                    warn!(
                        score = validation.score,
                        "validation passes exhausted, shipping enhanced response"
                    );
                    return self.finalize(generated, validation, ConsultationLevel::Enhanced);
                }
            }
        }

        // The loop always returns on the final pass.
        ConsultationResult::unavailable()
    }

    /// One trip through the transport stages. Returns the first successful
    /// result; on total failure, the last recorded error.
    async fn generate_with_fallback(
        &self,
        prompt: &str,
        context: &Context,
        query_type: QueryType,
        primary: ProviderKind,
    ) -> Result<ProviderResult, ProviderError> {
        let mut stage = TransportStage::first(self.proxy.is_some());
        let mut last_error =
            ProviderError::ExecutionError("no transport was attempted".to_string());

        while stage != TransportStage::Exhausted {
            let outcome = match stage {
                TransportStage::PrimaryTransport => match &self.proxy {
                    // The proxy gets a single attempt, no retry loop.
                    Some(proxy) => {
                        proxy
                            .provider(primary, query_type)
                            .generate(prompt, context)
                            .await
                    }
                    None => Err(ProviderError::ExecutionError(
                        "no proxy transport configured".to_string(),
                    )),
                },
                TransportStage::DirectProvider => {
                    let provider = self.direct(primary);
                    execute_with_retry(|| provider.generate(prompt, context), self.max_attempts)
                        .await
                }
                TransportStage::SecondaryProvider => {
                    let provider = self.direct(primary.other());
                    execute_with_retry(|| provider.generate(prompt, context), self.max_attempts)
                        .await
                }
                TransportStage::Exhausted => break,
            };

            match outcome {
                Ok(result) => return Ok(result),
                Err(err) => {
                    warn!(stage = ?stage, error = %err, "transport failed, falling back");
                    last_error = err;
                    stage = stage.next();
                }
            }
        }

        Err(last_error)
    }

    fn finalize(
        &self,
        generated: ProviderResult,
        validation: ValidationResult,
        level: ConsultationLevel,
    ) -> ConsultationResult {
        let content = format_response(&generated.text);
        ConsultationResult {
            content,
            success: true,
            timestamp: Utc::now(),
            quality_score: Some(validation.score),
            validation_passed: Some(validation.is_valid),
            enhancement_applied: Some(level == ConsultationLevel::Enhanced),
            level: Some(level),
            model: Some(generated.model),
            error: None,
        }
    }
}

/// Regeneration prompt for the next validation pass: the original query plus
/// the reviewer's notes from the pass that just failed.
fn augment_prompt(query: &str, validation: &ValidationResult) -> String {
    let mut notes = String::new();
    for (issue, suggestion) in validation.issues.iter().zip(validation.suggestions.iter()) {
        notes.push_str(&format!("- {}: {}\n", issue, suggestion));
    }
    format!(
        "{}\n\nYour previous answer was reviewed and found lacking. Address these notes:\n{}\
         Respond as a formal consulting deliverable in markdown, with a title, \
         `##` sections and bulleted recommendations.",
        query, notes
    )
}
