//! The result object every `process_query` call resolves to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown to end users when every transport and both providers have failed.
/// Deliberately generic; upstream error detail stays in the logs.
pub const UNAVAILABLE_MESSAGE: &str = "Our consultation service is temporarily unavailable. \
    Please try again in a few moments.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationLevel {
    /// Passed validation at or above the quality threshold on some pass.
    Executive,
    /// Exhausted the validation passes; best effort, formatter applied.
    Enhanced,
    /// Terminal failure; content is the fixed unavailability message.
    Error,
}

/// Final annotated answer. Immutable after construction; the core keeps no
/// copy, so history persistence is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationResult {
    pub content: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhancement_applied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<ConsultationLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fixed error annotation on terminal results. Upstream error detail is
/// logged, never surfaced here.
pub const UNAVAILABLE_ERROR: &str = "All consultation transports are currently unreachable.";

impl ConsultationResult {
    pub fn unavailable() -> Self {
        Self {
            content: UNAVAILABLE_MESSAGE.to_string(),
            success: false,
            timestamp: Utc::now(),
            quality_score: None,
            validation_passed: None,
            enhancement_applied: None,
            level: Some(ConsultationLevel::Error),
            model: None,
            error: Some(UNAVAILABLE_ERROR.to_string()),
        }
    }
}
