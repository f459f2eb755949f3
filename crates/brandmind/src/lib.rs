//! Brand-consultation orchestration core.
//!
//! The public surface is [`ConsultationEngine::process_query`]: a caller hands
//! in a question, a per-request [`Context`] and a coarse [`QueryType`] hint,
//! and always gets back a well-formed [`ConsultationResult`]. Provider
//! selection, transport fallback, retries, response validation and formatting
//! all happen behind that boundary. Rendering, persistence and auth are the
//! caller's concern.

pub mod config;
pub mod consultation;
pub mod context;
pub mod formatting;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod selector;
pub mod validation;

pub use consultation::{ConsultationLevel, ConsultationResult};
pub use context::{ChatTurn, Context, FileAttachment, QueryType, Role};
pub use orchestrator::ConsultationEngine;
pub use providers::base::{Provider, ProviderKind, ProviderResult, Usage};
pub use providers::errors::ProviderError;
pub use validation::ValidationResult;
