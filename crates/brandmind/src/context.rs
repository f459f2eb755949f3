//! Per-request value objects supplied by the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One prior turn of the consultation conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Descriptor for a file the user uploaded alongside the conversation.
/// `data` is only present when the caller chose to inline the payload;
/// metadata-only attachments are mentioned in the prompt but not transmitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttachment {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
}

impl FileAttachment {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// True when the attachment can be sent inline to a multimodal model.
    pub fn has_inline_image(&self) -> bool {
        self.is_image() && self.data.is_some()
    }
}

/// Coarse hint from the caller about the flavor of the question. Carried on
/// the proxy wire contract and into prompt framing; provider selection itself
/// is keyword-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Strategic,
    Analytical,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Strategic => "strategic",
            QueryType::Analytical => "analytical",
        }
    }
}

/// Immutable per-request context. Constructed fresh by the caller for each
/// `process_query` call and never mutated by the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_idea: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<FileAttachment>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub selections: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_current_step(mut self, step: impl Into<String>) -> Self {
        self.current_step = Some(step.into());
        self
    }

    pub fn with_brand_idea(mut self, idea: impl Into<String>) -> Self {
        self.brand_idea = Some(idea.into());
        self
    }

    pub fn with_attachment(mut self, attachment: FileAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_selection(mut self, key: impl Into<String>, value: Value) -> Self {
        self.selections.insert(key.into(), value);
        self
    }

    pub fn has_inline_images(&self) -> bool {
        self.attachments.iter().any(FileAttachment::has_inline_image)
    }

    /// Contextual fields rendered as a prompt block, or None when the
    /// request carries no context beyond the conversation itself.
    pub fn preamble(&self) -> Option<String> {
        let mut lines = Vec::new();
        if let Some(idea) = &self.brand_idea {
            if !idea.trim().is_empty() {
                lines.push(format!("Brand idea: {}", idea.trim()));
            }
        }
        if let Some(step) = &self.current_step {
            if !step.trim().is_empty() {
                lines.push(format!("Current onboarding step: {}", step.trim()));
            }
        }
        if !self.selections.is_empty() {
            lines.push("Choices the client has already made:".to_string());
            for (key, value) in &self.selections {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                lines.push(format!("- {}: {}", key, rendered));
            }
        }
        if !self.attachments.is_empty() {
            let names: Vec<&str> = self.attachments.iter().map(|a| a.name.as_str()).collect();
            lines.push(format!("Files shared by the client: {}", names.join(", ")));
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}
