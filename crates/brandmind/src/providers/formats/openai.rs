//! OpenAI chat-completions wire format: payload construction from the
//! normalized request, plus text and usage extraction from responses.

use base64::prelude::*;
use serde_json::{json, Value};

use crate::context::Context;
use crate::providers::base::{Usage, MAX_HISTORY_TURNS};
use crate::providers::errors::ProviderError;

pub fn create_request(
    model: &str,
    system_prompt: &str,
    prompt: &str,
    context: &Context,
    temperature: f32,
    max_tokens: i32,
) -> Value {
    let mut messages = vec![json!({
        "role": "system",
        "content": system_prompt,
    })];

    let history_start = context.history.len().saturating_sub(MAX_HISTORY_TURNS);
    for turn in &context.history[history_start..] {
        messages.push(json!({
            "role": turn.role.as_str(),
            "content": turn.text,
        }));
    }

    messages.push(user_message(prompt, context));

    json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
        "max_tokens": max_tokens,
    })
}

/// The final user turn. Plain text unless the context carries inline image
/// payloads, in which case the content becomes a multimodal part array.
fn user_message(prompt: &str, context: &Context) -> Value {
    if !context.has_inline_images() {
        return json!({"role": "user", "content": prompt});
    }

    let mut parts = vec![json!({"type": "text", "text": prompt})];
    for attachment in &context.attachments {
        if let (true, Some(data)) = (attachment.is_image(), &attachment.data) {
            let encoded = BASE64_STANDARD.encode(data);
            parts.push(json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", attachment.mime_type, encoded),
                },
            }));
        }
    }
    json!({"role": "user", "content": parts})
}

pub fn response_to_text(response: &Value) -> Result<String, ProviderError> {
    response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ProviderError::MalformedResponse(
                "no message content in chat completion response".to_string(),
            )
        })
}

pub fn get_usage(response: &Value) -> Result<Usage, ProviderError> {
    let usage = response
        .get("usage")
        .ok_or_else(|| ProviderError::UsageError("no usage data in response".to_string()))?;

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);
    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);
    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Ok(Usage::new(input_tokens, output_tokens, total_tokens))
}
