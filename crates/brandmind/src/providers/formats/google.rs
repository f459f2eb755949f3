//! Gemini generateContent wire format.

use base64::prelude::*;
use serde_json::{json, Value};

use crate::context::{Context, Role};
use crate::providers::base::{Usage, MAX_HISTORY_TURNS};
use crate::providers::errors::ProviderError;

pub fn create_request(
    system_prompt: &str,
    prompt: &str,
    context: &Context,
    temperature: f32,
    max_output_tokens: i32,
) -> Value {
    let mut contents = Vec::new();

    let history_start = context.history.len().saturating_sub(MAX_HISTORY_TURNS);
    for turn in &context.history[history_start..] {
        // Gemini uses "model" where the normalized history says "assistant".
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "model",
        };
        contents.push(json!({
            "role": role,
            "parts": [{"text": turn.text}],
        }));
    }

    contents.push(json!({
        "role": "user",
        "parts": user_parts(prompt, context),
    }));

    json!({
        "systemInstruction": {
            "parts": [{"text": system_prompt}],
        },
        "contents": contents,
        "generationConfig": {
            "temperature": temperature,
            "maxOutputTokens": max_output_tokens,
        },
    })
}

fn user_parts(prompt: &str, context: &Context) -> Vec<Value> {
    let mut parts = vec![json!({"text": prompt})];
    for attachment in &context.attachments {
        if let (true, Some(data)) = (attachment.is_image(), &attachment.data) {
            parts.push(json!({
                "inlineData": {
                    "mimeType": attachment.mime_type,
                    "data": BASE64_STANDARD.encode(data),
                },
            }));
        }
    }
    parts
}

pub fn response_to_text(response: &Value) -> Result<String, ProviderError> {
    let parts = response
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array())
        .ok_or_else(|| {
            ProviderError::MalformedResponse("no candidates in Gemini response".to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "Gemini candidate contained no text parts".to_string(),
        ));
    }
    Ok(text)
}

pub fn get_usage(response: &Value) -> Result<Usage, ProviderError> {
    let usage = response.get("usageMetadata").ok_or_else(|| {
        ProviderError::UsageError("no usageMetadata in Gemini response".to_string())
    })?;

    let input_tokens = usage
        .get("promptTokenCount")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);
    let output_tokens = usage
        .get("candidatesTokenCount")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);
    let total_tokens = usage
        .get("totalTokenCount")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Ok(Usage::new(input_tokens, output_tokens, total_tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ChatTurn;

    #[test]
    fn assistant_turns_map_to_model_role() {
        let context = Context::new().with_history(vec![
            ChatTurn::user("what should we name it?"),
            ChatTurn::assistant("three directions come to mind"),
        ]);
        let request = create_request("system", "go on", &context, 0.7, 2048);

        let contents = request["contents"].as_array().unwrap();
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
    }

    #[test]
    fn text_parts_are_concatenated() {
        let response = serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "part one "}, {"text": "part two"}]}
            }]
        });
        assert_eq!(response_to_text(&response).unwrap(), "part one part two");
    }

    #[test]
    fn empty_candidates_are_malformed() {
        let response = serde_json::json!({"candidates": []});
        assert!(matches!(
            response_to_text(&response),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn usage_metadata_is_extracted() {
        let response = serde_json::json!({
            "usageMetadata": {
                "promptTokenCount": 10,
                "candidatesTokenCount": 20,
                "totalTokenCount": 30
            }
        });
        let usage = get_usage(&response).unwrap();
        assert_eq!(usage.input_tokens, Some(10));
        assert_eq!(usage.output_tokens, Some(20));
        assert_eq!(usage.total_tokens, Some(30));
    }
}
