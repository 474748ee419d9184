//! Gemini generateContent 驱动：多模态请求体构建、响应文本提取、错误体解析
//!
//! Google Gemini `generateContent` wire format:
//! - Request: `contents[0].parts` mixes `{text}` and `{inlineData: {mimeType, data}}`
//!   entries; `generationConfig` carries temperature, `responseMimeType` and
//!   `maxOutputTokens`.
//! - Response: `candidates[0].content.parts[*].text`, `finishReason`, `usageMetadata`.
//! - Errors: `{ "error": { "code", "message", "status" } }`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Map, Value};

use super::{ContentPart, GenerateContentRequest, GenerateContentResponse, UsageInfo};
use crate::error::Error;

/// Path template relative to the endpoint base URL.
pub const GENERATE_PATH: &str = "/v1beta/models/{model}:generateContent";

/// Google Gemini generateContent API driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiDriver;

impl GeminiDriver {
    pub fn endpoint_url(base_url: &str, model: &str) -> String {
        format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            GENERATE_PATH.replace("{model}", model)
        )
    }

    fn part_to_json(part: &ContentPart) -> Value {
        match part {
            ContentPart::Text(text) => json!({ "text": text }),
            ContentPart::InlineData { mime_type, data } => json!({
                "inlineData": {
                    "mimeType": mime_type,
                    "data": STANDARD.encode(data),
                }
            }),
        }
    }

    pub fn build_body(req: &GenerateContentRequest) -> Value {
        let parts: Vec<Value> = req.parts.iter().map(Self::part_to_json).collect();

        let mut gen_config = Map::new();
        gen_config.insert("temperature".into(), json!(req.generation.temperature));
        if let Some(mime) = &req.generation.response_mime_type {
            gen_config.insert("responseMimeType".into(), json!(mime));
        }
        if let Some(mt) = req.generation.max_output_tokens {
            gen_config.insert("maxOutputTokens".into(), json!(mt));
        }

        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": Value::Object(gen_config),
        })
    }

    pub fn parse_response(body: &Value) -> GenerateContentResponse {
        let text = body
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect::<String>()
            })
            .unwrap_or_default();

        let finish_reason = body
            .pointer("/candidates/0/finishReason")
            .and_then(Value::as_str)
            .map(|r| match r {
                "STOP" => "stop".to_string(),
                "MAX_TOKENS" => "length".to_string(),
                "SAFETY" | "RECITATION" => "content_filter".to_string(),
                other => other.to_lowercase(),
            });

        let usage = body.get("usageMetadata").map(|u| UsageInfo {
            prompt_tokens: u["promptTokenCount"].as_u64().unwrap_or(0),
            completion_tokens: u["candidatesTokenCount"].as_u64().unwrap_or(0),
            total_tokens: u["totalTokenCount"].as_u64().unwrap_or(0),
        });

        GenerateContentResponse {
            text,
            finish_reason,
            usage,
        }
    }

    /// Turn a non-2xx response into [`Error::Remote`].
    ///
    /// Falls back to the raw body text when it is not a Google error envelope.
    pub fn parse_error(status: u16, body: &str) -> Error {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let envelope = parsed.as_ref().and_then(|v| v.get("error"));

        let class = envelope
            .and_then(|e| e.get("status"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let message = envelope
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    trimmed.chars().take(200).collect()
                }
            });

        Error::Remote {
            status,
            class,
            message,
        }
    }
}
