//! 模型驱动层：统一的多模态请求/响应表示与 Gemini 线协议转换
//!
//! Driver layer: a wire-neutral representation of one multimodal generation
//! call, plus the Gemini `generateContent` translation of it. Transports carry
//! these types; only the driver knows the provider's JSON shapes.

pub mod gemini;

use bytes::Bytes;
use serde::Serialize;

use crate::config::GenerationConfig;

pub use gemini::GeminiDriver;

/// One part of a multimodal prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// Raw bytes; the driver base64-encodes them on the wire.
    InlineData { mime_type: String, data: Bytes },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    pub fn inline(mime_type: impl Into<String>, data: Bytes) -> Self {
        ContentPart::InlineData {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// Unified generation request handed to a [`crate::transport::GenerateEndpoint`].
#[derive(Debug, Clone)]
pub struct GenerateContentRequest {
    pub model: String,
    pub parts: Vec<ContentPart>,
    pub generation: GenerationConfig,
    /// Correlation id sent as `x-request-id`.
    pub request_id: Option<String>,
}

/// Unified generation response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateContentResponse {
    /// Concatenated candidate text; empty when the model produced none.
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

impl GenerateContentResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageInfo {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}
