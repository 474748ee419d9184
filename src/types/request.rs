//! Analysis request types: the validated in-memory request and the inbound JSON payload.

use base64::Engine as _;
use bytes::Bytes;
use serde::Deserialize;
use std::path::Path;

use super::language::Language;
use crate::{Error, ErrorContext, Result};

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

/// Binary media attached to a request, tagged with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub data: Bytes,
    pub mime_type: String,
}

impl MediaPayload {
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// One analysis call: a still frame, an optional short audio clip and the target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub image: MediaPayload,
    pub audio: Option<MediaPayload>,
    pub language: Language,
}

impl AnalysisRequest {
    /// A request carrying a JPEG frame.
    pub fn new(image: impl Into<Bytes>, language: Language) -> Self {
        Self {
            image: MediaPayload::new(image, DEFAULT_IMAGE_MIME),
            audio: None,
            language,
        }
    }

    pub fn with_image_mime(mut self, mime_type: impl Into<String>) -> Self {
        self.image.mime_type = mime_type.into();
        self
    }

    /// Attach a WebM audio clip. Empty clips are ignored.
    pub fn with_audio(mut self, audio: impl Into<Bytes>) -> Self {
        let data: Bytes = audio.into();
        self.audio = if data.is_empty() {
            None
        } else {
            Some(MediaPayload::new(data, DEFAULT_AUDIO_MIME))
        };
        self
    }

    pub fn with_audio_payload(mut self, audio: MediaPayload) -> Self {
        self.audio = if audio.data.is_empty() { None } else { Some(audio) };
        self
    }

    pub fn image_from_file(path: impl AsRef<Path>, language: Language) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mime = guess_media_type(path).unwrap_or(DEFAULT_IMAGE_MIME);
        Ok(Self::new(bytes, language).with_image_mime(mime))
    }

    pub fn with_audio_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mime = guess_media_type(path).unwrap_or(DEFAULT_AUDIO_MIME);
        Ok(self.with_audio_payload(MediaPayload::new(bytes, mime)))
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Precondition check run before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.image.data.is_empty() {
            return Err(Error::validation_with_context(
                "Image data is required",
                ErrorContext::new()
                    .with_field_path("request.image")
                    .with_source("request_validator"),
            ));
        }
        Ok(())
    }
}

/// Inbound request body from the UI: `{ image, audio, language }`.
///
/// `image` and `audio` are base64 strings, optionally prefixed as data URLs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzePayload {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl AnalyzePayload {
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| {
            Error::validation_with_context(
                format!("Malformed request body: {}", e),
                ErrorContext::new().with_source("payload_decoder"),
            )
        })
    }

    /// Decode into an [`AnalysisRequest`].
    ///
    /// Unknown or missing languages fall back to English.
    pub fn into_request(self) -> Result<AnalysisRequest> {
        let image = match self.image.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => decode_media(s, DEFAULT_IMAGE_MIME, "request.image")?,
            _ => {
                return Err(Error::validation_with_context(
                    "Image data is required",
                    ErrorContext::new()
                        .with_field_path("request.image")
                        .with_source("payload_decoder"),
                ))
            }
        };

        let audio = match self.audio.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(decode_media(s, DEFAULT_AUDIO_MIME, "request.audio")?),
            _ => None,
        };

        let language = match self.language.as_deref() {
            Some(raw) => raw.parse::<Language>().unwrap_or_else(|_| {
                tracing::warn!(language = raw, "unsupported language, defaulting to English");
                Language::English
            }),
            None => Language::English,
        };

        let mut request = AnalysisRequest {
            image,
            audio: None,
            language,
        };
        if let Some(audio) = audio {
            request = request.with_audio_payload(audio);
        }
        request.validate()?;
        Ok(request)
    }
}

/// Decode a bare base64 string or a `data:<mime>;base64,<data>` URL.
fn decode_media(raw: &str, default_mime: &str, field: &str) -> Result<MediaPayload> {
    let (mime, encoded) = match raw.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((header, data)) => {
                let mime = header.split(';').next().filter(|m| !m.is_empty());
                (mime.unwrap_or(default_mime), data)
            }
            None => (default_mime, rest),
        },
        None => (default_mime, raw),
    };

    let data = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| {
            Error::validation_with_context(
                format!("Invalid base64 payload: {}", e),
                ErrorContext::new()
                    .with_field_path(field)
                    .with_source("payload_decoder"),
            )
        })?;
    Ok(MediaPayload::new(data, mime))
}

fn guess_media_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    let mt = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "webm" => "audio/webm",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        _ => return None,
    };
    Some(mt)
}
