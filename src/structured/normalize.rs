//! 响应规范化：把不可信的模型输出转换为经过校验、受策略约束的紧急指令。
//!
//! Response normalizer: untrusted model text in, validated [`EmergencyInstruction`] out.
//!
//! Pipeline for one raw response:
//! extract object → validate required fields → apply policy overrides.
//! There is no retry here; a parse failure would repeat on the same text.

use serde_json::{Map, Value};

use super::extract::extract_json_object;
use super::policy::NormalizationPolicy;
use crate::types::{AnalysisOutcome, DangerLevel, EmergencyInstruction};
use crate::{Error, ErrorContext, Result};

/// Pure function object from raw model text to an [`EmergencyInstruction`].
#[derive(Debug, Clone, Default)]
pub struct ResponseNormalizer {
    policy: NormalizationPolicy,
}

impl ResponseNormalizer {
    pub fn new(policy: NormalizationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &NormalizationPolicy {
        &self.policy
    }

    /// Normalize raw text, returning the wire-level outcome.
    pub fn normalize_outcome(&self, raw: &str) -> AnalysisOutcome {
        AnalysisOutcome::from_result(self.normalize(raw))
    }

    pub fn normalize(&self, raw: &str) -> Result<EmergencyInstruction> {
        let object = extract_json_object(raw)?;
        let instruction = self.validate(&object)?;
        Ok(self.apply_policy(instruction))
    }

    fn validate(&self, object: &Map<String, Value>) -> Result<EmergencyInstruction> {
        let emergency_type = required_str(object, "type")?;
        if self.policy.strict_categories && !self.policy.is_known_category(&emergency_type) {
            return Err(invalid(
                format!("unknown emergency type '{}'", emergency_type),
                "response.type",
            ));
        }

        let danger_level = required_str(object, "dangerLevel")?;

        let actions = match object.get("actions") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(invalid(
                        "action entries must be strings",
                        format!("response.actions[{}]", i),
                    )),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(invalid("'actions' must be an array", "response.actions")),
            None => return Err(invalid("missing 'actions' field", "response.actions")),
        };

        let warning = optional_str(object, "warning").unwrap_or_default();
        let reasoning = optional_str(object, "reasoning")
            .or_else(|| optional_str(object, "reason"))
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| self.policy.reasoning_placeholder.clone());

        Ok(EmergencyInstruction {
            emergency_type,
            danger_level: DangerLevel::coerce(&danger_level),
            actions,
            warning,
            reasoning,
        })
    }

    fn apply_policy(&self, mut instruction: EmergencyInstruction) -> EmergencyInstruction {
        if self.policy.is_no_emergency(&instruction.emergency_type)
            && instruction.danger_level != DangerLevel::Low
        {
            tracing::debug!(
                emergency_type = instruction.emergency_type.as_str(),
                reported = instruction.danger_level.as_str(),
                "forcing LOW danger level for non-emergency"
            );
            instruction.danger_level = DangerLevel::Low;
        }

        if instruction.actions.len() > self.policy.max_actions {
            instruction.actions.truncate(self.policy.max_actions);
        }
        instruction
    }
}

/// Normalize with the default policy.
pub fn normalize_response(raw: &str) -> AnalysisOutcome {
    ResponseNormalizer::default().normalize_outcome(raw)
}

fn required_str(object: &Map<String, Value>, key: &str) -> Result<String> {
    match object.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => Err(invalid(
            format!("missing '{}' field", key),
            format!("response.{}", key),
        )),
        Some(_) => Err(invalid(
            format!("'{}' must be a string", key),
            format!("response.{}", key),
        )),
    }
}

fn optional_str(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn invalid(message: impl Into<String>, field: impl Into<String>) -> Error {
    Error::response_format_with_context(
        message,
        ErrorContext::new()
            .with_field_path(field)
            .with_source("response_normalizer"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ResponseNormalizer {
        ResponseNormalizer::default()
    }

    #[test]
    fn test_missing_type() {
        let err = normalizer()
            .normalize(r#"{"dangerLevel":"HIGH","actions":[]}"#)
            .unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("response.type")
        );
    }

    #[test]
    fn test_blank_danger_level_is_invalid() {
        let err = normalizer()
            .normalize(r#"{"type":"Fire or Smoke","dangerLevel":"  ","actions":[]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::ResponseFormat { .. }));
    }

    #[test]
    fn test_actions_must_be_array() {
        let err = normalizer()
            .normalize(r#"{"type":"Fire or Smoke","dangerLevel":"HIGH","actions":"Run"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("'actions' must be an array"));
    }

    #[test]
    fn test_non_string_action() {
        let err = normalizer()
            .normalize(r#"{"type":"Fire or Smoke","dangerLevel":"HIGH","actions":["Run", 2]}"#)
            .unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("response.actions[1]")
        );
    }

    #[test]
    fn test_empty_actions_allowed_and_extra_truncated() {
        let empty = normalizer()
            .normalize(r#"{"type":"Not an Emergency","dangerLevel":"LOW","actions":[]}"#)
            .unwrap();
        assert!(empty.actions.is_empty());

        let many = normalizer()
            .normalize(r#"{"type":"Fire or Smoke","dangerLevel":"HIGH","actions":["a","b","c","d"]}"#)
            .unwrap();
        assert_eq!(many.actions, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reason_alias_and_blank_reasoning() {
        let aliased = normalizer()
            .normalize(r#"{"type":"Fire or Smoke","dangerLevel":"HIGH","actions":[],"reason":"Flames"}"#)
            .unwrap();
        assert_eq!(aliased.reasoning, "Flames");

        let blank = normalizer()
            .normalize(r#"{"type":"Fire or Smoke","dangerLevel":"HIGH","actions":[],"reasoning":" "}"#)
            .unwrap();
        assert_eq!(blank.reasoning, "No specific reasoning provided.");
    }

    #[test]
    fn test_strict_categories() {
        let strict = ResponseNormalizer::new(NormalizationPolicy::default().with_strict_categories(true));
        assert!(strict
            .normalize(r#"{"type":"Alien invasion","dangerLevel":"HIGH","actions":[]}"#)
            .is_err());
        assert!(strict
            .normalize(r#"{"type":"fire or smoke","dangerLevel":"HIGH","actions":[]}"#)
            .is_ok());
    }
}
