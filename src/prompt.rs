//! Instruction prompt sent alongside the captured media.

use crate::structured::NormalizationPolicy;
use crate::types::{DangerLevel, Language};

/// Text-only prompt used by the connectivity check.
pub const CONNECTIVITY_PROMPT: &str = "Explain how AI works in a few words";

/// Render the analysis prompt for `language`.
///
/// JSON keys, `type` and `dangerLevel` stay in English so the normalizer can
/// match them; only the free-text values are localized.
pub fn build_prompt(language: Language, has_audio: bool, policy: &NormalizationPolicy) -> String {
    let lang = language.prompt_name();
    let categories = policy
        .categories
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    let levels = DangerLevel::ALL
        .iter()
        .map(|l| format!("\"{}\"", l.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let example_type = policy
        .categories
        .first()
        .map(String::as_str)
        .unwrap_or("Severe Bleeding");

    let inputs = if has_audio {
        "ANALYZE BOTH:\n- Image: visual scene analysis\n- Audio: sounds, voices or other audio cues\n\nUse all available information to make the best emergency assessment."
    } else {
        "ANALYZE:\n- Image: visual scene analysis"
    };

    format!(
        r#"You are an emergency response AI assistant. Analyze the provided media to determine if it depicts an emergency situation.

{inputs}

LANGUAGE INSTRUCTION:
Respond with translations in {lang} ONLY for the content values.
Keep the JSON structure and keys exactly as shown below. Do NOT translate JSON keys.

RESPOND WITH ONLY THIS EXACT JSON FORMAT:
{{
  "type": "{example_type}",
  "dangerLevel": "CRITICAL",
  "actions": ["action steps here"],
  "warning": "warning message",
  "reasoning": "brief explanation of analysis"
}}

RULES:
- Keep keys "type", "dangerLevel", "actions", "warning", "reasoning" in English
- For "type": use exactly one of {categories} (keep in English)
- For "dangerLevel": use one of {levels} (keep in English)
- For "actions": provide 1-{max} short imperative steps in {lang}
- For "warning": provide an urgent warning in {lang}, or an empty string ""
- For "reasoning": a brief explanation in {lang}

IMPORTANT: Return ONLY the JSON with NO additional text, markdown or backticks."#,
        max = policy.max_actions,
    )
}
