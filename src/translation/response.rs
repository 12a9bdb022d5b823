/*!
 * Backend answer repair and normalization.
 *
 * Whatever a backend returns, a batch of N inputs always ends up as exactly
 * N strings: missing entries fall back to the original text and surplus
 * entries are dropped.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::ProviderError;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json)?").unwrap());

/// Pull a JSON array out of free text (code fences, leading or trailing prose)
pub fn extract_json_array(content: &str) -> Result<Value, ProviderError> {
    let cleaned = CODE_FENCE.replace_all(content, "");
    let cleaned = cleaned.trim();

    let (start, end) = match (cleaned.find('['), cleaned.rfind(']')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Err(ProviderError::ParseError(
                "no JSON array found in model output".to_string(),
            ))
        }
    };

    serde_json::from_str(&cleaned[start..=end])
        .map_err(|e| ProviderError::ParseError(format!("invalid JSON array in model output: {}", e)))
}

/// Pad or truncate `translated` to the length of `original`
pub fn normalize(mut translated: Vec<String>, original: &[String]) -> Vec<String> {
    if translated.len() != original.len() {
        warn!(
            "Backend returned {} items for a batch of {}, realigning",
            translated.len(),
            original.len()
        );
    }

    translated.truncate(original.len());
    let missing = translated.len();
    translated.extend(original[missing..].iter().cloned());
    translated
}

/// Normalize a parsed JSON answer against the batch it translates
///
/// A non-array answer yields the originals unchanged. Scalars other than
/// strings keep their JSON text; null, objects and nested arrays fall back
/// to the original entry at that position. Every item is converted before
/// realigning so an over-long answer is still reported.
pub fn normalize_json(value: &Value, original: &[String]) -> Vec<String> {
    let Some(items) = value.as_array() else {
        warn!("Backend answer is not a JSON array, keeping original text");
        return original.to_vec();
    };

    let converted = items
        .iter()
        .enumerate()
        .map(|(position, item)| match item {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Null | Value::Object(_) | Value::Array(_) => {
                original.get(position).cloned().unwrap_or_default()
            }
        })
        .collect();

    normalize(converted, original)
}
