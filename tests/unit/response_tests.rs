/*!
 * Tests for backend answer repair and normalization
 */

use docxpolyglot::translation::response::{extract_json_array, normalize, normalize_json};
use serde_json::json;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_normalize_withShortAnswer_shouldPadWithOriginals() {
    let original = strings(&["a", "b", "c"]);
    let translated = strings(&["x"]);

    assert_eq!(normalize(translated, &original), strings(&["x", "b", "c"]));
}

#[test]
fn test_normalize_withLongAnswer_shouldTruncate() {
    let original = strings(&["a", "b"]);
    let translated = strings(&["x", "y", "z", "w"]);

    assert_eq!(normalize(translated, &original), strings(&["x", "y"]));
}

#[test]
fn test_normalize_withExactLength_shouldKeepAnswer() {
    let original = strings(&["a", "b"]);
    assert_eq!(normalize(strings(&["x", "y"]), &original), strings(&["x", "y"]));
}

#[test]
fn test_normalize_json_withNonArray_shouldReturnOriginals() {
    let original = strings(&["a", "b"]);

    assert_eq!(normalize_json(&json!({"items": ["x", "y"]}), &original), original);
    assert_eq!(normalize_json(&json!("x"), &original), original);
    assert_eq!(normalize_json(&json!(null), &original), original);
}

#[test]
fn test_normalize_json_withScalars_shouldStringify() {
    let original = strings(&["1", "yes", "c"]);
    let value = json!([42, true, "tres"]);

    assert_eq!(normalize_json(&value, &original), strings(&["42", "true", "tres"]));
}

#[test]
fn test_normalize_json_withShortArray_shouldPad() {
    let original = strings(&["a", "b", "c"]);
    assert_eq!(normalize_json(&json!(["x"]), &original), strings(&["x", "b", "c"]));
}

#[test]
fn test_normalize_json_withLongArray_shouldConvertAllThenTruncate() {
    let original = strings(&["a", "b"]);
    let value = json!(["x", null, {"extra": 1}, null, "z"]);

    assert_eq!(normalize_json(&value, &original), strings(&["x", "b"]));
}

#[test]
fn test_extract_json_array_withCodeFence_shouldParse() {
    let content = "```json\n[\"uno\", \"dos\"]\n```";
    assert_eq!(extract_json_array(content).unwrap(), json!(["uno", "dos"]));
}

#[test]
fn test_extract_json_array_withSurroundingProse_shouldParse() {
    let content = "Here is the translation:\n[\"Hola\", \"Mundo\"]\nLet me know if you need more.";
    assert_eq!(extract_json_array(content).unwrap(), json!(["Hola", "Mundo"]));
}

#[test]
fn test_extract_json_array_withoutBrackets_shouldFail() {
    assert!(extract_json_array("I cannot translate this.").is_err());
    assert!(extract_json_array("").is_err());
}

#[test]
fn test_extract_json_array_withBrokenJson_shouldFail() {
    assert!(extract_json_array("[\"unterminated, \"x\"]").is_err());
}
