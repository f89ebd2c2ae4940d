//! Tolerant coercion of the corpus's heterogeneous response envelopes.
//!
//! The upstream corpus returns differently shaped JSON per channel: a bare
//! array, `{payload: {data: [...]}}`, `{data: {...}}`, `{recipe: {...}}`,
//! and so on. Everything here is a pure function over `serde_json::Value`
//! so each channel shares one normalization path.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::text_processing::unique;

lazy_static! {
    static ref LEADING_NUMBER: Regex =
        Regex::new(r"^[+-]?\d+(\.\d+)?([eE][+-]?\d+)?").expect("leading number pattern");
    static ref PLAUSIBLE_FOOD: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z\s\-&,]{2,}$").expect("plausible food pattern");
}

/// Lenient numeric coercion: finite numbers pass through, strings are parsed
/// by their leading numeric prefix (so `"12 g"` reads as `12`). Anything else
/// is absent — never NaN.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|parsed| parsed.is_finite()),
        Value::String(text) => LEADING_NUMBER
            .find(text.trim())
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|parsed| parsed.is_finite()),
        _ => None,
    }
}

/// Coerces any recognized envelope shape into an ordered record list.
/// Unrecognized shapes yield an empty list.
pub fn recipe_array(body: &Value) -> Vec<Value> {
    if let Value::Array(items) = body {
        return items.clone();
    }
    let Some(record) = body.as_object() else {
        return Vec::new();
    };
    if let Some(payload) = record.get("payload").and_then(Value::as_object) {
        if let Some(Value::Array(items)) = payload.get("data") {
            return items.clone();
        }
        if let Some(data) = payload.get("data").filter(|v| v.is_object()) {
            return vec![data.clone()];
        }
        if let Some(Value::Array(items)) = payload.get("recipes") {
            return items.clone();
        }
        if let Some(recipe) = payload.get("recipe").filter(|v| v.is_object()) {
            return vec![recipe.clone()];
        }
    }
    if let Some(Value::Array(items)) = record.get("data") {
        return items.clone();
    }
    if let Some(data) = record.get("data").filter(|v| v.is_object()) {
        return vec![data.clone()];
    }
    if let Some(recipe) = record.get("recipe").filter(|v| v.is_object()) {
        return vec![recipe.clone()];
    }
    Vec::new()
}

/// Pulls ordered instruction steps out of a detail payload, looking inside a
/// `payload` wrapper first and accepting `instructions`/`steps`/`method`.
pub fn instruction_list(body: &Value) -> Vec<String> {
    let Some(record) = body.as_object() else {
        return Vec::new();
    };
    let source = record
        .get("payload")
        .and_then(Value::as_object)
        .unwrap_or(record);

    for key in ["instructions", "steps", "method"] {
        if let Some(Value::Array(items)) = source.get(key) {
            return items
                .iter()
                .map(|item| match item {
                    Value::String(step) => step.clone(),
                    other => other.to_string(),
                })
                .filter(|step| !step.trim().is_empty())
                .collect();
        }
    }
    Vec::new()
}

/// Flattens every numeric leaf of a payload into dotted/spaced lowercase keys.
/// Arrays contribute `[index]` segments; recursion follows the input's own
/// structure with no depth limit.
pub fn collect_numeric_fields(value: &Value, prefix: &str) -> Vec<(String, f64)> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .flat_map(|(index, item)| {
                collect_numeric_fields(item, &format!("{}[{}]", prefix, index))
            })
            .collect(),
        Value::Object(map) => {
            let mut output = Vec::new();
            for (key, nested) in map {
                let full_key = format!("{} {}", prefix, key).trim().to_lowercase();
                if let Some(numeric) = to_number(nested) {
                    output.push((full_key, numeric));
                    continue;
                }
                output.extend(collect_numeric_fields(nested, &full_key));
            }
            output
        }
        _ => Vec::new(),
    }
}

fn extract_strings_deep(value: &Value, output: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            let cleaned = text.trim();
            if cleaned.len() > 1 && cleaned.len() < 80 {
                output.push(cleaned.to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                extract_strings_deep(item, output);
            }
        }
        Value::Object(map) => {
            for nested in map.values() {
                extract_strings_deep(nested, output);
            }
        }
        _ => {}
    }
}

/// Harvests plausible food-name strings from an arbitrarily nested payload.
/// URLs, metadata noise ("error", "token"), and long free text are excluded.
pub fn likely_foods(body: &Value) -> Vec<String> {
    let mut strings = Vec::new();
    extract_strings_deep(body, &mut strings);
    let filtered = strings.into_iter().filter(|item| {
        let lowered = item.to_lowercase();
        if lowered.contains("http") || lowered.contains("error") || lowered.contains("token") {
            return false;
        }
        PLAUSIBLE_FOOD.is_match(item)
    });
    let mut foods = unique(filtered);
    foods.truncate(12);
    foods
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_number_accepts_numbers_and_numeric_strings() {
        assert_eq!(to_number(&json!(42.5)), Some(42.5));
        assert_eq!(to_number(&json!("12 g")), Some(12.0));
        assert_eq!(to_number(&json!("3.5")), Some(3.5));
        assert_eq!(to_number(&json!("plenty")), None);
        assert_eq!(to_number(&json!(null)), None);
        assert_eq!(to_number(&json!(true)), None);
    }

    #[test]
    fn recipe_array_handles_every_envelope_shape() {
        let record = json!({"Recipe_title": "Dal"});
        assert_eq!(recipe_array(&json!([record])).len(), 1);
        assert_eq!(recipe_array(&json!({"payload": {"data": [record]}})).len(), 1);
        assert_eq!(recipe_array(&json!({"payload": {"data": record}})).len(), 1);
        assert_eq!(recipe_array(&json!({"payload": {"recipes": [record]}})).len(), 1);
        assert_eq!(recipe_array(&json!({"payload": {"recipe": record}})).len(), 1);
        assert_eq!(recipe_array(&json!({"data": [record]})).len(), 1);
        assert_eq!(recipe_array(&json!({"data": record})).len(), 1);
        assert_eq!(recipe_array(&json!({"recipe": record})).len(), 1);
        assert!(recipe_array(&json!("plain string")).is_empty());
        assert!(recipe_array(&json!({"unexpected": 1})).is_empty());
    }

    #[test]
    fn instruction_list_reads_wrapped_and_direct_keys() {
        let wrapped = json!({"payload": {"steps": ["Chop", "Cook", "  "]}});
        assert_eq!(instruction_list(&wrapped), vec!["Chop", "Cook"]);
        let direct = json!({"method": ["Mix", {"step": "Bake"}]});
        let steps = instruction_list(&direct);
        assert_eq!(steps[0], "Mix");
        assert!(steps[1].contains("Bake"));
        assert!(instruction_list(&json!(["not", "an", "object"])).is_empty());
    }

    #[test]
    fn numeric_fields_flatten_nested_structures() {
        let body = json!({
            "payload": {
                "Iron (mg)": 4.2,
                "vitamins": [{"Vitamin C (mg)": "12"}],
                "notes": "text"
            }
        });
        let fields = collect_numeric_fields(&body, "");
        assert!(fields.contains(&("payload iron (mg)".to_string(), 4.2)));
        assert!(fields
            .iter()
            .any(|(key, value)| key.contains("vitamin c") && *value == 12.0));
    }

    #[test]
    fn likely_foods_excludes_noise_and_caps_output() {
        let body = json!({
            "results": [
                "Dark Chocolate",
                "https://img.example/x.png",
                "error fetching pair",
                "session token abc",
                "a",
                "Almond Butter",
                "Chickpea salad with a very long descriptive sentence that keeps going well past the eighty character cutoff for names"
            ]
        });
        let foods = likely_foods(&body);
        assert_eq!(foods, vec!["Dark Chocolate", "Almond Butter"]);
    }
}
