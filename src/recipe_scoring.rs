//! Hard filters and the weighted candidate scoring function.
//!
//! Intent and symptom matching deliberately serialize the whole raw record
//! and search it as a lowercase haystack. The loose substring match tolerates
//! the corpus's unknown field layout; downstream ranking assumes this
//! recall-biased behavior, so keep it rather than tightening to field-aware
//! matching.

use serde_json::Value;
use std::collections::HashSet;

use crate::api_connection::envelope::to_number;
use crate::craving_signals::{symptom_config, SymptomConfig};
use crate::recipe_model::{AdaptedRecipe, CravingRequest, SymptomFocus};
use crate::text_processing::{is_stopword, normalize_query};

pub const TITLE_KEYS: &[&str] = &["Recipe_title", "recipe_title", "title"];
pub const ID_KEYS: &[&str] = &["Recipe_id", "recipe_id", "id"];
pub const CALORIE_KEYS: &[&str] = &["Calories", "calories", "Energy (kcal)"];
pub const PROTEIN_KEYS: &[&str] = &["Protein (g)", "protein"];

/// First present-and-parseable numeric value among the given keys.
pub fn raw_metric(record: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(value) = record.get(key) {
            if let Some(parsed) = to_number(value) {
                return Some(parsed);
            }
        }
    }
    None
}

pub fn raw_title(record: &Value) -> String {
    for key in TITLE_KEYS {
        if let Some(Value::String(title)) = record.get(key) {
            return title.clone();
        }
    }
    String::new()
}

fn haystack(record: &Value) -> String {
    let dump = serde_json::to_string(record).unwrap_or_default();
    format!("{} {}", raw_title(record), dump).to_lowercase()
}

/// Keeps a record only when its calorie/protein values, where present, sit
/// inside the requested bounds. Absent values never cause a drop.
pub fn passes_nutrition_filter(record: &Value, request: &CravingRequest) -> bool {
    let calories = raw_metric(record, CALORIE_KEYS);
    let protein = raw_metric(record, PROTEIN_KEYS);

    if let (Some(min), Some(value)) = (request.min_calories(), calories) {
        if value < min {
            return false;
        }
    }
    if let (Some(max), Some(value)) = (request.max_calories(), calories) {
        if value > max {
            return false;
        }
    }
    if let (Some(min), Some(value)) = (request.min_protein(), protein) {
        if value < min {
            return false;
        }
    }
    if let (Some(max), Some(value)) = (request.max_protein(), protein) {
        if value > max {
            return false;
        }
    }
    true
}

pub fn apply_nutrition_filters(records: Vec<Value>, request: &CravingRequest) -> Vec<Value> {
    if !request.has_nutrition_bounds() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| passes_nutrition_filter(record, request))
        .collect()
}

pub fn record_matches_intent(record: &Value, intent_terms: &[String]) -> bool {
    if intent_terms.is_empty() {
        return true;
    }
    let haystack = haystack(record);
    intent_terms.iter().any(|term| haystack.contains(term))
}

pub fn filter_by_intent(records: Vec<Value>, intent_terms: &[String]) -> Vec<Value> {
    if intent_terms.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| record_matches_intent(record, intent_terms))
        .collect()
}

/// Symptom filter keeps records whose serialized text mentions any symptom
/// title token. If that would eliminate every candidate the filter is
/// skipped, returning the unfiltered set.
pub fn filter_by_symptom(records: Vec<Value>, focus: Option<SymptomFocus>) -> Vec<Value> {
    let Some(config) = symptom_config(focus) else {
        return records;
    };
    let matches: Vec<Value> = records
        .iter()
        .filter(|record| {
            let haystack = serde_json::to_string(record).unwrap_or_default().to_lowercase();
            config.title_tokens.iter().any(|token| haystack.contains(token))
        })
        .cloned()
        .collect();
    if matches.is_empty() {
        records
    } else {
        matches
    }
}

/// Deduplicates by corpus id when present, else title; first occurrence wins.
pub fn dedupe_records(records: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut output = Vec::new();
    for record in records {
        let key = ID_KEYS
            .iter()
            .chain(["Recipe_title", "recipe_title"].iter())
            .find_map(|key| {
                record.get(*key).and_then(|value| match value {
                    Value::String(text) if !text.is_empty() => Some(text.clone()),
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                })
            });
        let Some(key) = key else { continue };
        if seen.insert(key) {
            output.push(record);
        }
    }
    output
}

/// Counts query words (length >= 3, non-stopword) that substring-match a
/// title word in either direction, once per query word.
pub fn title_word_match_count(title: &str, query: &str) -> usize {
    let title_words: Vec<String> = normalize_query(title)
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect();
    let query_words: Vec<String> = normalize_query(query)
        .split(' ')
        .filter(|word| word.len() >= 3 && !is_stopword(word))
        .map(str::to_string)
        .collect();
    if title_words.is_empty() || query_words.is_empty() {
        return 0;
    }

    query_words
        .iter()
        .filter(|query_word| {
            title_words
                .iter()
                .any(|title_word| title_word.contains(*query_word) || query_word.contains(title_word))
        })
        .count()
}

/// Pantry ingredients mentioned anywhere in the serialized record.
pub fn pantry_match_count(record: &Value, pantry: &[String]) -> usize {
    if pantry.is_empty() {
        return 0;
    }
    let text = serde_json::to_string(record).unwrap_or_default().to_lowercase();
    pantry
        .iter()
        .filter(|item| text.contains(&item.to_lowercase()))
        .count()
}

/// Weighted multi-criteria score; higher is better.
pub fn score_recipe(
    recipe: &AdaptedRecipe,
    pantry_match: usize,
    desire: &str,
    intent_terms: &[String],
    focus: Option<SymptomFocus>,
) -> f64 {
    let mut score = 0.0;
    score += pantry_match as f64 * 12.0;
    score += title_word_match_count(&recipe.name, desire) as f64 * 30.0;

    let lowered_name = recipe.name.to_lowercase();
    let intent_hits = intent_terms
        .iter()
        .filter(|term| lowered_name.contains(*term))
        .count();
    score += intent_hits as f64 * 40.0;

    if let Some(protein) = recipe.protein {
        score += protein.min(35.0);
    }
    if let Some(carbs) = recipe.carbs {
        score -= (carbs - 45.0).max(0.0) * 0.5;
    }
    if let Some(calories) = recipe.calories {
        score -= (calories - 550.0).max(0.0) * 0.03;
    }

    if let Some(config) = symptom_config(focus) {
        score += symptom_score(recipe, &lowered_name, config);
    }

    score
}

fn symptom_score(recipe: &AdaptedRecipe, lowered_name: &str, config: &SymptomConfig) -> f64 {
    let mut score = 0.0;
    let symptom_hits = config
        .title_tokens
        .iter()
        .filter(|token| lowered_name.contains(*token))
        .count();
    score += symptom_hits as f64 * 14.0;

    if let (Some(carbs), Some(ceiling)) = (recipe.carbs, config.max_carbs) {
        score += if carbs <= ceiling { 24.0 } else { -24.0 };
    }
    if let (Some(protein), Some(floor)) = (recipe.protein, config.min_protein) {
        score += if protein >= floor { 18.0 } else { -12.0 };
    }
    score
}

/// Raw micronutrient score: sum of numeric fields whose flattened key
/// contains any token tied to a targeted deficiency.
pub fn micronutrient_score(micro_data: &Value, deficiency_targets: &[String]) -> f64 {
    if deficiency_targets.is_empty() {
        return 0.0;
    }
    let nutrients = crate::api_connection::envelope::collect_numeric_fields(micro_data, "");
    if nutrients.is_empty() {
        return 0.0;
    }

    let mut score = 0.0;
    for target in deficiency_targets {
        let tokens = crate::craving_signals::deficiency_nutrient_tokens(target);
        let tokens: Vec<&str> = if tokens.is_empty() {
            vec![target.as_str()]
        } else {
            tokens
        };
        for token in tokens {
            for (key, value) in &nutrients {
                if key.contains(token) {
                    score += value;
                }
            }
        }
    }
    score
}

/// Rank boosts for candidates with a positive raw micronutrient score:
/// `(N - rank) * 18` where N is the positive count and rank is 0-based.
pub fn deficiency_boosts(raw_scores: &[(u64, f64)]) -> Vec<(u64, f64)> {
    let mut ranked: Vec<(u64, f64)> = raw_scores
        .iter()
        .filter(|(_, raw)| raw.is_finite() && *raw > 0.0)
        .copied()
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let max_rank = ranked.len();
    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (id, _))| (id, (max_rank - rank) as f64 * 18.0))
        .collect()
}
