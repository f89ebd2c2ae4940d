//! Turns a winning raw record into a fully populated [`AdaptedRecipe`]:
//! field normalization, concurrent detail hydration, derived health metrics,
//! micronutrient extraction, and flavor-swap suggestions.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::api_connection::connection::RecipeCorpus;
use crate::api_connection::envelope::{
    collect_numeric_fields, instruction_list, recipe_array, to_number,
};
use crate::craving_signals::{deficiency_nutrient_tokens, nutrient_label};
use crate::recipe_model::{
    AdaptedRecipe, GlycemicBand, MicronutrientEntry, NutrientHighlight, SwapSuggestion,
};
use crate::text_processing::{is_stopword, normalize_query, to_title_case};

const MICRONUTRIENT_KEYWORDS: &[&str] = &[
    "iron", "calcium", "magnesium", "zinc", "selenium", "copper", "manganese",
    "phosphorus", "potassium", "sodium", "folate", "vitamin", "thiamin",
    "riboflavin", "niacin", "cobalamin", "b12", "b6", "iodine",
];

const MICRONUTRIENT_CAP: usize = 8;

lazy_static! {
    static ref UNIT_PATTERN: Regex = Regex::new(r"\(([^)]+)\)").expect("unit pattern");
    static ref NAME_NOISE: Regex = Regex::new(
        r"(?i)\b(payload|data|items|item|result|results|recipe|micronutrition|nutrients?)\b"
    )
    .expect("name noise pattern");
}

fn first_present<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        record
            .get(*key)
            .filter(|value| !value.is_null())
    })
}

fn number_field(record: &Value, keys: &[&str]) -> Option<f64> {
    first_present(record, keys).and_then(to_number)
}

fn string_field(record: &Value, keys: &[&str]) -> Option<String> {
    first_present(record, keys).and_then(|value| match value {
        Value::String(text) => Some(text.clone()),
        _ => None,
    })
}

/// Losslessly normalizes one raw corpus record (whose field names vary per
/// endpoint) into an `AdaptedRecipe` with neutral derived defaults.
pub fn normalize_recipe(raw: &Value) -> AdaptedRecipe {
    let id = number_field(raw, &["Recipe_id", "recipe_id", "id"])
        .filter(|value| *value > 0.0)
        .map(|value| value as u64)
        .unwrap_or(0);
    let name = string_field(raw, &["Recipe_title", "recipe_title", "title"])
        .unwrap_or_else(|| "PCOS-friendly recipe".to_string());
    let calories = number_field(raw, &["Calories", "calories", "Energy (kcal)"]);
    let protein = number_field(raw, &["Protein (g)", "protein"]);
    let carbs = number_field(
        raw,
        &["Carbohydrate, by difference (g)", "carbs", "carbohydrates"],
    );
    let region = string_field(raw, &["Region", "region"]).unwrap_or_else(|| "Global".to_string());
    let summary = string_field(raw, &["summary", "Description", "description"]);
    let image_url = string_field(raw, &["img_url", "image_url", "imageUrl"])
        .filter(|url| !url.trim().is_empty());

    AdaptedRecipe {
        id,
        name,
        description: summary.filter(|text| !text.is_empty()).unwrap_or_else(|| {
            "Adapted for cravings while supporting stable energy, better satiety, and PCOS-friendly balance."
                .to_string()
        }),
        image_url,
        calories,
        protein,
        carbs,
        prep_time: number_field(raw, &["prep_time"]),
        cook_time: number_field(raw, &["cook_time"]),
        total_time: number_field(raw, &["total_time"]),
        region: region.clone(),
        instructions: Vec::new(),
        micronutrients: Vec::new(),
        nutrient_highlight: None,
        glycemic_load_band: GlycemicBand::Moderate,
        glycemic_load_note: "Balanced carbs and protein target a moderate glycemic response."
            .to_string(),
        swap_suggestions: Vec::new(),
        flavor_satisfaction: 82,
        pcos_safety: 85,
        tags: vec![region, "PCOS Friendly".to_string()],
    }
}

/// Glycemic-load banding over a protein-adjusted carb load.
pub fn estimate_glycemic_load(carbs: Option<f64>, protein: Option<f64>) -> (GlycemicBand, String) {
    let Some(carbs) = carbs else {
        return (
            GlycemicBand::Moderate,
            "Carbs were unavailable, so glycemic load is estimated as moderate.".to_string(),
        );
    };

    let adjusted_carb_load = (carbs - protein.unwrap_or(0.0) * 0.35).max(0.0);
    if adjusted_carb_load <= 20.0 {
        (
            GlycemicBand::Low,
            "Lower adjusted carb load with protein support favors steadier glucose response."
                .to_string(),
        )
    } else if adjusted_carb_load <= 35.0 {
        (
            GlycemicBand::Moderate,
            "Moderate adjusted carb load; pair with fiber/protein for better stability."
                .to_string(),
        )
    } else {
        (
            GlycemicBand::High,
            "Higher adjusted carb load. Portion control and extra protein/fiber are recommended."
                .to_string(),
        )
    }
}

/// Safety score in [55, 98]. A recipe with no protein figure contributes a
/// flat 15-point bonus term rather than the capped-and-scaled form used when
/// protein is present; that asymmetry is intentional behavior to keep.
pub fn pcos_safety_score(protein: Option<f64>, carbs: Option<f64>) -> i32 {
    let carbs_penalty = carbs.map(|value| (value - 45.0).max(0.0)).unwrap_or(0.0);
    let protein_term = protein.map(|value| value.min(30.0) * 0.4).unwrap_or(15.0);
    let raw = (80.0 + protein_term - carbs_penalty * 0.35).round();
    raw.clamp(55.0, 98.0) as i32
}

pub fn flavor_satisfaction_score(desire: &str) -> i32 {
    let bonus = if desire.trim().is_empty() { 0.0 } else { 6.0 };
    let raw: f64 = 82.0 + bonus;
    raw.round().clamp(70.0, 96.0) as i32
}

fn clean_micronutrient_name(raw_key: &str) -> String {
    let without_noise = NAME_NOISE.replace_all(raw_key, " ");
    let cleaned: String = without_noise
        .chars()
        .map(|c| if c == '_' || c == '.' { ' ' } else { c })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        to_title_case(raw_key)
    } else {
        to_title_case(&collapsed)
    }
}

/// Flattens the micronutrient payload, keeps positive entries under
/// micronutrient keys, dedupes by display name keeping the larger value,
/// sorts by value descending, and caps the list.
pub fn extract_micronutrient_entries(micro_data: &Value) -> Vec<MicronutrientEntry> {
    let numeric_fields = collect_numeric_fields(micro_data, "");
    if numeric_fields.is_empty() {
        return Vec::new();
    }

    let filtered = numeric_fields.into_iter().filter(|(key, value)| {
        if *value <= 0.0 {
            return false;
        }
        if key.contains("page") || key.contains("size") || key.contains("id") {
            return false;
        }
        MICRONUTRIENT_KEYWORDS
            .iter()
            .any(|keyword| key.contains(keyword))
    });

    let mut deduped: Vec<MicronutrientEntry> = Vec::new();
    for (key, value) in filtered {
        let unit = UNIT_PATTERN
            .captures(&key)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        let stripped = UNIT_PATTERN.replace_all(&key, "");
        let name = clean_micronutrient_name(stripped.trim());

        match deduped.iter_mut().find(|entry| entry.name == name) {
            Some(existing) => {
                if value > existing.value {
                    existing.value = value;
                    existing.unit = unit;
                }
            }
            None => deduped.push(MicronutrientEntry { name, value, unit }),
        }
    }

    deduped.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    deduped.truncate(MICRONUTRIENT_CAP);
    deduped
}

/// Surfaces the single micronutrient most relevant to the first deficiency
/// target. Produced only when the profile lists at least one deficiency.
pub fn build_nutrient_highlight(
    entries: &[MicronutrientEntry],
    deficiency_targets: &[String],
) -> Option<NutrientHighlight> {
    let primary_target = deficiency_targets.first()?;
    let label = nutrient_label(primary_target);
    let tokens = deficiency_nutrient_tokens(primary_target);
    let tokens: Vec<&str> = if tokens.is_empty() {
        vec![primary_target.as_str()]
    } else {
        tokens
    };

    let best = entries
        .iter()
        .filter(|entry| {
            let lowered = entry.name.to_lowercase();
            tokens.iter().any(|token| lowered.contains(token))
        })
        .max_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal));

    match best {
        Some(entry) => Some(NutrientHighlight {
            nutrient: label.clone(),
            value: Some(entry.value),
            unit: entry.unit.clone(),
            remark: format!("High {} content", label),
        }),
        None => Some(NutrientHighlight {
            nutrient: label.clone(),
            value: None,
            unit: String::new(),
            remark: format!("Prioritizing recipes with high {} content", label),
        }),
    }
}

/// Candidate (generic ingredient, healthier substitute, rationale) pairs
/// vetted against the flavor-pairing response text.
const SWAP_CANDIDATES: &[(&str, &str, &str)] = &[
    ("cream", "hung curd", "similar creamy mouthfeel with lower glycemic impact"),
    ("mayonnaise", "greek yogurt", "keeps tangy profile while improving protein density"),
    ("refined flour", "whole wheat flour", "retains structure with slower glucose response"),
    ("sugar", "date paste", "maintains sweetness with better micronutrient profile"),
    ("white rice", "millet", "keeps neutral taste while improving fiber and minerals"),
    ("paneer deep-fry", "grilled paneer", "retains savory profile with lower inflammatory load"),
];

/// Derives a seed word from the craving (or recipe name), queries the
/// flavor-pairing channel, and keeps only swaps whose substitute appears in
/// the pairing response. Capped at 3.
pub async fn flavor_swap_suggestions(
    corpus: &dyn RecipeCorpus,
    desire: &str,
    recipe_name: &str,
) -> Vec<SwapSuggestion> {
    let base = if desire.trim().is_empty() {
        normalize_query(recipe_name)
    } else {
        normalize_query(desire)
    };
    let Some(seed) = base
        .split(' ')
        .find(|word| word.len() >= 4 && !is_stopword(word))
    else {
        return Vec::new();
    };

    let Some(flavor_body) = corpus.flavor_pairings_by_alias(seed).await else {
        return Vec::new();
    };
    if !flavor_body.is_object() && !flavor_body.is_array() {
        return Vec::new();
    }
    let pair_text = serde_json::to_string(&flavor_body)
        .unwrap_or_default()
        .to_lowercase();

    let mut suggestions: Vec<SwapSuggestion> = SWAP_CANDIDATES
        .iter()
        .filter(|(_, to, _)| pair_text.contains(&to.to_lowercase()))
        .map(|(from, to, reason)| SwapSuggestion {
            from: (*from).to_string(),
            to: (*to).to_string(),
            reason: (*reason).to_string(),
        })
        .collect();
    suggestions.truncate(3);
    suggestions
}

/// Concurrently fetches detail, nutrition, instructions, and micronutrients
/// for a selected recipe with a stable corpus id, merging each result only
/// where the recipe lacks data (description and region are refreshed when
/// the hydrated values are non-empty). A record with id 0 came from a
/// fallback path and is never hydrated through id-keyed lookups.
pub async fn hydrate_recipe(corpus: &dyn RecipeCorpus, selected: &mut AdaptedRecipe) {
    if selected.id == 0 {
        return;
    }

    let (detail_body, nutrition_body, instructions_body, micronutrition_body) = tokio::join!(
        corpus.recipe_detail(selected.id),
        corpus.nutrition_info(selected.id),
        corpus.recipe_instructions(selected.id),
        corpus.micronutrition_info(selected.id),
    );

    if let Some(body) = detail_body {
        if let Some(detail) = recipe_array(&body).into_iter().next() {
            let hydrated = normalize_recipe(&detail);
            if !hydrated.description.is_empty() {
                selected.description = hydrated.description;
            }
            selected.prep_time = selected.prep_time.or(hydrated.prep_time);
            selected.cook_time = selected.cook_time.or(hydrated.cook_time);
            selected.total_time = selected.total_time.or(hydrated.total_time);
            if !hydrated.region.is_empty() {
                selected.region = hydrated.region;
            }
        }
    }

    if let Some(body) = nutrition_body {
        let nutrition = body.get("payload").unwrap_or(&body);
        if nutrition.is_object() {
            selected.calories = selected
                .calories
                .or_else(|| number_field(nutrition, &["Calories", "calories", "Energy (kcal)"]));
            selected.protein = selected
                .protein
                .or_else(|| number_field(nutrition, &["Protein (g)", "protein"]));
            selected.carbs = selected
                .carbs
                .or_else(|| number_field(nutrition, &["Carbohydrate, by difference (g)", "carbs"]));
        }
    }

    selected.instructions = instructions_body
        .map(|body| instruction_list(&body))
        .unwrap_or_default();
    selected.micronutrients = micronutrition_body
        .map(|body| extract_micronutrient_entries(&body))
        .unwrap_or_default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_tolerates_field_name_variance() {
        let raw = json!({
            "recipe_title": "Masala Oats",
            "recipe_id": "42",
            "Energy (kcal)": "310",
            "protein": 12.5,
            "carbohydrates": 40,
            "region": "Indian",
            "img_url": "https://img.example/oats.png"
        });
        let recipe = normalize_recipe(&raw);
        assert_eq!(recipe.id, 42);
        assert_eq!(recipe.name, "Masala Oats");
        assert_eq!(recipe.calories, Some(310.0));
        assert_eq!(recipe.protein, Some(12.5));
        assert_eq!(recipe.carbs, Some(40.0));
        assert_eq!(recipe.region, "Indian");
        assert_eq!(recipe.tags, vec!["Indian", "PCOS Friendly"]);
    }

    #[test]
    fn normalize_defaults_missing_identity_to_zero() {
        let recipe = normalize_recipe(&json!({"title": "Mystery Bowl"}));
        assert_eq!(recipe.id, 0);
        assert_eq!(recipe.region, "Global");
        assert_eq!(recipe.calories, None);
        assert_eq!(recipe.glycemic_load_band, GlycemicBand::Moderate);
    }

    #[test]
    fn glycemic_band_boundaries() {
        assert_eq!(estimate_glycemic_load(Some(20.0), Some(0.0)).0, GlycemicBand::Low);
        assert_eq!(estimate_glycemic_load(Some(20.01), Some(0.0)).0, GlycemicBand::Moderate);
        assert_eq!(estimate_glycemic_load(Some(35.0), Some(0.0)).0, GlycemicBand::Moderate);
        assert_eq!(estimate_glycemic_load(Some(35.01), Some(0.0)).0, GlycemicBand::High);
        // adjusted load = 50 - 0.35 * 100 = 15
        assert_eq!(estimate_glycemic_load(Some(50.0), Some(100.0)).0, GlycemicBand::Low);
    }

    #[test]
    fn glycemic_band_without_carbs_is_moderate_with_note() {
        let (band, note) = estimate_glycemic_load(None, Some(30.0));
        assert_eq!(band, GlycemicBand::Moderate);
        assert!(note.contains("unavailable"));
    }

    #[test]
    fn safety_score_is_clamped() {
        assert_eq!(pcos_safety_score(Some(30.0), Some(20.0)), 92);
        assert_eq!(pcos_safety_score(Some(0.0), Some(200.0)), 55);
        assert_eq!(pcos_safety_score(Some(1000.0), Some(0.0)), 92);
    }

    #[test]
    fn missing_protein_contributes_flat_bonus_not_scaled() {
        // present protein of 15 contributes 15 * 0.4 = 6; absent protein
        // contributes the full 15. The asymmetry is deliberate.
        assert_eq!(pcos_safety_score(Some(15.0), Some(10.0)), 86);
        assert_eq!(pcos_safety_score(None, Some(10.0)), 95);
    }

    #[test]
    fn flavor_satisfaction_reflects_craving_presence() {
        assert_eq!(flavor_satisfaction_score("chocolate"), 88);
        assert_eq!(flavor_satisfaction_score("  "), 82);
    }

    #[test]
    fn micronutrient_extraction_filters_dedupes_and_caps() {
        let micro = json!({
            "payload": {
                "Iron (mg)": 2.0,
                "iron (mg)": 4.5,
                "Vitamin C (mg)": 12.0,
                "Calcium (mg)": 80.0,
                "Magnesium (mg)": 30.0,
                "Zinc (mg)": 1.5,
                "Potassium (mg)": 200.0,
                "Sodium (mg)": 150.0,
                "Folate total": 40.0,
                "Thiamin (mg)": 0.4,
                "page": 3,
                "serving_size": 100,
                "Selenium (ug)": 0.0
            }
        });
        let entries = extract_micronutrient_entries(&micro);
        assert!(entries.len() <= 8);
        // sorted descending by value
        assert!(entries.windows(2).all(|pair| pair[0].value >= pair[1].value));
        // both iron spellings collapse into one entry keeping the larger value
        let iron: Vec<_> = entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains("iron"))
            .collect();
        assert_eq!(iron.len(), 1);
        assert_eq!(iron[0].value, 4.5);
        assert!(entries.iter().all(|entry| entry.value > 0.0));
        assert!(!entries.iter().any(|entry| entry.name.to_lowercase().contains("page")));
    }

    #[test]
    fn highlight_reports_value_when_target_is_present() {
        let entries = vec![
            MicronutrientEntry { name: "Iron Mg".to_string(), value: 4.5, unit: "mg".to_string() },
            MicronutrientEntry { name: "Calcium Mg".to_string(), value: 80.0, unit: "mg".to_string() },
        ];
        let highlight =
            build_nutrient_highlight(&entries, &["iron".to_string()]).expect("highlight");
        assert_eq!(highlight.nutrient, "Iron");
        assert_eq!(highlight.value, Some(4.5));
        assert!(highlight.remark.contains("High Iron"));
    }

    #[test]
    fn highlight_without_match_prioritizes_instead() {
        let highlight = build_nutrient_highlight(&[], &["vitamin d".to_string()]).expect("highlight");
        assert_eq!(highlight.value, None);
        assert!(highlight.remark.contains("Prioritizing"));
        assert!(build_nutrient_highlight(&[], &[]).is_none());
    }
}
