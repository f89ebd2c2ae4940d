use std::collections::HashSet;

use lazy_static::lazy_static;

use crate::recipe_model::{CravingRequest, SymptomFocus};
use crate::text_processing::{is_stopword, normalize_query, unique};

const FLAVOR_KEYWORDS: &[&str] = &[
    "sweet", "spicy", "sour", "salty", "tangy", "cheesy", "creamy", "savory",
    "smoky", "minty", "garlicky", "chocolaty", "chocolate",
];

/// Cuisine keyword -> region label, scanned most-specific (longest key) first
/// so that "south indian" wins over "indian".
const CUISINE_TO_REGION: &[(&str, &str)] = &[
    ("middle eastern", "Middle Eastern"),
    ("middleeastern", "Middle Eastern"),
    ("mediterranean", "Mediterranean"),
    ("south indian", "South Indian"),
    ("north indian", "North Indian"),
    ("continental", "Continental"),
    ("japanese", "Japanese"),
    ("gujarati", "Gujarati"),
    ("punjabi", "Punjabi"),
    ("bengali", "Bengali"),
    ("italian", "Italian"),
    ("mexican", "Mexican"),
    ("chinese", "Chinese"),
    ("indian", "Indian"),
    ("korean", "Korean"),
    ("thai", "Thai"),
];

const INTENT_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "sweet",
        &["sweet", "dessert", "cake", "cookie", "chocolate", "brownie", "halwa", "kheer", "pastry"],
    ),
    ("cheesy", &["cheese", "cheesy", "mozzarella", "cheddar", "paneer"]),
    ("pizza", &["pizza", "flatbread", "margherita", "neapolitan"]),
    ("burger", &["burger", "patty", "bun", "sliders"]),
    (
        "south indian",
        &["south indian", "idli", "dosa", "uttapam", "upma", "sambar", "rasam"],
    ),
    (
        "mexican",
        &["mexican", "taco", "burrito", "quesadilla", "enchilada", "salsa"],
    ),
];

lazy_static! {
    static ref FLAVOR_KEYWORD_SET: HashSet<&'static str> =
        FLAVOR_KEYWORDS.iter().copied().collect();
}

/// Ordered query sets derived from a single craving string. No network access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSignals {
    pub title_queries: Vec<String>,
    pub keyword_queries: Vec<String>,
    pub flavor_queries: Vec<String>,
    pub region_queries: Vec<String>,
}

pub fn build_search_signals(desire: &str) -> SearchSignals {
    let raw = desire.trim().to_string();
    let normalized = normalize_query(desire);
    if normalized.is_empty() {
        return SearchSignals::default();
    }

    let terms: Vec<String> = normalized
        .split(' ')
        .filter(|term| !is_stopword(term))
        .map(str::to_string)
        .collect();

    let mut title_inputs = vec![raw.clone(), normalized.clone(), terms.join(" ")];
    title_inputs.extend(terms.iter().filter(|t| t.len() >= 4).cloned());
    let mut title_queries = unique(title_inputs);
    title_queries.truncate(5);

    let mut keyword_inputs = vec![raw, normalized.clone()];
    keyword_inputs.extend(terms.iter().filter(|t| t.len() >= 4).cloned());
    let mut keyword_queries = unique(keyword_inputs);
    keyword_queries.truncate(5);

    let flavor_queries = unique(
        terms
            .iter()
            .filter(|term| {
                FLAVOR_KEYWORD_SET.contains(term.as_str())
                    || (term.ends_with('y') && term.len() >= 5)
            })
            .cloned(),
    );

    let mut region_queries = Vec::new();
    for (keyword, region) in CUISINE_TO_REGION {
        if normalized.contains(keyword) {
            region_queries.push((*region).to_string());
        }
    }

    SearchSignals {
        title_queries,
        keyword_queries,
        flavor_queries,
        region_queries: unique(region_queries),
    }
}

/// Keyword expansion for the explicit intent label plus any intent whose name
/// or keywords appear in the craving text itself.
pub fn intent_terms(request: &CravingRequest) -> Vec<String> {
    let explicit = normalize_query(&request.selected_intent);
    let desire = normalize_query(&request.desire);
    let mut terms: Vec<String> = Vec::new();

    let mut push = |term: &str| {
        if !terms.iter().any(|existing| existing == term) {
            terms.push(term.to_string());
        }
    };

    if !explicit.is_empty() {
        if let Some((_, words)) = INTENT_KEYWORDS.iter().find(|(name, _)| *name == explicit) {
            for word in *words {
                push(word);
            }
        }
    }

    for (intent, words) in INTENT_KEYWORDS {
        if desire.contains(intent) || words.iter().any(|word| desire.contains(word)) {
            for word in *words {
                push(word);
            }
        }
    }

    terms
}

/// Fixed retrieval configuration for one symptom focus.
#[derive(Debug, Clone, Copy)]
pub struct SymptomConfig {
    pub label: &'static str,
    pub search_terms: &'static [&'static str],
    pub title_tokens: &'static [&'static str],
    pub max_carbs: Option<f64>,
    pub min_protein: Option<f64>,
}

pub fn symptom_config(focus: Option<SymptomFocus>) -> Option<&'static SymptomConfig> {
    focus.map(|focus| match focus {
        SymptomFocus::InsulinSpike => &SymptomConfig {
            label: "Insulin Spike Support",
            search_terms: &["low carb", "high protein", "fiber"],
            title_tokens: &["millet", "oats", "chickpea", "lentil", "salad", "grilled"],
            max_carbs: Some(30.0),
            min_protein: Some(18.0),
        },
        SymptomFocus::Bloating => &SymptomConfig {
            label: "Bloating Relief Support",
            search_terms: &["light", "soup", "easy digest"],
            title_tokens: &["soup", "stew", "grilled", "steamed", "sauteed"],
            max_carbs: Some(45.0),
            min_protein: None,
        },
        SymptomFocus::Fatigue => &SymptomConfig {
            label: "Fatigue Support",
            search_terms: &["high protein", "iron", "energy"],
            title_tokens: &["egg", "paneer", "chickpea", "lentil", "beans", "spinach"],
            max_carbs: None,
            min_protein: Some(20.0),
        },
        SymptomFocus::Acne => &SymptomConfig {
            label: "Acne-safe Support",
            search_terms: &["anti inflammatory", "low sugar", "omega"],
            title_tokens: &["salad", "bowl", "grilled", "seeds", "nuts"],
            max_carbs: Some(40.0),
            min_protein: None,
        },
        SymptomFocus::PeriodCramps => &SymptomConfig {
            label: "Period Cramp Support",
            search_terms: &["iron rich", "magnesium", "anti inflammatory"],
            title_tokens: &["spinach", "sesame", "lentil", "beans", "nuts"],
            max_carbs: None,
            min_protein: None,
        },
        SymptomFocus::SugarCravings => &SymptomConfig {
            label: "Sugar Craving Balance",
            search_terms: &["high protein snack", "low gi", "sweet healthy"],
            title_tokens: &["dark chocolate", "chia", "yogurt", "nuts", "berries"],
            max_carbs: Some(35.0),
            min_protein: Some(15.0),
        },
    })
}

/// Combined search terms and title tokens for a symptom, deduplicated.
pub fn symptom_terms(config: &SymptomConfig) -> Vec<String> {
    unique(
        config
            .search_terms
            .iter()
            .chain(config.title_tokens.iter())
            .map(|term| (*term).to_string()),
    )
}

/// Nutrient tokens matched against flattened micronutrient keys, per deficiency.
pub fn deficiency_nutrient_tokens(target: &str) -> Vec<&'static str> {
    match target {
        "iron" => vec!["iron"],
        "vitamin d" => vec!["vitamin d", "cholecalciferol"],
        "vitamin b12" => vec!["vitamin b12", "cobalamin", "b12"],
        "folate" => vec!["folate", "folic acid", "vitamin b9", "b9"],
        "calcium" => vec!["calcium"],
        "magnesium" => vec!["magnesium"],
        "protein" => vec!["protein"],
        "anemia" => vec!["iron", "folate", "vitamin b12"],
        _ => vec![],
    }
}

/// Maps a free-text deficiency label to the closest canonical target.
pub fn normalize_deficiency(deficiency: &str) -> String {
    let normalized = normalize_query(deficiency);
    if normalized.is_empty() || normalized == "none" {
        return String::new();
    }
    if normalized.contains("iron") {
        return "iron".to_string();
    }
    if normalized.contains("vitamin d") {
        return "vitamin d".to_string();
    }
    if normalized.contains("vitamin b12") || normalized.contains("b12") {
        return "vitamin b12".to_string();
    }
    if normalized.contains("folate") || normalized.contains("folic") {
        return "folate".to_string();
    }
    if normalized.contains("calcium") {
        return "calcium".to_string();
    }
    if normalized.contains("magnesium") {
        return "magnesium".to_string();
    }
    if normalized.contains("protein") {
        return "protein".to_string();
    }
    if normalized.contains("anemia") || normalized.contains("anaemia") {
        return "anemia".to_string();
    }
    normalized
}

pub fn deficiency_targets(deficiencies: &[String]) -> Vec<String> {
    unique(deficiencies.iter().map(|label| normalize_deficiency(label)))
}

/// Display label for a canonical deficiency target.
pub fn nutrient_label(target: &str) -> String {
    match target {
        "vitamin d" => "Vitamin D".to_string(),
        "vitamin b12" => "Vitamin B12".to_string(),
        "anemia" => "Iron / Folate / Vitamin B12".to_string(),
        other => crate::text_processing::to_title_case(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(desire: &str, intent: &str) -> CravingRequest {
        CravingRequest {
            desire: desire.to_string(),
            selected_intent: intent.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn title_queries_are_capped_and_deduplicated() {
        let signals = build_search_signals("craving something cheesy spicy paneer pizza tonight");
        assert!(signals.title_queries.len() <= 5);
        assert_eq!(signals.title_queries[0], "craving something cheesy spicy paneer pizza tonight");
        let rerun = build_search_signals("craving something cheesy spicy paneer pizza tonight");
        assert_eq!(signals, rerun);
    }

    #[test]
    fn empty_desire_yields_empty_signals() {
        assert_eq!(build_search_signals("  !! "), SearchSignals::default());
    }

    #[test]
    fn flavor_queries_take_known_adjectives_and_y_words() {
        let signals = build_search_signals("creamy garlicky toasty bread");
        assert!(signals.flavor_queries.contains(&"creamy".to_string()));
        assert!(signals.flavor_queries.contains(&"garlicky".to_string()));
        // "toasty" is not in the fixed set but ends in y with length >= 5
        assert!(signals.flavor_queries.contains(&"toasty".to_string()));
    }

    #[test]
    fn specific_cuisine_keyword_wins_over_generic() {
        let signals = build_search_signals("something south indian for breakfast");
        assert_eq!(signals.region_queries[0], "South Indian");
        assert!(signals.region_queries.contains(&"Indian".to_string()));
    }

    #[test]
    fn explicit_intent_expands_keywords() {
        let terms = intent_terms(&request_with("anything", "Pizza"));
        assert!(terms.contains(&"pizza".to_string()));
        assert!(terms.contains(&"flatbread".to_string()));
    }

    #[test]
    fn intent_is_inferred_from_desire_keywords() {
        let terms = intent_terms(&request_with("want a quesadilla", ""));
        assert!(terms.contains(&"taco".to_string()));
        assert!(terms.contains(&"mexican".to_string()));
    }

    #[test]
    fn symptom_config_carries_thresholds() {
        let config = symptom_config(Some(SymptomFocus::InsulinSpike)).unwrap();
        assert_eq!(config.max_carbs, Some(30.0));
        assert_eq!(config.min_protein, Some(18.0));
        assert!(symptom_config(None).is_none());
    }

    #[test]
    fn deficiency_labels_normalize_to_canonical_targets() {
        assert_eq!(normalize_deficiency("Iron deficiency"), "iron");
        assert_eq!(normalize_deficiency("low B12"), "vitamin b12");
        assert_eq!(normalize_deficiency("Anaemia"), "anemia");
        assert_eq!(normalize_deficiency("none"), "");
        assert_eq!(normalize_deficiency("selenium"), "selenium");
    }

    #[test]
    fn deficiency_targets_dedupe_and_drop_blanks() {
        let targets = deficiency_targets(&[
            "Iron".to_string(),
            "iron deficiency".to_string(),
            "none".to_string(),
            "Vitamin D".to_string(),
        ]);
        assert_eq!(targets, vec!["iron", "vitamin d"]);
    }

    #[test]
    fn nutrient_labels_are_human_readable() {
        assert_eq!(nutrient_label("vitamin b12"), "Vitamin B12");
        assert_eq!(nutrient_label("anemia"), "Iron / Folate / Vitamin B12");
        assert_eq!(nutrient_label("iron"), "Iron");
    }
}
