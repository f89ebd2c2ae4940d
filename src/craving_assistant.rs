//! Lightweight craving assistant: quick recipe ideas for a craving right now,
//! flavor-compatible alternatives, PCOS-friendly fallback snacks, craving
//! history trends, and short contextual guidance lines.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::api_connection::connection::RecipeCorpus;
use crate::api_connection::envelope::likely_foods;
use crate::recipe_scoring::raw_title;
use crate::text_processing::{normalize_query, to_singular, unique};

const SWEET_TOKENS: &[&str] = &[
    "sweet", "chocolate", "cake", "dessert", "cookie", "pastry", "ice cream", "sugar",
];

const CUISINE_TO_REGION: &[(&str, &str)] = &[
    ("indian", "Indian"),
    ("mexican", "Mexican"),
    ("italian", "Italian"),
    ("chinese", "Chinese"),
    ("thai", "Thai"),
    ("japanese", "Japanese"),
    ("korean", "Korean"),
    ("mediterranean", "Mediterranean"),
    ("south indian", "South Indian"),
];

const HISTORY_CAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    QuickSnack,
    FullMeal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietType {
    Veg,
    NonVeg,
    Egg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
    Unsure,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantPreferences {
    pub meal_type: Option<MealType>,
    pub diet_type: Option<DietType>,
    pub avoid_dairy_gluten: Option<bool>,
    pub cycle_phase: Option<CyclePhase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CravingHistoryItem {
    pub craving: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTrend {
    pub top: Vec<(String, usize)>,
    pub repeated_sweet_count: usize,
}

fn is_sweet(normalized: &str) -> bool {
    SWEET_TOKENS.iter().any(|token| normalized.contains(token))
}

/// Buckets the local hour into morning / afternoon / night.
pub fn day_period<T: Timelike>(now: &T) -> DayPeriod {
    match now.hour() {
        0..=11 => DayPeriod::Morning,
        12..=17 => DayPeriod::Afternoon,
        _ => DayPeriod::Night,
    }
}

fn map_region_from_craving(craving: &str) -> Option<&'static str> {
    let normalized = normalize_query(craving);
    CUISINE_TO_REGION
        .iter()
        .find(|(token, _)| normalized.contains(token))
        .map(|(_, region)| *region)
}

/// Expands a craving into at most six search terms, shaped by time of day
/// and the user's preferences.
pub fn build_recipe_queries(
    craving: &str,
    period: DayPeriod,
    prefs: &AssistantPreferences,
) -> Vec<String> {
    let normalized = normalize_query(craving);
    let mut terms = vec![normalized.clone(), to_singular(&normalized)];

    terms.push(
        match period {
            DayPeriod::Morning => "breakfast",
            DayPeriod::Afternoon => "lunch",
            DayPeriod::Night => "snack",
        }
        .to_string(),
    );

    match prefs.meal_type {
        Some(MealType::QuickSnack) => terms.push("snack".to_string()),
        Some(MealType::FullMeal) => terms.push("meal".to_string()),
        None => {}
    }
    match prefs.diet_type {
        Some(DietType::Veg) => terms.push("vegetarian".to_string()),
        Some(DietType::Egg) => terms.push("egg".to_string()),
        Some(DietType::NonVeg) => terms.push("protein".to_string()),
        None => {}
    }
    if prefs.avoid_dairy_gluten == Some(true) {
        terms.push("dairy free".to_string());
        terms.push("gluten free".to_string());
    }

    let mut queries = unique(terms);
    queries.truncate(6);
    queries
}

/// Quick recipe titles for the craving, searched per query across the flavor
/// and title channels plus an inferred cuisine region. Capped at 8.
pub async fn fetch_craving_recipes(
    corpus: &dyn RecipeCorpus,
    craving: &str,
    period: DayPeriod,
    prefs: &AssistantPreferences,
) -> Vec<String> {
    let queries = build_recipe_queries(craving, period, prefs);
    let mut titles: Vec<String> = Vec::new();

    for query in &queries {
        let by_flavor = corpus.recipes_by_ingredients_flavor(None, Some(query)).await;
        titles.extend(by_flavor.iter().map(raw_title));
        let by_title = corpus.recipes_by_title(query).await;
        titles.extend(by_title.iter().map(raw_title));
    }

    if let Some(region) = map_region_from_craving(craving) {
        let by_region = corpus.recipes_by_region_diet(region).await;
        titles.extend(by_region.iter().map(raw_title));
    }

    let mut titles = unique(titles);
    titles.truncate(8);
    titles
}

/// Flavor-compatible alternative foods, preferring the alias channel and
/// falling back to the entity search. Capped at 8.
pub async fn fetch_flavor_alternatives(corpus: &dyn RecipeCorpus, craving: &str) -> Vec<String> {
    let normalized = normalize_query(craving);
    if normalized.is_empty() {
        return Vec::new();
    }

    if let Some(alias_body) = corpus.flavor_pairings_by_alias(&normalized).await {
        let mut options = likely_foods(&alias_body);
        if !options.is_empty() {
            options.truncate(8);
            return options;
        }
    }

    let entity_body = corpus.flavor_entities_by_name(&normalized, 0, 20).await;
    let mut options = entity_body
        .map(|body| likely_foods(&body))
        .unwrap_or_default();
    options.truncate(8);
    options
}

/// Offline fallback snack ideas keyed on the craving's flavor direction.
pub fn pcos_friendly_fallbacks(
    craving: &str,
    period: DayPeriod,
    prefs: &AssistantPreferences,
) -> Vec<String> {
    let normalized = normalize_query(craving);
    let base: &[&str] = if normalized.contains("chocolate") {
        &[
            "roasted almonds",
            "walnuts",
            "dark chocolate (70%+)",
            "cocoa chia pudding",
            "peanut butter oats",
        ]
    } else if normalized.contains("sweet") {
        &[
            "nuts and seeds mix",
            "greek yogurt with berries",
            "apple with peanut butter",
            "dates with nuts",
        ]
    } else if normalized.contains("salty") {
        &[
            "roasted chana",
            "makhana",
            "hummus with veggies",
            "paneer tikka bites",
        ]
    } else {
        &[
            "roasted nuts",
            "seed mix",
            "greek yogurt bowl",
            "fruit + protein snack",
        ]
    };

    let mut items: Vec<String> = base.iter().map(|item| item.to_string()).collect();
    if period == DayPeriod::Night {
        items.push("low-GI bedtime snack: chia + yogurt bowl".to_string());
    }

    if prefs.avoid_dairy_gluten == Some(true) {
        let mut rewritten: Vec<String> = items
            .iter()
            .map(|item| {
                item.replace("greek yogurt", "coconut yogurt")
                    .replace("yogurt", "dairy-free yogurt")
            })
            .filter(|item| !item.to_lowercase().contains("oats"))
            .collect();
        rewritten.truncate(6);
        return rewritten;
    }

    let mut items = unique(items);
    items.truncate(6);
    items
}

/// One-line explanation of why the craving might be happening.
pub fn why_craving_hint(craving: &str, period: DayPeriod, cycle_phase: Option<CyclePhase>) -> String {
    let normalized = normalize_query(craving);
    let sweet = is_sweet(&normalized);

    if sweet && period == DayPeriod::Night {
        return "Sweet cravings at night can be linked to blood sugar dips and stress hormones. Add protein + fiber with your treat.".to_string();
    }
    if sweet {
        return "Sweet cravings can increase with insulin swings. Pair the craving with protein/fiber to avoid a crash.".to_string();
    }
    match cycle_phase {
        Some(CyclePhase::Luteal) => {
            "In luteal phase, cravings can spike due to hormonal shifts. Balanced carbs + protein can help.".to_string()
        }
        Some(CyclePhase::Menstrual) => {
            "During period days, energy dips can increase comfort-food cravings. Iron-rich options can help.".to_string()
        }
        _ => "Cravings are normal in PCOS. The goal is satisfying taste while keeping glucose steadier.".to_string(),
    }
}

pub fn time_based_suggestion(period: DayPeriod) -> String {
    match period {
        DayPeriod::Morning => {
            "Morning tip: start with protein + fiber to reduce later cravings.".to_string()
        }
        DayPeriod::Afternoon => {
            "Afternoon tip: choose balanced meals to avoid evening sugar cravings.".to_string()
        }
        DayPeriod::Night => {
            "Night tip: prefer low-GI snacks with protein/fiber for better overnight stability."
                .to_string()
        }
    }
}

pub fn cycle_phase_suggestion(phase: Option<CyclePhase>) -> String {
    match phase {
        None | Some(CyclePhase::Unsure) => {
            "Cycle-phase tip: track phase to get more precise craving guidance.".to_string()
        }
        Some(CyclePhase::Menstrual) => {
            "Menstrual phase: focus on iron-rich and anti-inflammatory choices.".to_string()
        }
        Some(CyclePhase::Follicular) => {
            "Follicular phase: energy usually rises, good time for higher-protein meals.".to_string()
        }
        Some(CyclePhase::Ovulation) => {
            "Ovulation phase: keep meals light but protein-adequate to stay stable.".to_string()
        }
        Some(CyclePhase::Luteal) => {
            "Luteal phase: cravings are common, pair carbs with protein/fiber.".to_string()
        }
    }
}

/// Prepends the normalized craving to the history, newest first, capped.
pub fn record_craving(history: &mut Vec<CravingHistoryItem>, craving: &str, now: DateTime<Utc>) {
    history.insert(
        0,
        CravingHistoryItem {
            craving: normalize_query(craving),
            timestamp: now,
        },
    );
    history.truncate(HISTORY_CAP);
}

/// Top-3 cravings over the trailing week plus how often a sweet craving
/// repeated in that window.
pub fn weekly_craving_trends(history: &[CravingHistoryItem], now: DateTime<Utc>) -> WeeklyTrend {
    let week_ago = now - Duration::days(7);
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut repeated_sweet_count = 0;

    for item in history.iter().filter(|item| item.timestamp >= week_ago) {
        match counts.iter_mut().find(|(craving, _)| *craving == item.craving) {
            Some((_, count)) => *count += 1,
            None => counts.push((item.craving.clone(), 1)),
        }
        if is_sweet(&item.craving) {
            repeated_sweet_count += 1;
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(3);
    WeeklyTrend {
        top: counts,
        repeated_sweet_count,
    }
}

/// Connects reported deficiencies with the current craving pattern. Returns
/// `None` when no nudge applies.
pub fn nutrient_linked_nudge(
    deficiencies: &[String],
    craving: &str,
    repeated_sweet_count: usize,
) -> Option<String> {
    let normalized_craving = normalize_query(craving);
    let normalized_defs: Vec<String> = deficiencies
        .iter()
        .map(|item| normalize_query(item))
        .collect();
    let sweet = is_sweet(&normalized_craving);

    if normalized_defs.iter().any(|item| item.contains("iron")) && sweet && repeated_sweet_count >= 2
    {
        return Some(
            "Nudge: Since you report iron deficiency and repeated sweet cravings, try iron-rich sweet-compatible options (dates + nuts, sesame laddoo with low sugar)."
                .to_string(),
        );
    }
    if normalized_defs.iter().any(|item| item.contains("vitamin d")) && sweet {
        return Some(
            "Nudge: Add Vitamin D supportive foods with your craving meal and include protein/fat for better satiety."
                .to_string(),
        );
    }
    if normalized_defs.iter().any(|item| item.contains("b12")) && sweet {
        return Some(
            "Nudge: Pair sweet cravings with B12/protein-rich choices to reduce energy dips."
                .to_string(),
        );
    }
    None
}
