//! Two-day micro meal plans. The corpus meal-plan endpoint is tried first;
//! when it fails or returns nothing usable, a plan is synthesized from titles
//! gathered across the search channels.

use serde_json::{json, Value};

use crate::api_connection::connection::RecipeCorpus;
use crate::api_connection::envelope::recipe_array;
use crate::craving_signals::{build_search_signals, intent_terms, symptom_config, symptom_terms};
use crate::recipe_model::{CravingRequest, MicroMealPlanDay, PlannerProfile, SymptomFocus};
use crate::recipe_scoring::{filter_by_intent, filter_by_symptom};
use crate::text_processing::unique;

fn record_title(record: &Value) -> Option<String> {
    ["Recipe_title", "recipe_title", "title"]
        .iter()
        .find_map(|key| record.get(*key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
}

fn extract_recipe_titles(records: &[Value]) -> Vec<String> {
    unique(records.iter().filter_map(record_title))
}

/// Flattens a direct meal-plan response. Day entries are any keys starting
/// with "day" (case-insensitive), each holding meal objects with a title.
pub fn flatten_meal_plan(payload: &Value) -> Vec<MicroMealPlanDay> {
    let Some(root) = payload.as_object() else {
        return Vec::new();
    };
    let data = match root.get("payload").and_then(Value::as_object) {
        Some(inner) => inner,
        None => root,
    };

    data.iter()
        .filter(|(key, _)| key.to_lowercase().starts_with("day"))
        .map(|(day, value)| {
            let meals = value
                .as_object()
                .map(|day_record| {
                    day_record
                        .values()
                        .filter_map(record_title)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            MicroMealPlanDay {
                day: day.clone(),
                meals,
            }
        })
        .collect()
}

/// Pads the gathered titles (cycling) to six meals and splits them into two
/// days of three.
pub fn fallback_plan_from_titles(titles: &[String]) -> Vec<MicroMealPlanDay> {
    if titles.is_empty() {
        return Vec::new();
    }
    let mut padded = titles.to_vec();
    while padded.len() < 6 {
        padded.push(padded[padded.len() % titles.len()].clone());
    }
    vec![
        MicroMealPlanDay {
            day: "Day 1".to_string(),
            meals: padded[0..3].to_vec(),
        },
        MicroMealPlanDay {
            day: "Day 2".to_string(),
            meals: padded[3..6].to_vec(),
        },
    ]
}

fn scoped_titles(
    records: Vec<Value>,
    intents: &[String],
    symptom_focus: Option<SymptomFocus>,
    cap: usize,
) -> Vec<String> {
    let scoped = filter_by_symptom(filter_by_intent(records, intents), symptom_focus);
    let mut titles = extract_recipe_titles(&scoped);
    titles.truncate(cap);
    titles
}

/// Gathers candidate titles for the fallback plan across the title, flavor,
/// carb, region, and diet channels plus the daily pick.
async fn fetch_meal_plan_candidates(
    corpus: &dyn RecipeCorpus,
    request: &CravingRequest,
    profile: &PlannerProfile,
) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    let signals = build_search_signals(&request.desire);
    let intents = intent_terms(request);
    let symptom = symptom_config(request.symptom_focus);
    let symptoms: Vec<String> = symptom.map(symptom_terms).unwrap_or_default();

    let mut title_queries = unique(
        std::iter::once(request.desire.clone())
            .chain(signals.title_queries.iter().cloned())
            .chain(signals.keyword_queries.iter().cloned())
            .chain(symptoms.iter().cloned()),
    );
    title_queries.truncate(6);
    for title in &title_queries {
        let by_title = corpus.recipes_by_title(title).await;
        titles.extend(scoped_titles(by_title, &intents, request.symptom_focus, 6));
    }

    let mut flavor_queries = unique(
        std::iter::once(request.selected_intent.clone())
            .chain(signals.flavor_queries.iter().cloned())
            .chain(std::iter::once(request.desire.clone()))
            .chain(symptoms.iter().cloned()),
    );
    flavor_queries.truncate(5);
    for flavor in &flavor_queries {
        let by_flavor = corpus
            .recipes_by_ingredients_flavor(None, Some(flavor))
            .await;
        titles.extend(scoped_titles(by_flavor, &intents, request.symptom_focus, 6));
    }

    if let Some(max_carbs) = symptom.and_then(|config| config.max_carbs) {
        let by_carbs = corpus.recipes_by_max_carbs(max_carbs).await;
        titles.extend(scoped_titles(by_carbs, &intents, request.symptom_focus, 8));
    }

    let region_records = corpus.recipes_by_region_diet(&profile.region).await;
    titles.extend(scoped_titles(
        region_records,
        &intents,
        request.symptom_focus,
        8,
    ));
    for region in &signals.region_queries {
        let region_records = corpus.recipes_by_region_diet(region).await;
        titles.extend(scoped_titles(
            region_records,
            &intents,
            request.symptom_focus,
            8,
        ));
    }

    if let Some(primary_diet) = profile.dietary_restrictions.first() {
        let diet_records = corpus.recipes_by_recipe_diet(primary_diet).await;
        titles.extend(scoped_titles(
            diet_records,
            &intents,
            request.symptom_focus,
            8,
        ));
    }

    if let Some(body) = corpus.recipe_of_day().await {
        let mut daily = extract_recipe_titles(&recipe_array(&body));
        daily.truncate(4);
        titles.extend(daily);
    }

    unique(titles)
}

/// Builds the POST payload for the direct meal-plan endpoint.
pub fn meal_plan_payload(request: &CravingRequest, profile: &PlannerProfile) -> Value {
    let symptom = symptom_config(request.symptom_focus);
    let preference = match symptom {
        Some(config) => format!("{}; {}", profile.focus, config.label),
        None => profile.focus.clone(),
    };
    json!({
        "craving": request.desire,
        "region_diet": profile.region,
        "recipe_diet": profile.dietary_restrictions.join(","),
        "pantry": request.home_ingredients,
        "preference": preference,
        "symptom_focus": request.symptom_focus.map(|focus| focus.wire_name()).unwrap_or(""),
        "days": 2,
    })
}

/// Fetches a two-day plan, preferring the direct endpoint and falling back to
/// a synthesized plan from gathered titles.
pub async fn fetch_micro_meal_plan(
    corpus: &dyn RecipeCorpus,
    request: &CravingRequest,
    profile: &PlannerProfile,
) -> Vec<MicroMealPlanDay> {
    let payload = meal_plan_payload(request, profile);
    if let Some(response) = corpus.meal_plan(&payload).await {
        let direct_plan = flatten_meal_plan(&response);
        if !direct_plan.is_empty() {
            return direct_plan;
        }
    }

    let fallback_titles = fetch_meal_plan_candidates(corpus, request, profile).await;
    fallback_plan_from_titles(&fallback_titles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_plan_is_flattened_from_day_keys() {
        let payload = json!({
            "payload": {
                "day1": {
                    "breakfast": {"Recipe_title": "Masala Oats"},
                    "lunch": {"recipe_title": "Dal Bowl"},
                    "dinner": {"title": "Paneer Wrap"}
                },
                "day2": {
                    "breakfast": {"title": "Ragi Dosa"}
                },
                "meta": {"days": 2}
            }
        });
        let plan = flatten_meal_plan(&payload);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].meals, vec!["Masala Oats", "Dal Bowl", "Paneer Wrap"]);
        assert_eq!(plan[1].meals, vec!["Ragi Dosa"]);
    }

    #[test]
    fn non_object_payload_flattens_to_empty() {
        assert!(flatten_meal_plan(&json!(null)).is_empty());
        assert!(flatten_meal_plan(&json!([1, 2])).is_empty());
        assert!(flatten_meal_plan(&json!({"payload": {}})).is_empty());
    }

    #[test]
    fn fallback_plan_pads_short_title_lists_by_cycling() {
        let titles = vec!["Oats Bowl".to_string(), "Dal Chilla".to_string()];
        let plan = fallback_plan_from_titles(&titles);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].day, "Day 1");
        assert_eq!(plan[1].day, "Day 2");
        let all: Vec<&String> = plan.iter().flat_map(|day| day.meals.iter()).collect();
        assert_eq!(all.len(), 6);
        assert!(all.iter().all(|meal| titles.contains(meal)));
    }

    #[test]
    fn fallback_plan_with_no_titles_is_empty() {
        assert!(fallback_plan_from_titles(&[]).is_empty());
    }

    #[test]
    fn payload_includes_symptom_label_in_preference() {
        let request = CravingRequest {
            desire: "noodles".to_string(),
            selected_intent: String::new(),
            use_home_ingredients: false,
            home_ingredients: vec!["spinach".to_string()],
            min_calories: None,
            max_calories: None,
            min_protein: None,
            max_protein: None,
            symptom_focus: Some(SymptomFocus::Fatigue),
        };
        let profile = PlannerProfile {
            region: "Indian".to_string(),
            focus: "hormone balance".to_string(),
            dietary_restrictions: vec!["Vegetarian".to_string(), "Gluten Free".to_string()],
            allergy_notes: String::new(),
            deficiencies: Vec::new(),
        };
        let payload = meal_plan_payload(&request, &profile);
        assert_eq!(payload["craving"], "noodles");
        assert_eq!(payload["recipe_diet"], "Vegetarian,Gluten Free");
        assert_eq!(payload["preference"], "hormone balance; Fatigue Support");
        assert_eq!(payload["symptom_focus"], "fatigue");
        assert_eq!(payload["days"], 2);
    }
}
