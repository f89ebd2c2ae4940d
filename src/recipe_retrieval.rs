//! The retrieval cascade: a strictly ordered, short-circuiting sequence of
//! query strategies against the corpus. Earlier stages are higher precision
//! (explicit nutrition and symptom targeting); later stages trade precision
//! for recall. A later stage never runs once an earlier one yields
//! candidates — this is a deliberate precision-over-latency trade-off.

use log::debug;
use serde_json::Value;

use crate::api_connection::connection::RecipeCorpus;
use crate::api_connection::envelope::recipe_array;
use crate::craving_signals::{
    build_search_signals, intent_terms, symptom_config, symptom_terms,
};
use crate::recipe_model::{CravingRequest, PlannerProfile};
use crate::recipe_scoring::{
    apply_nutrition_filters, dedupe_records, filter_by_intent, filter_by_symptom, raw_title,
    title_word_match_count,
};
use crate::text_processing::unique;

/// Runs the cascade until a stage yields a non-empty candidate set.
///
/// Stage order: nutrition bounds, symptom carb ceiling, pantry, title search,
/// keyword search, flavor search, region search, then "recipe of the day" —
/// unless an intent was inferred, in which case an empty result is returned
/// rather than silently substituting an unrelated fallback.
pub async fn fetch_candidate_recipes(
    corpus: &dyn RecipeCorpus,
    request: &CravingRequest,
    profile: &PlannerProfile,
) -> Vec<Value> {
    let desire = request.desire.trim();
    let pantry_text = request.home_ingredients.join(",");
    let signals = build_search_signals(desire);
    let intents = intent_terms(request);
    let symptom = symptom_config(request.symptom_focus);
    let symptoms: Vec<String> = symptom.map(symptom_terms).unwrap_or_default();

    let mut title_queries = unique(
        signals
            .title_queries
            .iter()
            .chain(symptoms.iter())
            .cloned(),
    );
    title_queries.truncate(8);
    let mut keyword_queries = unique(
        signals
            .keyword_queries
            .iter()
            .chain(signals.flavor_queries.iter())
            .chain(symptoms.iter())
            .cloned(),
    );
    keyword_queries.truncate(8);

    // Stage 1: explicit calorie/protein bounds.
    if request.has_nutrition_bounds() {
        let mut nutrition_candidates = Vec::new();
        if request.has_calorie_bounds() {
            nutrition_candidates.extend(
                corpus
                    .recipes_by_calories(request.min_calories(), request.max_calories())
                    .await,
            );
        }
        if request.has_protein_bounds() {
            nutrition_candidates.extend(
                corpus
                    .recipes_by_protein_range(request.min_protein(), request.max_protein())
                    .await,
            );
        }

        let filtered = filter_by_symptom(
            apply_nutrition_filters(dedupe_records(nutrition_candidates), request),
            request.symptom_focus,
        );
        if !filtered.is_empty() {
            debug!("cascade: nutrition bounds stage matched {}", filtered.len());
            if !desire.is_empty() {
                let title_matched: Vec<Value> = filtered
                    .iter()
                    .filter(|record| title_word_match_count(&raw_title(record), desire) > 0)
                    .cloned()
                    .collect();
                if !title_matched.is_empty() {
                    return title_matched;
                }
            }
            return filtered;
        }
    }

    // Stage 2: symptom-defined carb ceiling.
    if let Some(max_carbs) = symptom.and_then(|config| config.max_carbs) {
        let low_carb = apply_nutrition_filters(
            corpus.recipes_by_max_carbs(max_carbs).await,
            request,
        );
        let scoped = filter_by_symptom(
            filter_by_intent(low_carb, &intents),
            request.symptom_focus,
        );
        if !scoped.is_empty() {
            debug!("cascade: carb ceiling stage matched {}", scoped.len());
            return scoped;
        }
    }

    // Stage 3: pantry-bounded searches.
    if request.use_home_ingredients && !request.home_ingredients.is_empty() {
        let pantry_flavors = unique(
            std::iter::once(desire.to_string())
                .chain(signals.flavor_queries.iter().cloned())
                .chain(symptoms.iter().cloned()),
        );
        for flavor in &pantry_flavors {
            let list = apply_nutrition_filters(
                corpus
                    .recipes_by_ingredients_flavor(Some(&pantry_text), Some(flavor))
                    .await,
                request,
            );
            let scoped =
                filter_by_symptom(filter_by_intent(list, &intents), request.symptom_focus);
            if !scoped.is_empty() {
                return scoped;
            }
        }
        let pantry_only = apply_nutrition_filters(
            corpus
                .recipes_by_ingredients_flavor(Some(&pantry_text), None)
                .await,
            request,
        );
        let scoped =
            filter_by_symptom(filter_by_intent(pantry_only, &intents), request.symptom_focus);
        if !scoped.is_empty() {
            return scoped;
        }
    }

    // Stage 4: title search.
    for title_query in &title_queries {
        let list = apply_nutrition_filters(corpus.recipes_by_title(title_query).await, request);
        let scoped = filter_by_symptom(filter_by_intent(list, &intents), request.symptom_focus);
        if !scoped.is_empty() {
            debug!("cascade: title query '{}' matched {}", title_query, scoped.len());
            return scoped;
        }
    }

    // Stage 5: keyword/flavor-channel search.
    for keyword_query in &keyword_queries {
        let list = apply_nutrition_filters(
            corpus
                .recipes_by_ingredients_flavor(None, Some(keyword_query))
                .await,
            request,
        );
        let scoped = filter_by_symptom(filter_by_intent(list, &intents), request.symptom_focus);
        if !scoped.is_empty() {
            return scoped;
        }
    }

    // Stage 6: flavor-term search.
    for flavor_query in unique(signals.flavor_queries.iter().chain(symptoms.iter()).cloned()) {
        let list = apply_nutrition_filters(
            corpus
                .recipes_by_ingredients_flavor(None, Some(&flavor_query))
                .await,
            request,
        );
        let scoped = filter_by_symptom(filter_by_intent(list, &intents), request.symptom_focus);
        if !scoped.is_empty() {
            return scoped;
        }
    }

    // Stage 7: regions inferred from the craving, then the profile region.
    let regions = unique(
        signals
            .region_queries
            .iter()
            .cloned()
            .chain(std::iter::once(profile.region.clone())),
    );
    for region in &regions {
        let list =
            apply_nutrition_filters(corpus.recipes_by_region_diet(region).await, request);
        let scoped = filter_by_symptom(filter_by_intent(list, &intents), request.symptom_focus);
        if !scoped.is_empty() {
            return scoped;
        }
    }

    // Stage 8: an explicitly requested intent must not silently fall back to
    // an unrelated recipe of the day.
    if !intents.is_empty() {
        debug!("cascade: intent requested but nothing matched, returning empty");
        return Vec::new();
    }

    // Stage 9: last-resort daily pick.
    let recipe_of_day = corpus
        .recipe_of_day()
        .await
        .map(|body| recipe_array(&body))
        .unwrap_or_default();
    filter_by_symptom(
        apply_nutrition_filters(recipe_of_day, request),
        request.symptom_focus,
    )
}
