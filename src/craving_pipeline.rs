//! End-to-end craving adaptation: retrieval, scoring, deficiency-aware
//! reranking, hydration, presentation scoring, and the change summary.

use futures::future::join_all;
use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::api_connection::connection::RecipeCorpus;
use crate::change_explainer::build_changes;
use crate::craving_signals::{deficiency_targets, intent_terms, nutrient_label, symptom_config};
use crate::meal_planner::fetch_micro_meal_plan;
use crate::recipe_hydrator::{
    build_nutrient_highlight, estimate_glycemic_load, flavor_satisfaction_score,
    flavor_swap_suggestions, hydrate_recipe, normalize_recipe, pcos_safety_score,
};
use crate::recipe_model::{
    AdaptedRecipe, CravingRequest, MicroMealPlanDay, PlannerProfile, RecipeChanges,
};
use crate::recipe_scoring::{
    deficiency_boosts, filter_by_intent, micronutrient_score, pantry_match_count, score_recipe,
};

const DEFAULT_RERANK_DEPTH: usize = 10;

#[derive(Debug, Error)]
pub enum AdaptError {
    #[error("No matching recipe found for this craving or intent. Try a related keyword.")]
    NoMatch,
    #[error("Unable to adapt recipe right now.")]
    SelectionFailed,
}

#[derive(Debug, Clone)]
pub struct AdaptResult {
    pub recipe: AdaptedRecipe,
    pub changes: RecipeChanges,
}

/// Orchestrates the adaptation flow over a corpus implementation.
pub struct CravingPipeline<'a> {
    corpus: &'a dyn RecipeCorpus,
    rerank_depth: usize,
}

impl<'a> CravingPipeline<'a> {
    pub fn new(corpus: &'a dyn RecipeCorpus) -> Self {
        Self {
            corpus,
            rerank_depth: DEFAULT_RERANK_DEPTH,
        }
    }

    /// How many top-ranked candidates get a micronutrient lookup when the
    /// profile reports deficiencies.
    pub fn with_rerank_depth(mut self, depth: usize) -> Self {
        self.rerank_depth = depth;
        self
    }

    /// Adapts the best-matching corpus recipe to the craving and profile.
    pub async fn adapt(
        &self,
        request: &CravingRequest,
        profile: &PlannerProfile,
    ) -> Result<AdaptResult, AdaptError> {
        let intents = intent_terms(request);
        let targets = deficiency_targets(&profile.deficiencies);

        let candidates =
            crate::recipe_retrieval::fetch_candidate_recipes(self.corpus, request, profile).await;
        if candidates.is_empty() {
            return Err(AdaptError::NoMatch);
        }

        let intent_candidates = filter_by_intent(candidates.clone(), &intents);
        let final_candidates = if intent_candidates.is_empty() {
            candidates
        } else {
            intent_candidates
        };

        let mut scored: Vec<(AdaptedRecipe, f64)> = final_candidates
            .iter()
            .map(|record| {
                let recipe = normalize_recipe(record);
                let pantry_match = pantry_match_count(record, &request.home_ingredients);
                let score = score_recipe(
                    &recipe,
                    pantry_match,
                    &request.desire,
                    &intents,
                    request.symptom_focus,
                );
                (recipe, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        if !targets.is_empty() {
            self.rerank_by_deficiency(&mut scored, &targets).await;
        }

        let mut selected = scored
            .into_iter()
            .next()
            .map(|(recipe, _)| recipe)
            .ok_or(AdaptError::SelectionFailed)?;

        hydrate_recipe(self.corpus, &mut selected).await;
        selected.nutrient_highlight = build_nutrient_highlight(&selected.micronutrients, &targets);

        selected.pcos_safety = pcos_safety_score(selected.protein, selected.carbs);
        selected.flavor_satisfaction = flavor_satisfaction_score(&request.desire);
        let (band, note) = estimate_glycemic_load(selected.carbs, selected.protein);
        selected.glycemic_load_band = band;
        selected.glycemic_load_note = note;

        for restriction in profile.dietary_restrictions.iter().take(2) {
            selected.add_tag(restriction);
        }
        if request.use_home_ingredients {
            selected.add_tag("Pantry-based");
        }
        if let Some(primary) = targets.first() {
            selected.add_tag(&format!("High {} support", nutrient_label(primary)));
        }
        if let Some(symptom) = symptom_config(request.symptom_focus) {
            selected.add_tag(symptom.label);
        }

        let flavor_swaps =
            flavor_swap_suggestions(self.corpus, &request.desire, &selected.name).await;
        selected.swap_suggestions = flavor_swaps.clone();

        let changes = build_changes(request, profile, &selected, &targets, &flavor_swaps);
        Ok(AdaptResult {
            recipe: selected,
            changes,
        })
    }

    /// Looks up micronutrition for the top-ranked candidates and re-sorts by
    /// base score plus a rank-derived boost. Candidates without a corpus id
    /// cannot be looked up and keep their base score.
    async fn rerank_by_deficiency(&self, scored: &mut [(AdaptedRecipe, f64)], targets: &[String]) {
        let depth = self.rerank_depth.min(scored.len());
        let lookups = scored[..depth].iter().map(|(recipe, _)| async move {
            if recipe.id == 0 {
                return (recipe.id, 0.0);
            }
            let micro = self
                .corpus
                .micronutrition_info(recipe.id)
                .await
                .unwrap_or(Value::Null);
            (recipe.id, micronutrient_score(&micro, targets))
        });
        let raw_scores: Vec<(u64, f64)> = join_all(lookups).await;

        let boosts = deficiency_boosts(&raw_scores);
        if boosts.is_empty() {
            return;
        }
        debug!("deficiency rerank boosting {} candidates", boosts.len());
        let boost_for = |id: u64| {
            boosts
                .iter()
                .find(|(boosted_id, _)| *boosted_id == id)
                .map(|(_, boost)| *boost)
                .unwrap_or(0.0)
        };
        scored.sort_by(|a, b| {
            let a_total = a.1 + boost_for(a.0.id);
            let b_total = b.1 + boost_for(b.0.id);
            b_total
                .partial_cmp(&a_total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Two-day micro meal plan for the same request and profile.
    pub async fn meal_plan(
        &self,
        request: &CravingRequest,
        profile: &PlannerProfile,
    ) -> Vec<MicroMealPlanDay> {
        fetch_micro_meal_plan(self.corpus, request, profile).await
    }
}
