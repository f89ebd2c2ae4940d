//! Builds the human-readable before/after summary shown alongside an adapted
//! recipe: what the craving asked for, what the adaptation delivers, and which
//! PCOS triggers the changes address.

use crate::craving_signals::{symptom_config, SymptomConfig};
use crate::recipe_model::{
    AdaptedRecipe, CravingRequest, PlannerProfile, RecipeChanges, SwapSuggestion,
};

fn bound_text(min: Option<f64>, max: Option<f64>, unit: &str) -> String {
    let min_text = min.map(|v| v.to_string()).unwrap_or_else(|| "0".to_string());
    let max_text = max.map(|v| v.to_string()).unwrap_or_else(|| "any".to_string());
    format!("{} - {} {}", min_text, max_text, unit)
}

fn original_items(
    request: &CravingRequest,
    profile: &PlannerProfile,
    deficiency_targets: &[String],
    symptom: Option<&SymptomConfig>,
) -> Vec<String> {
    let mut items = Vec::with_capacity(7);
    items.push(if request.desire.is_empty() {
        "[CRAVE] General craving".to_string()
    } else {
        format!("[CRAVE] {}", request.desire)
    });
    items.push(if request.use_home_ingredients {
        "[PANTRY] Limited to available home ingredients".to_string()
    } else {
        "[PANTRY] No pantry constraint".to_string()
    });
    items.push(if profile.allergy_notes.is_empty() {
        "[ALLERGY] No specific allergy notes".to_string()
    } else {
        format!("[ALLERGY] {}", profile.allergy_notes)
    });
    items.push(if deficiency_targets.is_empty() {
        "[DEFICIENCIES] None selected".to_string()
    } else {
        format!("[DEFICIENCIES] {}", deficiency_targets.join(", "))
    });
    items.push(if request.has_calorie_bounds() {
        format!(
            "[CALORIES] {} target",
            bound_text(request.min_calories(), request.max_calories(), "kcal")
        )
    } else {
        "[CALORIES] No calorie target".to_string()
    });
    items.push(if request.has_protein_bounds() {
        format!(
            "[PROTEIN TARGET] {}",
            bound_text(request.min_protein(), request.max_protein(), "g")
        )
    } else {
        "[PROTEIN TARGET] No protein target".to_string()
    });
    items.push(match symptom {
        Some(config) => format!("[SYMPTOM MODE] {}", config.label),
        None => "[SYMPTOM MODE] Off".to_string(),
    });
    items
}

fn adapted_items(
    recipe: &AdaptedRecipe,
    deficiency_targets: &[String],
    flavor_swaps: &[SwapSuggestion],
) -> Vec<String> {
    let mut items = vec![format!("[RECIPE] {}", recipe.name)];
    items.push(match recipe.protein {
        Some(protein) => format!("[PROTEIN] ~{}g protein supported", protein.round()),
        None => "[PROTEIN] Protein-balanced choice".to_string(),
    });
    items.push(match recipe.carbs {
        Some(carbs) => format!("[CARBS] ~{}g carbs managed", carbs.round()),
        None => "[CARBS] Carb-conscious choice".to_string(),
    });
    if !deficiency_targets.is_empty() {
        items.push(format!(
            "[NUTRIENT PRIORITY] Prioritized higher {} support",
            deficiency_targets.join(", ")
        ));
    }
    items.push(format!("[GL BADGE] {}", recipe.glycemic_load_band.label()));
    for swap in flavor_swaps {
        items.push(format!(
            "[FLAVOR SWAP] {} -> {} ({})",
            swap.from, swap.to, swap.reason
        ));
    }
    items
}

fn triggers_addressed(
    recipe: &AdaptedRecipe,
    deficiency_targets: &[String],
    symptom: Option<&SymptomConfig>,
    flavor_swaps: &[SwapSuggestion],
) -> Vec<String> {
    let mut triggers = Vec::new();
    triggers.push(match recipe.carbs {
        Some(carbs) if carbs > 45.0 => "Reduced high glycemic load".to_string(),
        _ => "Better glucose response support".to_string(),
    });
    triggers.push(match recipe.protein {
        Some(protein) if protein < 20.0 => "Protein quality improved".to_string(),
        _ => "Improved satiety and protein balance".to_string(),
    });
    triggers.push("Inflammation-aware ingredient emphasis".to_string());
    if !deficiency_targets.is_empty() {
        triggers.push(format!(
            "Micronutrient focus: {}",
            deficiency_targets.join(", ")
        ));
    }
    if let Some(config) = symptom {
        triggers.push(format!("Symptom-aware filtering: {}", config.label));
    }
    if !flavor_swaps.is_empty() {
        triggers.push("Taste-preserving swaps based on FlavorDB pairing signals".to_string());
    }
    triggers
}

/// Assembles the full change summary for a selected recipe.
pub fn build_changes(
    request: &CravingRequest,
    profile: &PlannerProfile,
    recipe: &AdaptedRecipe,
    deficiency_targets: &[String],
    flavor_swaps: &[SwapSuggestion],
) -> RecipeChanges {
    let symptom = symptom_config(request.symptom_focus);

    let why_it_works = if deficiency_targets.is_empty() {
        "This adaptation prioritizes steadier carbs, higher satiety, and practical ingredient swaps to better align with PCOS needs."
            .to_string()
    } else {
        format!(
            "This adaptation prioritizes steadier carbs and satiety while explicitly giving higher {} support for your selected deficiencies.",
            deficiency_targets.join(", ")
        )
    };

    RecipeChanges {
        original_items: original_items(request, profile, deficiency_targets, symptom),
        adapted_items: adapted_items(recipe, deficiency_targets, flavor_swaps),
        triggers_addressed: triggers_addressed(recipe, deficiency_targets, symptom, flavor_swaps),
        why_it_works,
    }
}
