use serde::{Deserialize, Serialize};

/// Coarse three-level classification of a recipe's expected blood-glucose impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlycemicBand {
    #[serde(rename = "Low GL")]
    Low,
    #[serde(rename = "Moderate GL")]
    Moderate,
    #[serde(rename = "High GL")]
    High,
}

impl GlycemicBand {
    pub fn label(self) -> &'static str {
        match self {
            GlycemicBand::Low => "Low GL",
            GlycemicBand::Moderate => "Moderate GL",
            GlycemicBand::High => "High GL",
        }
    }
}

impl std::fmt::Display for GlycemicBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Physiological concern that narrows and biases retrieval and scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomFocus {
    InsulinSpike,
    Bloating,
    Fatigue,
    Acne,
    PeriodCramps,
    SugarCravings,
}

impl SymptomFocus {
    pub fn wire_name(self) -> &'static str {
        match self {
            SymptomFocus::InsulinSpike => "insulin_spike",
            SymptomFocus::Bloating => "bloating",
            SymptomFocus::Fatigue => "fatigue",
            SymptomFocus::Acne => "acne",
            SymptomFocus::PeriodCramps => "period_cramps",
            SymptomFocus::SugarCravings => "sugar_cravings",
        }
    }

    /// Parses the wire name; `none`, empty, and unknown values map to `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "insulin_spike" => Some(SymptomFocus::InsulinSpike),
            "bloating" => Some(SymptomFocus::Bloating),
            "fatigue" => Some(SymptomFocus::Fatigue),
            "acne" => Some(SymptomFocus::Acne),
            "period_cramps" => Some(SymptomFocus::PeriodCramps),
            "sugar_cravings" => Some(SymptomFocus::SugarCravings),
            _ => None,
        }
    }
}

/// One craving submission. Built once per request and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CravingRequest {
    pub desire: String,
    pub selected_intent: String,
    pub use_home_ingredients: bool,
    pub home_ingredients: Vec<String>,
    pub min_calories: Option<f64>,
    pub max_calories: Option<f64>,
    pub min_protein: Option<f64>,
    pub max_protein: Option<f64>,
    pub symptom_focus: Option<SymptomFocus>,
}

fn finite(bound: Option<f64>) -> Option<f64> {
    bound.filter(|value| value.is_finite())
}

impl CravingRequest {
    // Non-finite caller input counts as "no bound supplied".
    pub fn min_calories(&self) -> Option<f64> {
        finite(self.min_calories)
    }

    pub fn max_calories(&self) -> Option<f64> {
        finite(self.max_calories)
    }

    pub fn min_protein(&self) -> Option<f64> {
        finite(self.min_protein)
    }

    pub fn max_protein(&self) -> Option<f64> {
        finite(self.max_protein)
    }

    pub fn has_calorie_bounds(&self) -> bool {
        self.min_calories().is_some() || self.max_calories().is_some()
    }

    pub fn has_protein_bounds(&self) -> bool {
        self.min_protein().is_some() || self.max_protein().is_some()
    }

    pub fn has_nutrition_bounds(&self) -> bool {
        self.has_calorie_bounds() || self.has_protein_bounds()
    }
}

/// Caller-supplied health profile. The pipeline treats it as read-only context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerProfile {
    pub region: String,
    pub focus: String,
    pub dietary_restrictions: Vec<String>,
    pub allergy_notes: String,
    pub deficiencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicronutrientEntry {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientHighlight {
    pub nutrient: String,
    pub value: Option<f64>,
    pub unit: String,
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapSuggestion {
    pub from: String,
    pub to: String,
    pub reason: String,
}

/// The pipeline's main artifact. Created once by `adapt` and mutated only by
/// the chat refiner, in place, keeping its corpus identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptedRecipe {
    /// Corpus id; `0` means the record has no stable corpus identity and
    /// must never be hydrated through id-keyed lookups.
    pub id: u64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub prep_time: Option<f64>,
    pub cook_time: Option<f64>,
    pub total_time: Option<f64>,
    pub region: String,
    pub instructions: Vec<String>,
    pub micronutrients: Vec<MicronutrientEntry>,
    pub nutrient_highlight: Option<NutrientHighlight>,
    pub glycemic_load_band: GlycemicBand,
    pub glycemic_load_note: String,
    pub swap_suggestions: Vec<SwapSuggestion>,
    pub flavor_satisfaction: i32,
    pub pcos_safety: i32,
    pub tags: Vec<String>,
}

impl AdaptedRecipe {
    /// Appends a tag unless it is already present.
    pub fn add_tag(&mut self, tag: &str) {
        if !self.tags.iter().any(|existing| existing == tag) {
            self.tags.push(tag.to_string());
        }
    }
}

/// Structured diff between the original craving context and the adapted recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeChanges {
    pub original_items: Vec<String>,
    pub adapted_items: Vec<String>,
    pub triggers_addressed: Vec<String>,
    pub why_it_works: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroMealPlanDay {
    pub day: String,
    pub meals: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_bounds_are_treated_as_absent() {
        let request = CravingRequest {
            min_calories: Some(f64::NAN),
            max_calories: Some(f64::INFINITY),
            min_protein: Some(20.0),
            ..Default::default()
        };
        assert_eq!(request.min_calories(), None);
        assert_eq!(request.max_calories(), None);
        assert_eq!(request.min_protein(), Some(20.0));
        assert!(request.has_nutrition_bounds());
    }

    #[test]
    fn add_tag_is_idempotent() {
        let mut recipe = AdaptedRecipe {
            id: 1,
            name: "Test".to_string(),
            description: String::new(),
            image_url: None,
            calories: None,
            protein: None,
            carbs: None,
            prep_time: None,
            cook_time: None,
            total_time: None,
            region: "Global".to_string(),
            instructions: vec![],
            micronutrients: vec![],
            nutrient_highlight: None,
            glycemic_load_band: GlycemicBand::Moderate,
            glycemic_load_note: String::new(),
            swap_suggestions: vec![],
            flavor_satisfaction: 82,
            pcos_safety: 85,
            tags: vec![],
        };
        recipe.add_tag("Low Carb");
        recipe.add_tag("Low Carb");
        assert_eq!(recipe.tags, vec!["Low Carb"]);
    }

    #[test]
    fn symptom_focus_round_trips_through_wire_names() {
        assert_eq!(SymptomFocus::parse("insulin_spike"), Some(SymptomFocus::InsulinSpike));
        assert_eq!(SymptomFocus::parse("none"), None);
        assert_eq!(SymptomFocus::parse(""), None);
        assert_eq!(SymptomFocus::PeriodCramps.wire_name(), "period_cramps");
    }
}
