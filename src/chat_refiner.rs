//! Rule-based chat refinement over an already adapted recipe. Each rule
//! inspects the lowercased message, mutates the recipe, and records a note;
//! the notes are stitched into a single confirmation reply.

use lazy_static::lazy_static;
use regex::Regex;

use crate::recipe_model::AdaptedRecipe;

lazy_static! {
    static ref SUBSTITUTION_PATTERN: Regex = Regex::new(
        r"(substitute|replace|swap)(?:\s+\w+){0,2}\s+(?:for\s+)?([a-z][a-z\s]{2,30})|(?:substitute|replacement)\s+for\s+([a-z][a-z\s]{2,30})"
    )
    .expect("substitution pattern");
    static ref SERVINGS_PATTERN: Regex =
        Regex::new(r"(\d+)\s*(servings|people|persons|person)").expect("servings pattern");
    static ref WITHOUT_PATTERN: Regex =
        Regex::new(r"without\s+([a-z ]{3,30})").expect("without pattern");
    static ref YOGURT_PATTERN: Regex = Regex::new(r"(?i)yogurt").expect("yogurt pattern");
    static ref MILK_PATTERN: Regex = Regex::new(r"(?i)milk").expect("milk pattern");
    static ref CHEESE_PATTERN: Regex = Regex::new(r"(?i)cheese").expect("cheese pattern");
}

/// Ordered so the first matching key wins for ambiguous targets.
const SUBSTITUTIONS: &[(&str, &[&str])] = &[
    ("chicken", &["tofu", "paneer", "chickpeas", "soy chunks"]),
    ("egg", &["tofu scramble", "chickpea flour batter", "greek yogurt"]),
    ("fish", &["tofu", "tempeh", "mushrooms", "paneer"]),
    ("mutton", &["soy chunks", "jackfruit", "mushrooms", "tofu"]),
    ("beef", &["soy chunks", "mushrooms", "lentils", "tempeh"]),
    ("pork", &["tofu", "mushrooms", "beans", "paneer"]),
    ("shrimp", &["tofu", "mushrooms", "paneer", "chickpeas"]),
    ("prawn", &["tofu", "mushrooms", "paneer", "chickpeas"]),
    ("milk", &["almond milk", "soy milk", "oat milk"]),
    ("cheese", &["hung curd", "tofu", "nutritional yeast", "vegan cheese"]),
    ("butter", &["olive oil", "ghee (small amount)", "avocado oil"]),
    ("cream", &["hung curd", "cashew cream", "greek yogurt"]),
    ("rice", &["millet", "quinoa", "brown rice", "cauliflower rice"]),
    ("sugar", &["stevia", "erythritol", "date puree (small amount)"]),
    ("maida", &["whole wheat flour", "oat flour", "almond flour"]),
];

const TARGET_STOPWORDS: &[&str] = &["in", "this", "recipe", "my", "the", "a", "an"];

fn substitution_target(text: &str) -> Option<String> {
    let captures = SUBSTITUTION_PATTERN.captures(text)?;
    let raw = captures
        .get(2)
        .or_else(|| captures.get(3))
        .map(|m| m.as_str().trim())
        .unwrap_or("");
    if raw.is_empty() {
        return None;
    }
    let cleaned = raw
        .split(' ')
        .filter(|word| !word.is_empty() && !TARGET_STOPWORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ");
    Some(cleaned.trim().to_string())
}

fn matching_substitution(
    target: &str,
    message: &str,
) -> Option<(&'static str, &'static [&'static str])> {
    for (key, options) in SUBSTITUTIONS {
        if target.contains(key) || key.contains(target) {
            return Some((key, options));
        }
    }
    // The regex can capture the replacement side ("substitute chicken for
    // something vegetarian" yields "something vegetarian"), so rescan the
    // whole message for a known ingredient before giving up.
    SUBSTITUTIONS
        .iter()
        .find(|(key, _)| message.contains(key))
        .map(|(key, options)| (*key, *options))
}

fn with_tag(recipe: &mut AdaptedRecipe, tag: &str) {
    recipe.add_tag(tag);
}

/// Applies every matching refinement rule to the recipe in place and returns
/// the chat reply. An unrecognized message leaves the recipe untouched and
/// returns a usage hint.
pub fn refine_recipe(recipe: &mut AdaptedRecipe, user_message: &str) -> String {
    let original_name = recipe.name.clone();
    let text = user_message.trim().to_lowercase();
    let mut notes: Vec<String> = Vec::new();
    let mut suggestions: Vec<String> = Vec::new();

    if let Some(target) = substitution_target(&text) {
        match matching_substitution(&target, &text) {
            Some((key, options)) => {
                let shortlist = options.iter().take(3).copied().collect::<Vec<_>>();
                suggestions.push(format!("For {}, try: {}", key, shortlist.join(", ")));
                with_tag(recipe, &format!("Swap {}", key));
                notes.push(format!("added substitution options for {}", key));
            }
            None => {
                suggestions.push(
                    "I can suggest high-protein swaps: tofu, paneer, chickpeas, soy chunks."
                        .to_string(),
                );
            }
        }
    }

    if let Some(captures) = SERVINGS_PATTERN.captures(&text) {
        if let Ok(servings) = captures[1].parse::<u32>() {
            if servings > 0 {
                with_tag(recipe, &format!("Serves {}", servings));
                notes.push(format!("set servings target to {}", servings));
            }
        }
    }

    if text.contains("more protein")
        || text.contains("high protein")
        || text.contains("increase protein")
    {
        recipe.protein = Some(recipe.protein.unwrap_or(18.0) + 8.0);
        recipe.pcos_safety = (recipe.pcos_safety + 4).min(98);
        with_tag(recipe, "High Protein");
        notes.push("increased protein focus".to_string());
    }

    if text.contains("low carb")
        || text.contains("less carb")
        || text.contains("reduce carbs")
        || text.contains("fewer carbs")
    {
        recipe.carbs = Some((recipe.carbs.unwrap_or(35.0) - 10.0).max(5.0));
        recipe.pcos_safety = (recipe.pcos_safety + 4).min(98);
        with_tag(recipe, "Low Carb");
        notes.push("reduced carb load".to_string());
    }

    if text.contains("dairy free") || text.contains("lactose") || text.contains("without dairy") {
        with_tag(recipe, "Dairy Free");
        if !recipe.instructions.is_empty() {
            recipe.instructions = recipe
                .instructions
                .iter()
                .map(|step| {
                    let step = YOGURT_PATTERN.replace_all(step, "dairy-free yogurt");
                    let step = MILK_PATTERN.replace_all(&step, "almond milk");
                    CHEESE_PATTERN.replace_all(&step, "vegan cheese").into_owned()
                })
                .collect();
        }
        notes.push("added dairy-free substitutions".to_string());
        suggestions.push(
            "Dairy-free options: almond milk, soy milk, coconut yogurt, tofu-based curd."
                .to_string(),
        );
    }

    if text.contains("vegetarian") || text.contains("veg only") {
        with_tag(recipe, "Vegetarian");
        notes.push("set vegetarian preference".to_string());
    }

    if text.contains("vegan") {
        with_tag(recipe, "Vegan");
        notes.push("set vegan preference".to_string());
    }

    if text.contains("spicy") {
        recipe.flavor_satisfaction = (recipe.flavor_satisfaction + 2).min(96);
        with_tag(recipe, "Spicy");
        notes.push("increased spice profile".to_string());
    }

    if text.contains("mild") || text.contains("less spicy") {
        recipe.flavor_satisfaction = (recipe.flavor_satisfaction - 1).max(70);
        with_tag(recipe, "Mild");
        notes.push("reduced spice profile".to_string());
    }

    if let Some(captures) = WITHOUT_PATTERN.captures(&text) {
        let ingredient = captures[1].trim().to_string();
        with_tag(recipe, &format!("No {}", ingredient));
        notes.push(format!("excluded {}", ingredient));
    }

    if notes.is_empty() {
        return "I can help with substitutions and tweaks. Try: \"substitute chicken\", \"make it low carb\", or \"dairy free\".".to_string();
    }

    let mut reply = format!("Done. I {} for \"{}\".", notes.join(", "), original_name);
    if !suggestions.is_empty() {
        reply.push(' ');
        reply.push_str(&suggestions.join(" "));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_hydrator::normalize_recipe;
    use serde_json::json;

    fn sample_recipe() -> AdaptedRecipe {
        let mut recipe = normalize_recipe(&json!({
            "title": "Paneer Tikka Bowl",
            "protein": 22,
            "carbs": 38,
            "region": "Indian"
        }));
        recipe.instructions = vec![
            "Whisk yogurt with spices.".to_string(),
            "Add milk and simmer, then top with cheese.".to_string(),
        ];
        recipe
    }

    #[test]
    fn substitution_request_matches_known_ingredient() {
        let mut recipe = sample_recipe();
        let reply = refine_recipe(&mut recipe, "Can you substitute chicken?");
        assert!(recipe.tags.contains(&"Swap chicken".to_string()));
        assert!(reply.contains("added substitution options for chicken"));
        assert!(reply.contains("For chicken, try: tofu, paneer, chickpeas"));
    }

    #[test]
    fn substitution_with_replacement_phrase_still_finds_the_ingredient() {
        // the captured target here is "something vegetarian"; the ingredient
        // has to be recovered from the message itself
        let mut recipe = sample_recipe();
        let reply = refine_recipe(
            &mut recipe,
            "Can you substitute chicken for something vegetarian?",
        );
        assert!(recipe.tags.contains(&"Swap chicken".to_string()));
        assert!(recipe.tags.contains(&"Vegetarian".to_string()));
        assert!(reply.contains("For chicken, try: tofu, paneer, chickpeas"));
    }

    #[test]
    fn unknown_substitution_target_still_offers_protein_swaps() {
        let mut recipe = sample_recipe();
        let reply = refine_recipe(&mut recipe, "replace the dragonfruit please with something");
        // no note was recorded, so the generic help reply wins
        assert!(reply.contains("substitutions and tweaks") || reply.contains("high-protein swaps"));
    }

    #[test]
    fn protein_boost_caps_safety_at_98() {
        let mut recipe = sample_recipe();
        recipe.pcos_safety = 96;
        refine_recipe(&mut recipe, "more protein please");
        assert_eq!(recipe.protein, Some(30.0));
        assert_eq!(recipe.pcos_safety, 98);
        refine_recipe(&mut recipe, "even more protein");
        assert_eq!(recipe.protein, Some(38.0));
        assert_eq!(recipe.pcos_safety, 98);
        assert_eq!(
            recipe.tags.iter().filter(|tag| *tag == "High Protein").count(),
            1
        );
    }

    #[test]
    fn low_carb_floors_at_five_grams() {
        let mut recipe = sample_recipe();
        recipe.carbs = Some(9.0);
        refine_recipe(&mut recipe, "make it low carb");
        assert_eq!(recipe.carbs, Some(5.0));
        assert!(recipe.tags.contains(&"Low Carb".to_string()));
    }

    #[test]
    fn dairy_free_rewrites_instructions() {
        let mut recipe = sample_recipe();
        let reply = refine_recipe(&mut recipe, "I need this dairy free");
        assert!(recipe.instructions[0].contains("dairy-free yogurt"));
        assert!(recipe.instructions[1].contains("almond milk"));
        assert!(recipe.instructions[1].contains("vegan cheese"));
        assert!(reply.contains("Dairy-free options"));
    }

    #[test]
    fn servings_and_exclusions_become_tags() {
        let mut recipe = sample_recipe();
        let reply = refine_recipe(&mut recipe, "make it for 4 people without onions");
        assert!(recipe.tags.contains(&"Serves 4".to_string()));
        assert!(recipe.tags.contains(&"No onions".to_string()));
        assert!(reply.starts_with("Done. I "));
        assert!(reply.contains("set servings target to 4"));
        assert!(reply.contains("excluded onions"));
    }

    #[test]
    fn spice_adjustments_stay_clamped() {
        let mut recipe = sample_recipe();
        recipe.flavor_satisfaction = 95;
        refine_recipe(&mut recipe, "make it spicy");
        assert_eq!(recipe.flavor_satisfaction, 96);
        // "less spicy" matches both rules: the spicy boost lands first, then
        // the mild rule subtracts one
        recipe.flavor_satisfaction = 70;
        refine_recipe(&mut recipe, "less spicy please");
        assert_eq!(recipe.flavor_satisfaction, 71);
        assert!(recipe.tags.contains(&"Spicy".to_string()));
        assert!(recipe.tags.contains(&"Mild".to_string()));
    }

    #[test]
    fn unrecognized_message_returns_help_without_mutation() {
        let mut recipe = sample_recipe();
        let before = recipe.clone();
        let reply = refine_recipe(&mut recipe, "tell me a joke");
        assert_eq!(recipe, before);
        assert!(reply.contains("substitute chicken"));
    }
}
