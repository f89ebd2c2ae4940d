use anyhow::{Context, Result};
use craving_planner::api_connection::connection::CorpusClient;
use craving_planner::chat_refiner::refine_recipe;
use craving_planner::cli::parse_args;
use craving_planner::craving_pipeline::CravingPipeline;
use craving_planner::recipe_model::{CravingRequest, PlannerProfile, SymptomFocus};
use craving_planner::text_processing::unique;

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|text| unique(text.split(',').map(str::to_string)))
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args();

    let home_ingredients = split_list(args.pantry);
    let request = CravingRequest {
        desire: args.craving.trim().to_string(),
        selected_intent: args.intent.trim().to_string(),
        use_home_ingredients: !home_ingredients.is_empty(),
        home_ingredients,
        min_calories: args.min_calories,
        max_calories: args.max_calories,
        min_protein: args.min_protein,
        max_protein: args.max_protein,
        symptom_focus: args.symptom.as_deref().and_then(SymptomFocus::parse),
    };
    let profile = PlannerProfile {
        region: args.region,
        focus: args.focus,
        dietary_restrictions: args.diets,
        allergy_notes: args.allergies,
        deficiencies: split_list(args.deficiencies),
    };

    let corpus = CorpusClient::from_env();
    let pipeline = CravingPipeline::new(&corpus);

    if args.meal_plan {
        let plan = pipeline.meal_plan(&request, &profile).await;
        if plan.is_empty() {
            println!("No meal plan could be assembled for this craving.");
            return Ok(());
        }
        for day in &plan {
            println!("{}:", day.day);
            for meal in &day.meals {
                println!("  - {}", meal);
            }
        }
        return Ok(());
    }

    let mut result = pipeline
        .adapt(&request, &profile)
        .await
        .with_context(|| format!("could not adapt craving '{}'", request.desire))?;

    if let Some(message) = &args.refine {
        let reply = refine_recipe(&mut result.recipe, message);
        println!("Refinement: {}\n", reply);
    }

    let recipe = &result.recipe;
    println!("{}", recipe.name);
    println!("{}", recipe.description);
    println!(
        "Region: {} | GL: {} | PCOS safety: {} | Flavor: {}",
        recipe.region,
        recipe.glycemic_load_band.label(),
        recipe.pcos_safety,
        recipe.flavor_satisfaction
    );
    println!("{}", recipe.glycemic_load_note);
    if let Some(calories) = recipe.calories {
        println!("Calories: {:.0} kcal", calories);
    }
    if let Some(protein) = recipe.protein {
        println!("Protein: {:.0} g", protein);
    }
    if let Some(carbs) = recipe.carbs {
        println!("Carbs: {:.0} g", carbs);
    }
    if !recipe.tags.is_empty() {
        println!("Tags: {}", recipe.tags.join(", "));
    }
    if !recipe.instructions.is_empty() {
        println!("\nInstructions:");
        for (index, step) in recipe.instructions.iter().enumerate() {
            println!("  {}. {}", index + 1, step);
        }
    }
    if !recipe.micronutrients.is_empty() {
        println!("\nMicronutrients:");
        for entry in &recipe.micronutrients {
            println!("  {}: {} {}", entry.name, entry.value, entry.unit);
        }
    }
    if let Some(highlight) = &recipe.nutrient_highlight {
        println!("\nNutrient focus: {} ({})", highlight.nutrient, highlight.remark);
    }
    if !recipe.swap_suggestions.is_empty() {
        println!("\nSuggested swaps:");
        for swap in &recipe.swap_suggestions {
            println!("  {} -> {} ({})", swap.from, swap.to, swap.reason);
        }
    }

    let changes = &result.changes;
    println!("\nWhat you asked for:");
    for item in &changes.original_items {
        println!("  {}", item);
    }
    println!("\nWhat was adapted:");
    for item in &changes.adapted_items {
        println!("  {}", item);
    }
    println!("\nTriggers addressed:");
    for item in &changes.triggers_addressed {
        println!("  {}", item);
    }
    println!("\n{}", changes.why_it_works);

    Ok(())
}
