use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The craving to adapt, e.g. "chocolate cake"
    #[arg(short, long, default_value = "")]
    pub craving: String,

    /// Explicit intent label, e.g. "sweet" or "south indian"
    #[arg(long, default_value = "")]
    pub intent: String,

    /// Comma-separated pantry ingredients; also limits the search to them
    #[arg(long)]
    pub pantry: Option<String>,

    #[arg(long)]
    pub min_calories: Option<f64>,

    #[arg(long)]
    pub max_calories: Option<f64>,

    #[arg(long)]
    pub min_protein: Option<f64>,

    #[arg(long)]
    pub max_protein: Option<f64>,

    /// Symptom focus: insulin_spike, bloating, fatigue, acne, period_cramps,
    /// or sugar_cravings
    #[arg(long)]
    pub symptom: Option<String>,

    /// Preferred cuisine region for fallback searches
    #[arg(long, default_value = "Indian")]
    pub region: String,

    /// Dietary focus shown in meal-plan preferences
    #[arg(long, default_value = "hormone balance")]
    pub focus: String,

    /// Dietary restriction, repeatable
    #[arg(long = "diet")]
    pub diets: Vec<String>,

    #[arg(long, default_value = "")]
    pub allergies: String,

    /// Comma-separated reported deficiencies, e.g. "iron,vitamin d"
    #[arg(long)]
    pub deficiencies: Option<String>,

    /// Print a two-day meal plan instead of a single adaptation
    #[arg(long)]
    pub meal_plan: bool,

    /// Refinement message applied to the adapted recipe, e.g. "make it low carb"
    #[arg(long)]
    pub refine: Option<String>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
