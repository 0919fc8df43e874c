use clap::{Args, Subcommand};

use fitdiary_core::scan::{self, ScanOutcome, ScannedCode, DEFAULT_SCAN_MEAL};
use fitdiary_core::{CustomFood, DiaryAggregator, MealType};

use super::{App, OutputFormat};

#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// Search the food catalog by name
    Search {
        /// Text to search for
        query: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Resolve a scanned barcode or recipe QR payload
    Scan {
        /// Barcode digits or the recipe QR payload
        code: String,

        /// Log the item to today's diary
        #[arg(long)]
        log: bool,

        /// Meal type used with --log
        #[arg(long, short, default_value_t = DEFAULT_SCAN_MEAL)]
        meal: MealType,
    },

    /// Add a custom food to the catalog
    Add {
        /// Food name
        #[arg(long)]
        name: String,

        /// Calories per serving (kcal)
        #[arg(long)]
        calories: f64,

        /// Protein per serving (g)
        #[arg(long, default_value_t = 0.0)]
        protein: f64,

        /// Carbohydrates per serving (g)
        #[arg(long, default_value_t = 0.0)]
        carbs: f64,

        /// Fat per serving (g)
        #[arg(long, default_value_t = 0.0)]
        fat: f64,

        /// Serving size
        #[arg(long, default_value_t = 100.0)]
        serving_size: f64,

        /// Serving unit
        #[arg(long, default_value = "g")]
        serving_unit: String,
    },

    /// Print the QR payload for a recipe
    RecipeCode {
        /// Recipe ID
        recipe_id: String,

        /// Recipe name
        name: String,
    },
}

impl FoodCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        if let FoodSubcommand::RecipeCode { recipe_id, name } = &self.command {
            println!("{}", scan::recipe_payload(recipe_id, name));
            return Ok(());
        }

        let (credential, _) = app.require_session()?;

        match &self.command {
            FoodSubcommand::Search { query, format } => {
                let foods = app.api().search_food(&credential, query).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&foods)?);
                    }
                    OutputFormat::Text => {
                        if foods.is_empty() {
                            println!("No foods found matching '{}'", query);
                            return Ok(());
                        }
                        for food in &foods {
                            println!("{:>6}  {}", food.id, food);
                        }
                        println!("\nTotal: {} food(s)", foods.len());
                    }
                }
                Ok(())
            }

            FoodSubcommand::Scan { code, log, meal } => {
                let code = ScannedCode::parse(code);
                let food = match scan::resolve(app.api(), &credential, &code).await? {
                    ScanOutcome::Found(food) => food,
                    ScanOutcome::NotFound(upc) => {
                        println!("Barcode {} is not in the catalog.", upc);
                        println!("Add it with 'fitdiary food add --name <name> --calories <kcal>'.");
                        return Ok(());
                    }
                };

                if let ScannedCode::Recipe { .. } = code {
                    println!("Recipe: {}", food);
                } else {
                    println!("Found: {}", food);
                }

                if *log {
                    let diary = DiaryAggregator::new(&app.session);
                    diary.log_meal(&food, *meal).await?;
                    println!(
                        "Logged {} to {}. Today: {:.0} kcal",
                        food.name,
                        meal,
                        diary.todays_totals().calories
                    );
                }
                Ok(())
            }

            FoodSubcommand::Add {
                name,
                calories,
                protein,
                carbs,
                fat,
                serving_size,
                serving_unit,
            } => {
                let food = CustomFood {
                    name: name.clone(),
                    calories: *calories,
                    protein: *protein,
                    carbs: *carbs,
                    fat: *fat,
                    serving_size: *serving_size,
                    serving_unit: serving_unit.clone(),
                };
                let id = app.api().add_custom_food(&credential, &food).await?;
                println!("Added '{}' with ID {}", food.name, id);
                Ok(())
            }

            FoodSubcommand::RecipeCode { .. } => Ok(()),
        }
    }
}
