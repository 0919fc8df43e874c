use chrono::Local;
use clap::{Args, Subcommand};
use serde_json::json;

use fitdiary_core::{DailyTotals, DiaryAggregator, FoodItem, GoalTargets, MealType, Nutrients};

use super::{App, OutputFormat};

#[derive(Args)]
pub struct DiaryCommand {
    #[command(subcommand)]
    pub command: DiarySubcommand,
}

#[derive(Subcommand)]
pub enum DiarySubcommand {
    /// Show today's entries and totals
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Log one serving of a catalog food
    Log {
        /// Food ID from 'fitdiary food search'
        food_id: String,

        /// Meal type (breakfast, lunch, dinner, snacks)
        #[arg(long, short, default_value = "snacks")]
        meal: MealType,
    },
}

impl DiaryCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let (credential, _) = app.require_session()?;
        let diary = DiaryAggregator::new(&app.session);

        match &self.command {
            DiarySubcommand::Show { format } => {
                diary.fetch_diary(&credential).await?;
                show(&diary, &app.session.goals(), format)
            }
            DiarySubcommand::Log { food_id, meal } => {
                // Only the id goes over the wire; totals come from the refetch
                let food =
                    FoodItem::new(food_id.clone(), format!("food {}", food_id), Nutrients::ZERO);
                diary.log_meal(&food, *meal).await?;

                let totals = diary.todays_totals();
                println!("Logged food {} to {}.", food_id, meal);
                println!();
                print_summary(&totals, &app.session.goals());
                Ok(())
            }
        }
    }
}

fn show(
    diary: &DiaryAggregator,
    goals: &GoalTargets,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let totals = diary.todays_totals();

    match format {
        OutputFormat::Json => {
            let report = json!({
                "date": Local::now().date_naive().to_string(),
                "entries": diary.entries(),
                "totals": totals,
                "goals": goals,
                "remaining": totals.remaining(goals),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("Diary for {}", Local::now().date_naive());
            println!("{}", "=".repeat(60));

            for group in diary.by_meal_type() {
                let subtotal: Nutrients = group.entries.iter().map(|e| e.food.nutrients()).sum();
                println!();
                println!("{} ({:.0} kcal)", group.meal_type, subtotal.calories);

                if group.entries.is_empty() {
                    println!("  (nothing logged)");
                }
                for entry in &group.entries {
                    println!("  {}", entry.food);
                }
            }

            println!();
            print_summary(&totals, goals);
        }
    }
    Ok(())
}

fn print_summary(totals: &DailyTotals, goals: &GoalTargets) {
    let progress = totals.progress(goals);

    println!("{}", "-".repeat(60));
    print_row("Calories", totals.calories, goals.calories, "kcal", progress.calories);
    print_row("Protein", totals.protein, goals.protein, "g", progress.protein);
    print_row("Carbs", totals.carbs, goals.carbs, "g", progress.carbs);
    print_row("Fat", totals.fat, goals.fat, "g", progress.fat);
}

fn print_row(label: &str, value: f64, goal: f64, unit: &str, progress: f64) {
    println!(
        "  {:9} {:>6.0} / {:<6.0} {:4} {} {:>3.0}%",
        label,
        value,
        goal,
        unit,
        progress_bar(progress, 20),
        progress * 100.0
    );
}

/// Renders a fraction in `[0, 1]` as a fixed-width bar.
fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0.0, 4), "[....]");
        assert_eq!(progress_bar(0.5, 4), "[##..]");
        assert_eq!(progress_bar(1.0, 4), "[####]");
        assert_eq!(progress_bar(3.0, 4), "[####]");
    }
}
