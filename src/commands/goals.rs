use clap::Args;

use super::{App, OutputFormat};

#[derive(Args)]
pub struct GoalsCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl GoalsCommand {
    pub fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let (_, profile) = app.require_session()?;
        let goals = app.session.goals();

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&goals)?),
            OutputFormat::Text => {
                match profile.goal {
                    Some(goal) => println!("Daily targets for goal '{}':", goal),
                    None => println!("Daily targets (no goal set):"),
                }
                println!("  Calories: {:.0} kcal", goals.calories);
                println!("  Protein:  {:.0} g", goals.protein);
                println!("  Carbs:    {:.0} g", goals.carbs);
                println!("  Fat:      {:.0} g", goals.fat);
            }
        }
        Ok(())
    }
}
