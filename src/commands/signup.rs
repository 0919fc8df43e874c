//! Interactive signup wizard.
//!
//! Mirrors the five signup screens: account, goal, gender, activity level
//! and body details. Each step merges its answers into the draft; nothing is
//! sent until the last step.

use clap::Args;

use fitdiary_core::{DraftError, GoalCategory, SignupDraft, SignupFlow};

use super::{prompt, prompt_choice, prompt_parsed, prompt_password, App};

const GOALS: &[(&str, &str)] = &[
    ("lose_weight", "Lose Weight"),
    ("maintain_weight", "Maintain Weight"),
    ("gain_weight", "Gain Weight"),
];

const GENDERS: &[(&str, &str)] = &[("male", "Male"), ("female", "Female"), ("other", "Other")];

const ACTIVITY_LEVELS: &[(&str, &str)] = &[
    ("sedentary", "Not Very Active - spend most of the day sitting"),
    ("light", "Lightly Active - some movement during the day"),
    ("moderate", "Active - active throughout the day"),
    ("active", "Very Active - intense activity daily"),
];

#[derive(Args)]
pub struct SignupCommand {}

impl SignupCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let mut flow = SignupFlow::new();
        flow.begin();

        println!("Step 1 of 5: Create your account");
        flow.update(SignupDraft {
            name: Some(prompt("Name")?),
            email: Some(prompt("Email")?),
            password: Some(prompt_password("Password")?),
            ..Default::default()
        });

        println!("\nStep 2 of 5");
        let goal: GoalCategory = prompt_choice("What's your goal?", GOALS)?.parse()?;
        flow.update(SignupDraft {
            goal: Some(goal),
            ..Default::default()
        });

        println!("\nStep 3 of 5");
        let gender = prompt_choice("What's your gender?", GENDERS)?;
        flow.update(SignupDraft {
            gender: Some(gender.to_string()),
            ..Default::default()
        });

        println!("\nStep 4 of 5");
        let activity = prompt_choice("Your activity level?", ACTIVITY_LEVELS)?;
        flow.update(SignupDraft {
            activity_level: Some(activity.to_string()),
            ..Default::default()
        });

        println!("\nStep 5 of 5: Just a few more details");
        flow.update(SignupDraft {
            age: Some(prompt_parsed("Age")?),
            height: Some(prompt_parsed("Height (cm)")?),
            current_weight: Some(prompt_parsed("Current weight (kg)")?),
            target_weight: Some(prompt_parsed("Target weight (kg)")?),
            ..Default::default()
        });

        match flow.submit(app.api()).await {
            Ok(message) => {
                println!(
                    "\n{}",
                    message.unwrap_or_else(|| "Account created.".to_string())
                );
                println!("Log in with 'fitdiary login'.");
                Ok(())
            }
            Err(DraftError::MissingFields(fields)) => Err(format!(
                "Missing data from a previous step ({}). Please run 'fitdiary signup' again.",
                fields.join(", ")
            )
            .into()),
            Err(e) => Err(format!("Registration failed: {}", e).into()),
        }
    }
}
