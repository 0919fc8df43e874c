//! Authentication commands: login, logout and status.

use clap::Args;
use serde_json::json;

use super::{prompt, prompt_password, App, OutputFormat};

#[derive(Args)]
pub struct LoginCommand {
    /// Email address (prompted if omitted)
    #[arg(long, short)]
    email: Option<String>,
}

impl LoginCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(profile) = app.session.profile() {
            println!("Already logged in as {} <{}>.", profile.name, profile.email);
            println!("Run 'fitdiary logout' first to switch accounts.");
            return Ok(());
        }

        let email = match &self.email {
            Some(email) => email.clone(),
            None => prompt("Email")?,
        };
        let password = prompt_password("Password")?;

        match app.session.login(&email, &password).await? {
            Some(profile) => {
                println!("Logged in as {} <{}>.", profile.name, profile.email);
                Ok(())
            }
            None => Err("Login succeeded but your profile could not be loaded. Try again.".into()),
        }
    }
}

pub async fn logout(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let was_logged_in = app.session.credential().is_some();
    app.session.logout().await;

    if was_logged_in {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

#[derive(Args)]
pub struct StatusCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl StatusCommand {
    pub fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let profile = app.session.profile();

        match self.format {
            OutputFormat::Json => {
                let status = json!({
                    "api_url": app.api().base_url(),
                    "logged_in": profile.is_some(),
                    "profile": profile,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            }
            OutputFormat::Text => {
                println!("Server: {}", app.api().base_url());
                match profile {
                    Some(profile) => {
                        println!("Logged in as {} <{}>", profile.name, profile.email);
                        if let Some(goal) = profile.goal {
                            println!("Goal: {}", goal);
                        }
                    }
                    None => println!("Not logged in"),
                }
            }
        }
        Ok(())
    }
}
