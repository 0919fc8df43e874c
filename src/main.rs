use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    App, ChatCommand, ConfigCommand, DiaryCommand, FoodCommand, GoalsCommand, LoginCommand,
    RecommendCommand, SignupCommand, StatusCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "fitdiary")]
#[command(version)]
#[command(about = "Track today's meals against your nutrition goals", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login(LoginCommand),

    /// Log out and forget the stored session
    Logout,

    /// Show who is logged in
    Status(StatusCommand),

    /// Create an account
    Signup(SignupCommand),

    /// Show or add to today's diary
    Diary(DiaryCommand),

    /// Search, scan and add foods
    Food(FoodCommand),

    /// Show daily nutrition targets
    Goals(GoalsCommand),

    /// Talk to your coach
    Chat(ChatCommand),

    /// Ask for a recipe, plan or challenge
    Recommend(RecommendCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitdiary=warn,fitdiary_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;
    tracing::debug!(
        api_url = %config.api_url.value,
        config_file = ?config.config_file,
        "Configuration loaded"
    );

    let command = match cli.command {
        Some(Commands::Config(cmd)) => return cmd.run(&config),
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    let app = App::connect(config).await?;

    match command {
        Commands::Login(cmd) => cmd.run(&app).await,
        Commands::Logout => commands::logout(&app).await,
        Commands::Status(cmd) => cmd.run(&app),
        Commands::Signup(cmd) => cmd.run(&app).await,
        Commands::Diary(cmd) => cmd.run(&app).await,
        Commands::Food(cmd) => cmd.run(&app).await,
        Commands::Goals(cmd) => cmd.run(&app),
        Commands::Chat(cmd) => cmd.run(&app).await,
        Commands::Recommend(cmd) => cmd.run(&app).await,
        Commands::Config(_) => Ok(()),
    }
}
