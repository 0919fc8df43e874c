mod auth;
mod chat;
mod config_cmd;
mod diary;
mod food;
mod goals;
mod recommend;
mod signup;

pub use auth::{logout, LoginCommand, StatusCommand};
pub use chat::ChatCommand;
pub use config_cmd::ConfigCommand;
pub use diary::DiaryCommand;
pub use food::FoodCommand;
pub use goals::GoalsCommand;
pub use recommend::RecommendCommand;
pub use signup::SignupCommand;

use clap::ValueEnum;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use fitdiary_core::{ApiClient, Credential, FileCredentialStore, Profile, SessionManager};

use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything a command needs: configuration and an initialized session.
pub struct App {
    pub config: Config,
    pub session: SessionManager,
}

impl App {
    /// Builds the API client and restores the stored session, if any.
    pub async fn connect(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let api = ApiClient::new(config.api_url.value.clone(), config.request_timeout())?;
        let store = Arc::new(FileCredentialStore::new(config.data_dir.value.clone()));
        let session = SessionManager::new(api, store);
        session.initialize().await;

        Ok(Self { config, session })
    }

    pub fn api(&self) -> &ApiClient {
        self.session.api()
    }

    /// The active credential and profile, or an error telling the user to log in.
    pub fn require_session(&self) -> Result<(Credential, Profile), Box<dyn std::error::Error>> {
        let state = self.session.state();
        match (state.credential, state.profile) {
            (Some(credential), Some(profile)) => Ok((credential, profile)),
            _ => Err("Not logged in. Run 'fitdiary login' first.".into()),
        }
    }
}

/// Reads one trimmed line from stdin after printing `label`.
pub(crate) fn prompt(label: &str) -> io::Result<String> {
    read_answer(&mut io::stdin().lock(), label)
}

/// Reads a password without echoing it.
pub(crate) fn prompt_password(label: &str) -> io::Result<String> {
    rpassword::prompt_password(format!("{}: ", label))
}

/// Prompts until the answer parses.
pub(crate) fn prompt_parsed<T>(label: &str) -> io::Result<T>
where
    T: std::str::FromStr,
{
    read_parsed(&mut io::stdin().lock(), label)
}

/// Prompts for one of `options` by number or key. Returns the key.
pub(crate) fn prompt_choice(
    label: &str,
    options: &[(&'static str, &str)],
) -> io::Result<&'static str> {
    read_choice(&mut io::stdin().lock(), label, options)
}

fn read_answer(input: &mut impl BufRead, label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("input closed while waiting for '{}'", label),
        ));
    }
    Ok(line.trim().to_string())
}

fn read_parsed<T>(input: &mut impl BufRead, label: &str) -> io::Result<T>
where
    T: std::str::FromStr,
{
    loop {
        let answer = read_answer(input, label)?;
        match answer.parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("  '{}' is not a valid value, try again.", answer),
        }
    }
}

fn read_choice(
    input: &mut impl BufRead,
    label: &str,
    options: &[(&'static str, &str)],
) -> io::Result<&'static str> {
    println!("{}", label);
    for (i, (_, text)) in options.iter().enumerate() {
        println!("  {}) {}", i + 1, text);
    }

    loop {
        let answer = read_answer(input, "Choice")?;
        let picked = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i))
            .or_else(|| options.iter().find(|(key, _)| key.eq_ignore_ascii_case(&answer)));

        match picked {
            Some((key, _)) => return Ok(*key),
            None => println!("  Pick a number between 1 and {}.", options.len()),
        }
    }
}
