use clap::{Args, Subcommand};

use fitdiary_core::{ChatMessage, ChatRelay, Profile};

use super::App;

#[derive(Args)]
pub struct ChatCommand {
    #[command(subcommand)]
    pub command: ChatSubcommand,
}

#[derive(Subcommand)]
pub enum ChatSubcommand {
    /// Show the conversation
    List,

    /// Send a message to your coach
    Send {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Follow the conversation until Ctrl-C
    Watch,
}

impl ChatCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let (credential, profile) = app.require_session()?;
        let relay = ChatRelay::new(app.api().clone(), credential);

        match &self.command {
            ChatSubcommand::List => {
                let messages = relay.messages().await?;
                if messages.is_empty() {
                    println!("No messages yet. Say hi with 'fitdiary chat send'.");
                }
                for message in &messages {
                    print_message(message, &profile);
                }
            }
            ChatSubcommand::Send { text } => {
                let messages = relay.send(&text.join(" ")).await?;
                if let Some(last) = messages.last() {
                    print_message(last, &profile);
                }
            }
            ChatSubcommand::Watch => {
                let mut watch = relay.watch(app.config.chat_poll_interval());
                let mut shown = 0;
                println!("Watching chat, press Ctrl-C to stop.");

                loop {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => break,
                        messages = watch.changed() => {
                            let Some(messages) = messages else { break };
                            // The list only grows; print what is new
                            for message in messages.iter().skip(shown) {
                                print_message(message, &profile);
                            }
                            shown = messages.len();
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn print_message(message: &ChatMessage, me: &Profile) {
    let who = if message.is_from(me) { "You" } else { "Coach" };
    println!("[{}] {}: {}", message.created_at, who, message.message);
}
