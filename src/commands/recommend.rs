use clap::Args;

use fitdiary_core::RecommendKind;

use super::App;

#[derive(Args)]
pub struct RecommendCommand {
    /// What to ask for (recipe, plan, challenge)
    kind: RecommendKind,

    /// Free-text request, e.g. "high protein vegetarian dinner"
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
}

impl RecommendCommand {
    pub async fn run(&self, app: &App) -> Result<(), Box<dyn std::error::Error>> {
        let (credential, _) = app.require_session()?;
        let query = self.query.join(" ");

        let reply = app.api().recommend(&credential, &query, self.kind).await?;
        println!("{}", reply);
        Ok(())
    }
}
