//! Retrieve command handler.
//!
//! Direct knowledge-base retrieval without the agent loop; useful for
//! inspecting what the internal lookup tool would observe.

use clap::Args;
use docent_core::{AppConfig, AppResult};

/// Retrieve document context for a query (no agent loop)
#[derive(Args, Debug)]
pub struct RetrieveCommand {
    /// Query text
    pub query: String,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
}

impl RetrieveCommand {
    /// Execute the retrieve command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing retrieve command");

        let knowledge_base = super::build_knowledge_base(config).await?;

        let k = self.top_k.unwrap_or(config.retrieval.top_k);
        let context = knowledge_base.retrieve(&self.query, k).await?;

        println!("{}", context);

        Ok(())
    }
}
