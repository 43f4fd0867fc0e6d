//! Stats command handler.

use clap::Args;
use docent_core::{AppConfig, AppResult};

/// Show knowledge base statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    /// Execute the stats command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let knowledge_base = super::build_knowledge_base(config).await?;
        let stats = knowledge_base.stats();

        if self.json {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| docent_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("Document corpus: {:?}", config.document_path);
            println!("Documents loaded: {}", stats.documents);
            println!("Chunks indexed: {}", stats.chunks);
            if let Some(indexed_at) = stats.indexed_at {
                println!("Indexed at: {}", indexed_at.to_rfc3339());
            }
        }

        Ok(())
    }
}
