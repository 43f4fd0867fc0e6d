//! Ask command handler.
//!
//! Builds the knowledge base, wires the agent, and resolves one query.

use clap::Args;
use docent_agent::RunStatus;
use docent_core::{AppConfig, AppResult};

/// Answer a question using internal documents and web search
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the step trace in plain output
    #[arg(long)]
    pub no_trace: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Query: {}", self.query);

        let knowledge_base = super::build_knowledge_base(config).await?;
        let agent = super::build_agent(config, knowledge_base)?;

        let result = agent.run(&self.query).await?;

        if self.json {
            // Structured output: the response shape callers map into their
            // own request layer
            let output = serde_json::json!({
                "response": result.answer,
                "status": result.status,
                "steps": result
                    .steps
                    .iter()
                    .map(|s| serde_json::json!({
                        "tool": s.tool,
                        "tool_input": s.tool_input,
                    }))
                    .collect::<Vec<_>>(),
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| docent_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", result.answer);

            if !self.no_trace && !result.steps.is_empty() {
                println!();
                println!("Steps:");
                for (i, step) in result.steps.iter().enumerate() {
                    println!("  {}. {} ({})", i + 1, step.tool, step.tool_input);
                }
            }

            if result.status == RunStatus::Failed {
                tracing::warn!("Query did not conclude with a final answer");
            }
        }

        Ok(())
    }
}
