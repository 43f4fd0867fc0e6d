//! Command handlers for the Docent CLI.

pub mod ask;
pub mod retrieve;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use retrieve::RetrieveCommand;
pub use stats::StatsCommand;

use docent_agent::{Agent, DuckDuckGoSearch, LookupInternalPolicy, SearchWeb, ToolRegistry};
use docent_core::{AppConfig, AppError, AppResult};
use docent_knowledge::{ChunkConfig, KnowledgeBase};
use std::sync::Arc;

/// Build the knowledge base and index the configured corpus.
///
/// A missing document path degrades to an empty index; the agent's internal
/// lookup then answers with its sentinel string.
pub(crate) async fn build_knowledge_base(config: &AppConfig) -> AppResult<Arc<KnowledgeBase>> {
    let provider = docent_knowledge::create_provider(
        &config.embedding_provider,
        &config.embedding_model,
        config.retrieval.embedding_dim,
        config.endpoint.as_deref(),
        config.agent.request_timeout(),
    )?;

    let knowledge_base = Arc::new(KnowledgeBase::new(
        provider,
        ChunkConfig {
            chunk_size: config.retrieval.chunk_size,
            chunk_overlap: config.retrieval.chunk_overlap,
        },
    ));

    knowledge_base.load_and_index(&config.document_path).await?;

    Ok(knowledge_base)
}

/// Wire the agent: LLM client, web search, and the fixed tool registry.
pub(crate) fn build_agent(
    config: &AppConfig,
    knowledge_base: Arc<KnowledgeBase>,
) -> AppResult<Agent> {
    let llm = docent_llm::create_client(
        &config.provider,
        config.endpoint.as_deref(),
        config.api_key.as_deref(),
        config.agent.request_timeout(),
    )
    .map_err(AppError::Config)?;

    let web_search = Arc::new(DuckDuckGoSearch::new(config.agent.request_timeout())?);

    let registry = ToolRegistry::new(vec![
        Arc::new(LookupInternalPolicy::new(
            knowledge_base,
            config.retrieval.top_k,
        )),
        Arc::new(SearchWeb::new(web_search)),
    ]);

    Agent::new(llm, &config.model, registry, config.agent.max_steps)
}
