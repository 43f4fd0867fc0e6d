//! Tool descriptors and registry.
//!
//! Tools are the callable capabilities the agent loop may invoke instead of
//! answering directly. Each tool's description is part of the contract: it
//! is the only signal the language model uses to route between tools, so
//! the text must clearly delimit each tool's applicable domain.

use crate::search::WebSearchProvider;
use async_trait::async_trait;
use docent_core::AppResult;
use docent_knowledge::KnowledgeBase;
use serde::Serialize;
use std::sync::Arc;

/// A named, described, callable capability.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name the model selects by.
    fn name(&self) -> &str;

    /// Natural-language routing description shown to the model.
    fn description(&self) -> &str;

    /// Invoke the tool with a single string input.
    async fn invoke(&self, input: &str) -> AppResult<String>;
}

/// Name and description pair rendered into the system prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

/// Fixed set of tools, immutable after startup.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build a registry from a fixed tool set.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Find a tool by name.
    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Descriptors of all registered tools, in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Comma-separated tool names, for unknown-tool observations.
    pub fn names(&self) -> String {
        self.tools
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

/// Internal document lookup, delegating to the knowledge base.
pub struct LookupInternalPolicy {
    knowledge_base: Arc<KnowledgeBase>,
    top_k: usize,
}

impl LookupInternalPolicy {
    pub fn new(knowledge_base: Arc<KnowledgeBase>, top_k: usize) -> Self {
        Self {
            knowledge_base,
            top_k,
        }
    }
}

#[async_trait]
impl Tool for LookupInternalPolicy {
    fn name(&self) -> &str {
        "lookup_internal_policy"
    }

    fn description(&self) -> &str {
        "Useful for answering questions about specific internal policies, \
         documents, laws, or the contents of the indexed document collection. \
         ALWAYS use this tool first if the question implies looking up \
         specific rules or documents."
    }

    async fn invoke(&self, input: &str) -> AppResult<String> {
        self.knowledge_base.retrieve(input, self.top_k).await
    }
}

/// Open web search, delegating to the web-search provider.
pub struct SearchWeb {
    provider: Arc<dyn WebSearchProvider>,
}

impl SearchWeb {
    pub fn new(provider: Arc<dyn WebSearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for SearchWeb {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Useful for finding current events, news, general knowledge, or \
         information that is NOT contained in the internal policy documents."
    }

    async fn invoke(&self, input: &str) -> AppResult<String> {
        self.provider.search(input).await
    }
}
