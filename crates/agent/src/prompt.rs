//! Prompt rendering for the agent loop.
//!
//! The system prompt is rendered once at agent construction from a
//! Handlebars template over the tool registry; the per-turn prompt is the
//! conversation transcript (query plus prior steps).

use crate::tools::ToolRegistry;
use crate::AgentStep;
use docent_core::{AppError, AppResult};
use handlebars::Handlebars;

/// System prompt template: tool list plus the emission contract.
const SYSTEM_TEMPLATE: &str = "\
You are a research assistant that answers questions by either calling a tool \
or answering directly.

Available tools:
{{#each tools}}
- {{name}}: {{description}}
{{/each}}

Respond with exactly one JSON object and nothing else:
- To call a tool: {\"tool\": \"<tool name>\", \"input\": \"<tool input>\"}
- To give your final answer: {\"final_answer\": \"<answer text>\"}
";

/// Corrective instruction appended after an unparseable emission.
pub const CORRECTIVE_INSTRUCTION: &str = "\
Your previous response could not be parsed. Respond with exactly one JSON \
object: either {\"tool\": \"<tool name>\", \"input\": \"<tool input>\"} or \
{\"final_answer\": \"<answer text>\"}.";

/// Render the system prompt for a tool registry.
pub fn render_system_prompt(registry: &ToolRegistry) -> AppResult<String> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string("system", SYSTEM_TEMPLATE)
        .map_err(|e| AppError::Config(format!("Invalid system prompt template: {}", e)))?;

    let data = serde_json::json!({ "tools": registry.descriptors() });

    handlebars
        .render("system", &data)
        .map_err(|e| AppError::Config(format!("Failed to render system prompt: {}", e)))
}

/// Render the per-turn transcript: the original query plus every prior
/// step's action and observation, in execution order.
pub fn render_transcript(query: &str, steps: &[AgentStep], corrective: Option<&str>) -> String {
    let mut prompt = format!("Question: {}\n", query);

    for step in steps {
        prompt.push_str(&format!(
            "\nAction: called tool \"{}\" with input \"{}\"\nObservation: {}\n",
            step.tool, step.tool_input, step.observation
        ));
    }

    if let Some(instruction) = corrective {
        prompt.push_str(&format!("\n{}\n", instruction));
    }

    prompt.push_str("\nDecide the next action.");
    prompt
}
