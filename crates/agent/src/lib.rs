//! Agent loop: the decision/execution state machine.
//!
//! Given a user query, the agent repeatedly asks the language model to
//! choose an action (tool call or final answer), executes chosen tools,
//! feeds observations back, and terminates with a final answer plus an
//! ordered trace of the steps taken.
//!
//! The cycle is THINKING (model chooses) → ACTING (tool runs) → OBSERVING
//! (result recorded), bounded by a maximum iteration count. Routing is
//! delegated to the model's judgment: the tool descriptions are the routing
//! policy. Tool failures and unknown tool names become observations the
//! model can adapt to; they never crash the loop.

pub mod parser;
pub mod prompt;
pub mod search;
pub mod tools;

#[cfg(test)]
mod tests;

pub use search::{DuckDuckGoSearch, WebSearchProvider};
pub use tools::{LookupInternalPolicy, SearchWeb, Tool, ToolRegistry};

use docent_core::AppResult;
use docent_llm::{LlmClient, LlmRequest};
use parser::ModelEmission;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum characters of tool output carried into an observation.
const MAX_OBSERVATION_CHARS: usize = 4000;

/// One recorded tool invocation during a query's resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    /// Tool name as requested by the model
    pub tool: String,

    /// Input string the tool was invoked with
    pub tool_input: String,

    /// The tool's (possibly truncated) string result, or a failure note
    pub observation: String,
}

/// Terminal state of a query resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The model emitted a final answer
    Done,

    /// The loop bound was exhausted or model output stayed unparseable
    Failed,
}

/// The complete, immutable output of one query resolution.
///
/// Always produced exactly once per `run` call; per-query failures are
/// carried here as a `Failed` status with an explanatory answer rather
/// than raised to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// Final answer text, or an explanatory message on failure
    pub answer: String,

    /// Ordered trace of tool invocations (possibly empty)
    pub steps: Vec<AgentStep>,

    /// Terminal state of the run
    pub status: RunStatus,
}

impl AgentResult {
    /// Whether the run concluded with a final answer.
    pub fn is_done(&self) -> bool {
        self.status == RunStatus::Done
    }
}

/// The tool-routing agent.
///
/// Holds no per-query state: each `run` call accumulates its own step
/// sequence, so one agent value can serve concurrent queries.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    model: String,
    registry: ToolRegistry,
    system_prompt: String,
    max_steps: usize,
}

impl Agent {
    /// Construct an agent over a tool registry.
    ///
    /// Fails with a configuration error if the registry is empty or the
    /// system prompt cannot be rendered; a broken setup must be rejected
    /// before any query is accepted.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        registry: ToolRegistry,
        max_steps: usize,
    ) -> AppResult<Self> {
        if registry.is_empty() {
            return Err(docent_core::AppError::Config(
                "Agent requires at least one tool".to_string(),
            ));
        }

        if max_steps == 0 {
            return Err(docent_core::AppError::Config(
                "Agent requires a positive iteration bound".to_string(),
            ));
        }

        let system_prompt = prompt::render_system_prompt(&registry)?;

        Ok(Self {
            llm,
            model: model.into(),
            registry,
            system_prompt,
            max_steps,
        })
    }

    /// Resolve one query.
    ///
    /// Always returns a result object; tool failures, unknown tools,
    /// malformed model output, and the loop bound are all contained in it.
    /// Only unexpected provider-level failures propagate as errors.
    pub async fn run(&self, query: &str) -> AppResult<AgentResult> {
        tracing::info!("Agent run started");

        let mut steps: Vec<AgentStep> = Vec::new();
        let mut corrective: Option<&str> = None;

        for iteration in 0..self.max_steps {
            // THINKING: ask the model for the next action
            let transcript = prompt::render_transcript(query, &steps, corrective);
            let request = LlmRequest::new(transcript, &self.model)
                .with_system(self.system_prompt.clone())
                .with_temperature(0.0);

            let response = self.llm.complete(&request).await?;

            match parser::parse_emission(&response.content) {
                ModelEmission::FinalAnswer(answer) => {
                    tracing::info!(
                        "Agent concluded after {} step(s), {} iteration(s)",
                        steps.len(),
                        iteration + 1
                    );
                    return Ok(AgentResult {
                        answer,
                        steps,
                        status: RunStatus::Done,
                    });
                }

                ModelEmission::ToolCall { name, input } => {
                    corrective = None;

                    // ACTING: resolve and invoke the named tool
                    let observation = match self.registry.find(&name) {
                        None => {
                            tracing::warn!("Model requested unknown tool '{}'", name);
                            format!(
                                "Tool '{}' does not exist. Available tools: {}",
                                name,
                                self.registry.names()
                            )
                        }
                        Some(tool) => {
                            tracing::info!("Invoking tool '{}'", name);
                            match tool.invoke(&input).await {
                                Ok(output) => truncate_observation(output),
                                Err(e) => {
                                    tracing::warn!("Tool '{}' failed: {}", name, e);
                                    format!("Tool '{}' failed: {}", name, e)
                                }
                            }
                        }
                    };

                    // OBSERVING: record the step and feed it back
                    steps.push(AgentStep {
                        tool: name,
                        tool_input: input,
                        observation,
                    });
                }

                ModelEmission::Unparseable => {
                    if corrective.is_some() {
                        // Already retried once with a corrective prompt
                        tracing::warn!("Model output unparseable after corrective retry");
                        return Ok(AgentResult {
                            answer: "The language model produced output that could not be \
                                     parsed into a tool call or final answer."
                                .to_string(),
                            steps,
                            status: RunStatus::Failed,
                        });
                    }

                    tracing::warn!("Model output unparseable; retrying with corrective prompt");
                    corrective = Some(prompt::CORRECTIVE_INSTRUCTION);
                }
            }
        }

        // Loop bound reached without a final answer
        tracing::warn!(
            "Agent could not conclude within {} iterations",
            self.max_steps
        );

        Ok(AgentResult {
            answer: format!(
                "Could not conclude within {} steps. Try rephrasing the question.",
                self.max_steps
            ),
            steps,
            status: RunStatus::Failed,
        })
    }
}

/// Cap an observation at `MAX_OBSERVATION_CHARS`, marking the cut.
fn truncate_observation(output: String) -> String {
    let total = output.chars().count();
    if total <= MAX_OBSERVATION_CHARS {
        return output;
    }

    let kept: String = output.chars().take(MAX_OBSERVATION_CHARS).collect();
    format!("{}...\n[truncated, {} total chars]", kept, total)
}

#[cfg(test)]
mod loop_tests {
    use super::*;
    use async_trait::async_trait;
    use docent_core::{AppError, AppResult};
    use docent_llm::{LlmResponse, LlmUsage};
    use std::sync::Mutex;

    /// LLM double that replays a fixed list of emissions; the last one is
    /// sticky once the list is exhausted.
    struct ScriptedLlm {
        responses: Vec<String>,
        cursor: Mutex<usize>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<&str>) -> Arc<Self> {
            Arc::new(Self {
                responses: responses.into_iter().map(String::from).collect(),
                cursor: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
            let mut cursor = self.cursor.lock().unwrap();
            let index = (*cursor).min(self.responses.len() - 1);
            *cursor += 1;

            Ok(LlmResponse {
                content: self.responses[index].clone(),
                model: "scripted".to_string(),
                usage: LlmUsage::default(),
            })
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes its input."
        }

        async fn invoke(&self, input: &str) -> AppResult<String> {
            Ok(format!("echo: {}", input))
        }
    }

    struct TimeoutTool;

    #[async_trait]
    impl Tool for TimeoutTool {
        fn name(&self) -> &str {
            "flaky"
        }

        fn description(&self) -> &str {
            "Fails with a timeout."
        }

        async fn invoke(&self, _input: &str) -> AppResult<String> {
            Err(AppError::Tool("request timed out".to_string()))
        }
    }

    fn agent(llm: Arc<dyn LlmClient>, max_steps: usize) -> Agent {
        let registry = ToolRegistry::new(vec![Arc::new(EchoTool), Arc::new(TimeoutTool)]);
        Agent::new(llm, "scripted", registry, max_steps).unwrap()
    }

    #[tokio::test]
    async fn test_immediate_final_answer_has_no_steps() {
        let llm = ScriptedLlm::new(vec![r#"{"final_answer": "forty-two"}"#]);
        let result = agent(llm, 6).run("meaning of life?").await.unwrap();

        assert!(result.is_done());
        assert_eq!(result.answer, "forty-two");
        assert!(result.steps.is_empty());
    }

    #[tokio::test]
    async fn test_tool_call_then_answer() {
        let llm = ScriptedLlm::new(vec![
            r#"{"tool": "echo", "input": "hello"}"#,
            r#"{"final_answer": "the echo said hello"}"#,
        ]);
        let result = agent(llm, 6).run("say hello").await.unwrap();

        assert!(result.is_done());
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].tool, "echo");
        assert_eq!(result.steps[0].tool_input, "hello");
        assert_eq!(result.steps[0].observation, "echo: hello");
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_observation() {
        let llm = ScriptedLlm::new(vec![
            r#"{"tool": "telepathy", "input": "guess"}"#,
            r#"{"final_answer": "no such power"}"#,
        ]);
        let result = agent(llm, 6).run("read my mind").await.unwrap();

        assert!(result.is_done());
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.steps[0].tool, "telepathy");
        assert!(result.steps[0].observation.contains("does not exist"));
        assert!(result.steps[0].observation.contains("echo"));
    }

    #[tokio::test]
    async fn test_tool_failure_is_contained() {
        let llm = ScriptedLlm::new(vec![
            r#"{"tool": "flaky", "input": "anything"}"#,
            r#"{"final_answer": "the tool was unavailable"}"#,
        ]);
        let result = agent(llm, 6).run("try the flaky tool").await.unwrap();

        assert!(result.is_done());
        assert!(result.steps[0].observation.contains("timed out"));
    }

    #[tokio::test]
    async fn test_loop_bound_yields_failed_result() {
        // Model never concludes
        let llm = ScriptedLlm::new(vec![r#"{"tool": "echo", "input": "again"}"#]);
        let result = agent(llm, 3).run("loop forever").await.unwrap();

        assert_eq!(result.status, RunStatus::Failed);
        assert!(result.answer.contains("Could not conclude"));
        assert_eq!(result.steps.len(), 3);
    }

    #[tokio::test]
    async fn test_steps_never_exceed_bound() {
        let llm = ScriptedLlm::new(vec![r#"{"tool": "echo", "input": "x"}"#]);
        for bound in 1..=4 {
            let result = agent(llm.clone(), bound).run("q").await.unwrap();
            assert!(result.steps.len() <= bound);
        }
    }

    #[tokio::test]
    async fn test_malformed_output_recovers_after_retry() {
        let llm = ScriptedLlm::new(vec![
            "I should probably search for this.",
            r#"{"final_answer": "recovered"}"#,
        ]);
        let result = agent(llm, 6).run("q").await.unwrap();

        assert!(result.is_done());
        assert_eq!(result.answer, "recovered");
        assert!(result.steps.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_malformed_output_fails() {
        let llm = ScriptedLlm::new(vec!["not json at all"]);
        let result = agent(llm, 6).run("q").await.unwrap();

        assert_eq!(result.status, RunStatus::Failed);
        assert!(result.answer.contains("could not be"));
        assert!(result.steps.is_empty());
    }

    #[tokio::test]
    async fn test_empty_registry_is_config_error() {
        let llm = ScriptedLlm::new(vec![r#"{"final_answer": "x"}"#]);
        let result = Agent::new(llm, "scripted", ToolRegistry::new(vec![]), 6);
        assert!(result.is_err());
    }

    #[test]
    fn test_truncate_observation() {
        let short = "short output".to_string();
        assert_eq!(truncate_observation(short.clone()), short);

        let long = "x".repeat(MAX_OBSERVATION_CHARS + 100);
        let truncated = truncate_observation(long);
        assert!(truncated.contains("[truncated,"));
        assert!(truncated.chars().count() < MAX_OBSERVATION_CHARS + 50);
    }
}
