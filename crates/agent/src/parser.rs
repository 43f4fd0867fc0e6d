//! Parsing of language-model emissions into structured actions.
//!
//! The THINKING contract requires the model to emit exactly one JSON
//! object: either a tool selection or a final answer. Anything else is
//! `Unparseable` and routed to the malformed-output path rather than
//! assumed to match a shape.

use serde::Deserialize;

/// A parsed model emission.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEmission {
    /// The model selected a tool with a single string input.
    ToolCall { name: String, input: String },

    /// The model produced a final answer.
    FinalAnswer(String),

    /// The emission could not be parsed into either shape.
    Unparseable,
}

/// Wire shape the model is asked to produce.
#[derive(Debug, Deserialize)]
struct WireEmission {
    tool: Option<String>,
    input: Option<String>,
    final_answer: Option<String>,
}

/// Parse a raw model emission.
///
/// Tolerates surrounding prose and Markdown code fences, but requires a
/// single JSON object carrying either `final_answer` or `tool` (+`input`).
/// A final answer wins if the model emits both.
pub fn parse_emission(raw: &str) -> ModelEmission {
    let Some(candidate) = extract_json_object(raw) else {
        return ModelEmission::Unparseable;
    };

    let Ok(wire) = serde_json::from_str::<WireEmission>(candidate) else {
        return ModelEmission::Unparseable;
    };

    if let Some(answer) = wire.final_answer {
        return ModelEmission::FinalAnswer(answer);
    }

    if let Some(tool) = wire.tool {
        if tool.trim().is_empty() {
            return ModelEmission::Unparseable;
        }
        return ModelEmission::ToolCall {
            name: tool,
            input: wire.input.unwrap_or_default(),
        };
    }

    ModelEmission::Unparseable
}

/// Extract the outermost JSON object from a raw emission.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_call() {
        let emission = parse_emission(r#"{"tool": "search_web", "input": "current president"}"#);
        assert_eq!(
            emission,
            ModelEmission::ToolCall {
                name: "search_web".to_string(),
                input: "current president".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_final_answer() {
        let emission = parse_emission(r#"{"final_answer": "Treaties terminate upon consent."}"#);
        assert_eq!(
            emission,
            ModelEmission::FinalAnswer("Treaties terminate upon consent.".to_string())
        );
    }

    #[test]
    fn test_parse_fenced_emission() {
        let raw = "Here is my action:\n```json\n{\"tool\": \"lookup_internal_policy\", \"input\": \"treaty rules\"}\n```";
        let emission = parse_emission(raw);
        assert_eq!(
            emission,
            ModelEmission::ToolCall {
                name: "lookup_internal_policy".to_string(),
                input: "treaty rules".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_input_defaults_to_empty() {
        let emission = parse_emission(r#"{"tool": "search_web"}"#);
        assert_eq!(
            emission,
            ModelEmission::ToolCall {
                name: "search_web".to_string(),
                input: String::new(),
            }
        );
    }

    #[test]
    fn test_final_answer_wins_over_tool() {
        let emission =
            parse_emission(r#"{"tool": "search_web", "input": "x", "final_answer": "done"}"#);
        assert_eq!(emission, ModelEmission::FinalAnswer("done".to_string()));
    }

    #[test]
    fn test_prose_is_unparseable() {
        assert_eq!(
            parse_emission("I think I should search the web for this."),
            ModelEmission::Unparseable
        );
    }

    #[test]
    fn test_empty_emission_is_unparseable() {
        assert_eq!(parse_emission(""), ModelEmission::Unparseable);
        assert_eq!(parse_emission("   "), ModelEmission::Unparseable);
    }

    #[test]
    fn test_malformed_json_is_unparseable() {
        assert_eq!(
            parse_emission(r#"{"tool": "search_web", "#),
            ModelEmission::Unparseable
        );
        assert_eq!(parse_emission("}{"), ModelEmission::Unparseable);
    }

    #[test]
    fn test_object_without_known_keys_is_unparseable() {
        assert_eq!(
            parse_emission(r#"{"action": "search"}"#),
            ModelEmission::Unparseable
        );
    }

    #[test]
    fn test_blank_tool_name_is_unparseable() {
        assert_eq!(
            parse_emission(r#"{"tool": "  ", "input": "x"}"#),
            ModelEmission::Unparseable
        );
    }
}
