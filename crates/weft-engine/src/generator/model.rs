use super::{SpecGenerator, prompt};
use crate::analyzer::Analyzer;
use crate::reducer::ReducedRecording;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use weft_common::error::CompileError;
use weft_common::protocol::AnalyzerMessage;
use weft_common::spec::{IntentSpec, Provenance};

/// Generation via the external analysis service: one bounded prompt,
/// one request/response exchange, response parsed into the same spec
/// schema the rule path produces.
pub struct ModelAssistedGenerator {
    analyzer: Box<dyn Analyzer>,
    timeout: Duration,
    max_messages: usize,
}

impl ModelAssistedGenerator {
    pub fn new(analyzer: Box<dyn Analyzer>, timeout: Duration, max_messages: usize) -> Self {
        Self {
            analyzer,
            timeout,
            max_messages,
        }
    }
}

#[async_trait]
impl SpecGenerator for ModelAssistedGenerator {
    fn name(&self) -> &'static str {
        "model_assisted"
    }

    async fn generate(&self, reduced: &ReducedRecording) -> Result<IntentSpec, CompileError> {
        let prompt = prompt::build_prompt(reduced)?;
        debug!(bytes = prompt.len(), "sending prompt to analysis service");

        let messages = tokio::time::timeout(self.timeout, self.analyzer.analyze(&prompt))
            .await
            .map_err(|_| CompileError::ServiceTimeout(self.timeout.as_millis() as u64))??;

        let text = terminal_result(messages, self.max_messages)?;
        let object = extract_json_object(&text).ok_or_else(|| {
            CompileError::UnparseableResponse(format!(
                "no JSON object in response: {}",
                text.chars().take(120).collect::<String>()
            ))
        })?;
        let mut spec: IntentSpec = serde_json::from_str(object)
            .map_err(|e| CompileError::UnparseableResponse(e.to_string()))?;
        spec.provenance = Provenance::ModelAssisted;
        Ok(spec)
    }
}

/// Consumes the response stream in arrival order and returns the text
/// of the first terminal result. Anything conversational, or anything
/// past the message ceiling, is a protocol violation rather than
/// something to silently drain.
fn terminal_result(
    messages: Vec<AnalyzerMessage>,
    ceiling: usize,
) -> Result<String, CompileError> {
    for (index, message) in messages.into_iter().enumerate() {
        if index >= ceiling {
            return Err(CompileError::ProtocolViolation(format!(
                "more than {ceiling} messages before a terminal result"
            )));
        }
        match message {
            AnalyzerMessage::Info { text } => debug!(%text, "analysis service info"),
            AnalyzerMessage::User { .. } => {
                return Err(CompileError::ProtocolViolation(
                    "unexpected user turn in a single-exchange protocol".into(),
                ));
            }
            AnalyzerMessage::Result { text } => return Ok(text),
        }
    }
    Err(CompileError::ProtocolViolation(
        "stream ended without a terminal result".into(),
    ))
}

/// Locates the first balanced JSON object in free-form model output,
/// tracking string and escape state so braces inside string values do
/// not confuse the depth count.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes.iter().enumerate().skip(start) {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_balanced_object_from_prose() {
        let text = "Here is the spec:\n{\"name\": \"x\", \"nested\": {\"a\": 1}}\nHope it helps!";
        assert_eq!(
            extract_json_object(text),
            Some("{\"name\": \"x\", \"nested\": {\"a\": 1}}")
        );
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance() {
        let text = r#"{"snippet": "page.fill('#a', '{{USERNAME}}')", "note": "brace } in string"}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn unterminated_object_yields_none() {
        assert_eq!(extract_json_object("{\"name\": \"x\""), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn user_turn_is_a_protocol_violation() {
        let messages = vec![AnalyzerMessage::User {
            text: "are you sure?".into(),
        }];
        assert!(matches!(
            terminal_result(messages, 16),
            Err(CompileError::ProtocolViolation(_))
        ));
    }

    #[test]
    fn first_terminal_result_ends_the_exchange() {
        let messages = vec![
            AnalyzerMessage::Info {
                text: "working".into(),
            },
            AnalyzerMessage::Result { text: "{}".into() },
            AnalyzerMessage::Result {
                text: "ignored".into(),
            },
        ];
        assert_eq!(terminal_result(messages, 16).unwrap(), "{}");
    }

    #[test]
    fn message_ceiling_is_enforced() {
        let messages: Vec<AnalyzerMessage> = (0..20)
            .map(|i| AnalyzerMessage::Info {
                text: format!("chatter {i}"),
            })
            .collect();
        assert!(matches!(
            terminal_result(messages, 16),
            Err(CompileError::ProtocolViolation(_))
        ));
    }
}
