use serde::{Deserialize, Serialize};

/// Hard ceiling on messages consumed from the analysis service before a
/// terminal result. The exchange is a single request/response; anything
/// chattier is a protocol violation, not something to silently drain.
pub const MESSAGE_CEILING: usize = 16;

/// The single outbound request to the external analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerRequest {
    pub prompt: String,
}

/// One message in the service's ordered response stream. The stream
/// carries any number of informational messages followed by exactly one
/// terminal `result`. A `user` turn mid-exchange means the service is
/// trying to hold a conversation we never offered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyzerMessage {
    Info { text: String },
    User { text: String },
    Result { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_tagged_by_type() {
        let raw = r#"[
            {"type":"info","text":"analyzing"},
            {"type":"result","text":"{\"name\":\"x\"}"}
        ]"#;
        let messages: Vec<AnalyzerMessage> = serde_json::from_str(raw).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], AnalyzerMessage::Info { .. }));
        assert!(matches!(messages[1], AnalyzerMessage::Result { .. }));
    }
}
