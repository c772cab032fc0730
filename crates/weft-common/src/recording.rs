use crate::error::CompileError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One completed capture session, as handed over by the in-page capture
/// layer. A Recording is immutable once capture ends: every downstream
/// component treats it as a value and never mutates it in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub session_id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Epoch milliseconds.
    pub started_at: u64,
    /// Epoch milliseconds.
    pub ended_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub dom_snapshots: Vec<DomSnapshot>,
    /// Keyed by origin URL.
    #[serde(default)]
    pub console_logs: HashMap<String, Vec<ConsoleLogEntry>>,
    /// Keyed by request id.
    #[serde(default)]
    pub network_events: HashMap<String, NetworkEvent>,
    /// Side channel populated when the capture script explicitly tags a
    /// field as a login credential or business value. When present this
    /// is the authoritative source for a field's final value; keystroke
    /// reconstruction is lossy (backspaces, paste events) and never
    /// takes precedence over it.
    #[serde(default)]
    pub captured_inputs: HashMap<String, CapturedInput>,
}

impl Recording {
    pub fn duration_ms(&self) -> u64 {
        self.ended_at.saturating_sub(self.started_at)
    }

    /// Checks the fields without which even a degraded spec cannot be
    /// produced. Absent optional collections are valid; zero actions is
    /// valid.
    pub fn validate(&self) -> Result<(), CompileError> {
        if self.session_id.trim().is_empty() {
            return Err(CompileError::MalformedRecording(
                "missing session id".into(),
            ));
        }
        if self.url.trim().is_empty() {
            return Err(CompileError::MalformedRecording(
                "missing originating url".into(),
            ));
        }
        Ok(())
    }
}

/// The event vocabulary produced by the capture layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Click,
    Input,
    Change,
    Submit,
    Focus,
    Blur,
    Navigate,
    Keydown,
    Keyup,
    Type,
    Fill,
    Select,
}

impl ActionKind {
    /// Kinds that write a value into a form field.
    pub fn is_input_like(&self) -> bool {
        matches!(self, Self::Input | Self::Type | Self::Fill)
    }
}

/// One observed user event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub timestamp: u64,
    pub url: String,
    #[serde(default)]
    pub target: Target,
    /// Submitted form field map, present on `submit` actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<HashMap<String, String>>,
    /// Key name, present on `keydown`/`keyup` actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Descriptor of the element an action was observed on. The capture
/// layer fills in whatever it could resolve; every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    /// Visible text, truncated by the capture layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A field the capture layer explicitly reported as holding a value of
/// interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedInput {
    pub field: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default)]
    pub is_login_field: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomSnapshot {
    pub timestamp: u64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleLogEntry {
    pub level: String,
    pub message: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEvent {
    pub url: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}
