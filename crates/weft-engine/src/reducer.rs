//! Essential-data reduction: strips a multi-megabyte recording down to
//! the bounded, redacted summary that feeds both generation paths. Raw
//! recordings are never sent to the analysis service; this is the only
//! legitimate transport shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use weft_common::error::CompileError;
use weft_common::recording::{ActionKind, CapturedInput, Recording, Viewport};

/// Bounded prefix of retained actions. A fixed prefix keeps prompt size
/// deterministic; sampling would not.
pub const MAX_ACTIONS: usize = 40;
pub const TEXT_MAX: usize = 50;
pub const VALUE_MAX: usize = 100;
pub const MAX_ENDPOINTS: usize = 10;
pub const DEFAULT_BUDGET_BYTES: usize = 40 * 1024;

#[derive(Debug, Clone, Copy)]
struct Caps {
    max_actions: usize,
    text_max: usize,
    value_max: usize,
}

impl Default for Caps {
    fn default() -> Self {
        Self {
            max_actions: MAX_ACTIONS,
            text_max: TEXT_MAX,
            value_max: VALUE_MAX,
        }
    }
}

impl Caps {
    fn halved(self) -> Self {
        Self {
            max_actions: (self.max_actions / 2).max(1),
            text_max: (self.text_max / 2).max(8),
            value_max: (self.value_max / 2).max(8),
        }
    }
}

/// The bounded, redacted summary of a Recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReducedRecording {
    pub session_id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub actions: Vec<ReducedAction>,
    /// Passed through verbatim; already minimal. Ordered map so the
    /// reduction serializes identically across runs.
    #[serde(default)]
    pub captured_inputs: BTreeMap<String, CapturedInput>,
    /// First and last snapshot, metadata only. Raw HTML never survives
    /// reduction.
    #[serde(default)]
    pub snapshots: Vec<SnapshotMeta>,
    /// Distinct API host + path-prefix strings observed on the wire.
    #[serde(default)]
    pub api_endpoints: Vec<String>,
    pub reduction: ReductionStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReducedAction {
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    /// Destination, retained for navigate actions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ReducedAction {
    /// Canonical key identifying the field this action touched. Matches
    /// the keys the capture layer uses for `captured_inputs`.
    pub fn field_key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .or(self.placeholder.as_deref())
            .or(self.selector.as_deref())
    }

    /// Best available selector for replay.
    pub fn replay_selector(&self) -> String {
        if let Some(sel) = &self.selector {
            return sel.clone();
        }
        if let Some(id) = &self.id {
            return format!("#{id}");
        }
        if let Some(name) = &self.name {
            return format!("[name=\"{name}\"]");
        }
        String::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub timestamp: u64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Informational only; reported for observability, never branched on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionStats {
    pub bytes_before: usize,
    pub bytes_after: usize,
    pub ratio: f32,
}

fn retained(kind: ActionKind) -> bool {
    matches!(
        kind,
        ActionKind::Click
            | ActionKind::Input
            | ActionKind::Type
            | ActionKind::Fill
            | ActionKind::Navigate
            | ActionKind::Submit
            | ActionKind::Select
    )
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Host + first two path segments of an API url, e.g.
/// `api.example.com/v1/items`.
fn endpoint_prefix(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let host = parsed.host_str()?;
    let prefix: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.take(2).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    if prefix.is_empty() {
        Some(host.to_string())
    } else {
        Some(format!("{host}/{}", prefix.join("/")))
    }
}

fn encoded_len<T: Serialize>(value: &T) -> usize {
    serde_json::to_string(value).map_or(0, |s| s.len())
}

fn reduce_with_caps(recording: &Recording, caps: Caps) -> ReducedRecording {
    let bytes_before = encoded_len(recording);

    let actions: Vec<ReducedAction> = recording
        .actions
        .iter()
        .filter(|a| retained(a.kind))
        .take(caps.max_actions)
        .map(|a| ReducedAction {
            kind: a.kind,
            selector: a.target.selector.clone(),
            text: a.target.text.as_deref().map(|t| truncate(t, caps.text_max)),
            id: a.target.id.clone(),
            name: a.target.name.clone(),
            placeholder: a.target.placeholder.clone(),
            value: a
                .target
                .value
                .as_deref()
                .map(|v| truncate(v, caps.value_max)),
            element_type: a.target.element_type.clone(),
            url: (a.kind == ActionKind::Navigate).then(|| a.url.clone()),
        })
        .collect();

    let mut snapshots = Vec::new();
    if let Some(first) = recording.dom_snapshots.first() {
        snapshots.push(SnapshotMeta {
            timestamp: first.timestamp,
            url: first.url.clone(),
            title: first.title.clone(),
        });
    }
    if recording.dom_snapshots.len() > 1
        && let Some(last) = recording.dom_snapshots.last()
    {
        snapshots.push(SnapshotMeta {
            timestamp: last.timestamp,
            url: last.url.clone(),
            title: last.title.clone(),
        });
    }

    // Ordered set so the summary is stable regardless of map iteration.
    let mut api_endpoints: Vec<String> = recording
        .network_events
        .values()
        .filter_map(|event| endpoint_prefix(&event.url))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    api_endpoints.truncate(MAX_ENDPOINTS);

    let captured_inputs: BTreeMap<String, CapturedInput> = recording
        .captured_inputs
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut reduced = ReducedRecording {
        session_id: recording.session_id.clone(),
        url: recording.url.clone(),
        title: recording.title.clone(),
        duration_ms: recording.duration_ms(),
        viewport: recording.viewport,
        user_agent: recording.user_agent.clone(),
        actions,
        captured_inputs,
        snapshots,
        api_endpoints,
        reduction: ReductionStats {
            bytes_before,
            bytes_after: 0,
            ratio: 0.0,
        },
    };

    let bytes_after = encoded_len(&reduced);
    reduced.reduction.bytes_after = bytes_after;
    reduced.reduction.ratio = if bytes_before > 0 {
        bytes_after as f32 / bytes_before as f32
    } else {
        1.0
    };
    debug!(
        session = %reduced.session_id,
        bytes_before,
        bytes_after,
        ratio = reduced.reduction.ratio,
        "reduced recording"
    );
    reduced
}

/// Deterministic, total reduction. Missing optional fields are the
/// common case, never an error.
pub fn reduce(recording: &Recording) -> ReducedRecording {
    reduce_with_caps(recording, Caps::default())
}

/// Reduction with a hard size budget on the serialized output. Over
/// budget once: halve the caps and retry. Over budget twice: fail
/// informationally.
pub fn reduce_bounded(
    recording: &Recording,
    budget: usize,
) -> Result<ReducedRecording, CompileError> {
    let reduced = reduce_with_caps(recording, Caps::default());
    if reduced.reduction.bytes_after <= budget {
        return Ok(reduced);
    }

    let reduced = reduce_with_caps(recording, Caps::default().halved());
    if reduced.reduction.bytes_after <= budget {
        Ok(reduced)
    } else {
        Err(CompileError::ReductionOverflow {
            size: reduced.reduction.bytes_after,
            budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("héllo wörld", 5), "héllo");
        assert_eq!(truncate("ab", 5), "ab");
    }

    #[test]
    fn endpoint_prefix_keeps_host_and_two_segments() {
        assert_eq!(
            endpoint_prefix("https://api.example.com/v1/items/42?page=2").as_deref(),
            Some("api.example.com/v1/items")
        );
        assert_eq!(
            endpoint_prefix("https://example.com/").as_deref(),
            Some("example.com")
        );
        assert_eq!(endpoint_prefix("not a url"), None);
    }

    #[test]
    fn halved_caps_never_reach_zero() {
        let caps = Caps::default().halved().halved().halved().halved();
        assert!(caps.max_actions >= 1);
        assert!(caps.value_max >= 8);
    }
}
