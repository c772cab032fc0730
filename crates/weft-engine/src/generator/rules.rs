use super::{SpecGenerator, default_for, param_description, substitute_literals};
use crate::matcher::{self, Classification, MatchOutcome};
use crate::reducer::ReducedRecording;
use async_trait::async_trait;
use weft_common::error::CompileError;
use weft_common::recording::ActionKind;
use weft_common::spec::{IntentSpec, Param, Provenance, Step, placeholder};

/// The deterministic generation path. Total: the worst case is a spec
/// with zero steps and zero params, never a failure.
#[derive(Default)]
pub struct RuleBasedGenerator;

impl RuleBasedGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core, exposed so the coordinator and tests can run
    /// it without an executor.
    pub fn generate_spec(&self, reduced: &ReducedRecording) -> IntentSpec {
        let outcome = matcher::classify(reduced);
        build_spec(reduced, &outcome)
    }
}

#[async_trait]
impl SpecGenerator for RuleBasedGenerator {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    async fn generate(&self, reduced: &ReducedRecording) -> Result<IntentSpec, CompileError> {
        Ok(self.generate_spec(reduced))
    }
}

fn host_of(raw: &str) -> String {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "site".into())
}

fn slug(host: &str) -> String {
    host.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// A step under construction. Consecutive input events on the same
/// field collapse into one draft carrying the final value.
struct Draft {
    kind: ActionKind,
    selector: String,
    field_key: Option<String>,
    value: Option<String>,
    text: Option<String>,
    url: Option<String>,
}

fn collapse_actions(reduced: &ReducedRecording) -> Vec<Draft> {
    let mut drafts: Vec<Draft> = Vec::new();
    for action in &reduced.actions {
        let field_key = action.field_key().map(str::to_string);

        if action.kind.is_input_like()
            && let Some(last) = drafts.last_mut()
            && last.kind.is_input_like()
            && last.field_key.is_some()
            && last.field_key == field_key
        {
            // Same field, no intervening step: keep the final value.
            if action.value.is_some() {
                last.value = action.value.clone();
            }
            continue;
        }

        drafts.push(Draft {
            kind: action.kind,
            selector: action.replay_selector(),
            field_key,
            value: action.value.clone(),
            text: action.text.clone(),
            url: action.url.clone(),
        });
    }
    drafts
}

fn build_spec(reduced: &ReducedRecording, outcome: &MatchOutcome) -> IntentSpec {
    let host = host_of(&reduced.url);
    let (name, description) = match outcome.workflow {
        Some(wf) => (
            format!("{}_{}", wf.name, slug(&host)),
            format!("{} at {}", wf.description, host),
        ),
        None => (
            format!("workflow_{}", slug(&host)),
            format!("Recorded workflow at {}", host),
        ),
    };

    let class_of = |key: Option<&str>| -> Option<&Classification> {
        let key = key?;
        outcome.classifications.iter().find(|c| c.field == key)
    };

    let mut steps = Vec::new();
    let mut params: Vec<Param> = Vec::new();

    for draft in collapse_actions(reduced) {
        let classification = class_of(draft.field_key.as_deref());

        // Side-channel captured value wins over the reconstructed one;
        // the classification already carries that resolution.
        let value = classification
            .map(|c| c.value.clone())
            .or(draft.value)
            .unwrap_or_default();

        // The value slot is the placeholder when the field binds a
        // param, the literal otherwise.
        let rendered = match classification {
            Some(c) => {
                if !params.iter().any(|p| p.name == c.param_name) {
                    params.push(Param {
                        name: c.param_name.clone(),
                        description: param_description(c.class),
                        default: default_for(c),
                    });
                }
                placeholder(&c.param_name)
            }
            None => escape(&value),
        };

        let step = match draft.kind {
            ActionKind::Navigate => {
                let dest = draft.url.unwrap_or_else(|| reduced.url.clone());
                Step {
                    name: format!("Open {dest}"),
                    kind: draft.kind,
                    selector: String::new(),
                    instruction: format!("Navigate to {dest}"),
                    snippet: format!("page.goto('{}')", escape(&dest)),
                }
            }
            ActionKind::Click => Step {
                name: match &draft.text {
                    Some(text) => format!("Click '{text}'"),
                    None => format!("Click {}", draft.selector),
                },
                kind: draft.kind,
                selector: draft.selector.clone(),
                instruction: match &draft.text {
                    Some(text) => format!("Click the '{text}' control"),
                    None => format!("Click the element matching {}", draft.selector),
                },
                snippet: format!("page.click('{}')", escape(&draft.selector)),
            },
            ActionKind::Submit => Step {
                name: "Submit form".into(),
                kind: draft.kind,
                selector: draft.selector.clone(),
                instruction: "Submit the form".into(),
                snippet: if draft.selector.is_empty() {
                    "page.keyboard.press('Enter')".into()
                } else {
                    format!("page.click('{}')", escape(&draft.selector))
                },
            },
            ActionKind::Select => Step {
                name: format!("Select value in {}", draft.selector),
                kind: draft.kind,
                selector: draft.selector.clone(),
                instruction: format!("Select {rendered} in the {} dropdown", draft.selector),
                snippet: format!(
                    "page.select_option('{}', '{rendered}')",
                    escape(&draft.selector)
                ),
            },
            // Input-like kinds.
            _ => Step {
                name: format!("Fill {}", draft.selector),
                kind: draft.kind,
                selector: draft.selector.clone(),
                instruction: format!("Enter {rendered} into the {} field", draft.selector),
                snippet: format!("page.fill('{}', '{rendered}')", escape(&draft.selector)),
            },
        };
        steps.push(step);
    }

    let mut spec = IntentSpec {
        name,
        description,
        url: reduced.url.clone(),
        steps,
        params,
        provenance: Provenance::RuleBased,
    };

    // Catch incidental literal mentions in steps other than the one a
    // field originated from.
    substitute_literals(&mut spec, &outcome.classifications);
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::ReducedAction;

    fn input(id: &str, value: &str) -> ReducedAction {
        ReducedAction {
            kind: ActionKind::Input,
            selector: Some(format!("#{id}")),
            text: None,
            id: Some(id.into()),
            name: None,
            placeholder: None,
            value: Some(value.into()),
            element_type: None,
            url: None,
        }
    }

    fn reduced_with(actions: Vec<ReducedAction>) -> ReducedRecording {
        ReducedRecording {
            session_id: "s1".into(),
            url: "https://shop.example.com/admin".into(),
            title: None,
            duration_ms: 1000,
            viewport: None,
            user_agent: None,
            actions,
            captured_inputs: Default::default(),
            snapshots: vec![],
            api_endpoints: vec![],
            reduction: crate::reducer::ReductionStats {
                bytes_before: 0,
                bytes_after: 0,
                ratio: 0.0,
            },
        }
    }

    #[test]
    fn consecutive_inputs_on_same_field_collapse() {
        let reduced = reduced_with(vec![
            input("title", "W"),
            input("title", "Wi"),
            input("title", "Widget"),
        ]);
        let drafts = collapse_actions(&reduced);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].value.as_deref(), Some("Widget"));
    }

    #[test]
    fn navigation_breaks_collapsing() {
        let mut nav = input("title", "x");
        nav.kind = ActionKind::Navigate;
        nav.url = Some("https://shop.example.com/items".into());
        let reduced = reduced_with(vec![input("title", "Wid"), nav, input("title", "Widget")]);
        assert_eq!(collapse_actions(&reduced).len(), 3);
    }

    #[test]
    fn host_slug_for_unparseable_url() {
        assert_eq!(host_of("nonsense"), "site");
        assert_eq!(slug("shop.example.com"), "shop_example_com");
    }
}
