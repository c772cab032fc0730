use super::fields::{Classification, FieldClass};
use crate::reducer::{ReducedAction, ReducedRecording};
use weft_common::recording::ActionKind;

/// Abstracted step vocabulary the workflow templates are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractStep {
    Navigate,
    InputIdentifier,
    InputSecret,
    InputQuery,
    InputAny,
    ClickSubmitLike,
    ClickAny,
    Submit,
    Select,
}

impl AbstractStep {
    /// Whether an observed step satisfies a template step. `InputAny`
    /// and `ClickAny` are wildcards within their action family.
    fn accepts(self, observed: AbstractStep) -> bool {
        match self {
            AbstractStep::InputAny => matches!(
                observed,
                AbstractStep::InputIdentifier
                    | AbstractStep::InputSecret
                    | AbstractStep::InputQuery
                    | AbstractStep::InputAny
            ),
            AbstractStep::ClickAny => {
                matches!(
                    observed,
                    AbstractStep::ClickSubmitLike | AbstractStep::ClickAny
                )
            }
            exact => exact == observed,
        }
    }
}

/// A named abstract action pattern with a canonical naming convention.
#[derive(Debug)]
pub struct WorkflowTemplate {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub sequence: &'static [AbstractStep],
}

/// Catalog order is specificity order: most specific first. First
/// matching template wins.
pub const CATALOG: &[WorkflowTemplate] = &[
    WorkflowTemplate {
        name: "login",
        title: "Log in",
        description: "Log in with a username and password",
        sequence: &[
            AbstractStep::InputIdentifier,
            AbstractStep::InputSecret,
            AbstractStep::ClickSubmitLike,
        ],
    },
    WorkflowTemplate {
        name: "search",
        title: "Search",
        description: "Run a search for a query",
        sequence: &[AbstractStep::InputQuery],
    },
    WorkflowTemplate {
        name: "create_record",
        title: "Create record",
        description: "Fill out a form and submit it",
        sequence: &[AbstractStep::InputAny, AbstractStep::ClickSubmitLike],
    },
];

const SUBMIT_VOCABULARY: &[&str] = &[
    "submit", "sign in", "log in", "login", "save", "search", "continue", "create",
];

/// Similarity floor for fuzzy submit-button text matching.
const SUBMIT_SIMILARITY: f64 = 0.88;

/// A click counts as submit-like when the element declares itself a
/// submit control or its visible text resembles the submit vocabulary.
pub fn is_submit_like(action: &ReducedAction) -> bool {
    if action.element_type.as_deref() == Some("submit") {
        return true;
    }
    let sources = [
        action.text.as_deref(),
        action.id.as_deref(),
        action.name.as_deref(),
    ];
    sources.iter().flatten().any(|s| {
        let lower = s.to_lowercase();
        SUBMIT_VOCABULARY.iter().any(|&word| {
            lower.contains(word) || strsim::jaro_winkler(lower.trim(), word) >= SUBMIT_SIMILARITY
        })
    })
}

/// Projects the retained actions onto the abstract vocabulary, using
/// the field classifications to refine input steps.
pub fn abstract_actions(
    reduced: &ReducedRecording,
    classifications: &[Classification],
) -> Vec<AbstractStep> {
    let class_of = |key: Option<&str>| -> Option<FieldClass> {
        let key = key?;
        classifications
            .iter()
            .find(|c| c.field == key)
            .map(|c| c.class)
    };

    reduced
        .actions
        .iter()
        .map(|action| match action.kind {
            ActionKind::Navigate => AbstractStep::Navigate,
            ActionKind::Submit => AbstractStep::Submit,
            ActionKind::Select => AbstractStep::Select,
            ActionKind::Click => {
                if is_submit_like(action) {
                    AbstractStep::ClickSubmitLike
                } else {
                    AbstractStep::ClickAny
                }
            }
            _ => match class_of(action.field_key()) {
                Some(FieldClass::Identifier) => AbstractStep::InputIdentifier,
                Some(FieldClass::Secret) => AbstractStep::InputSecret,
                Some(FieldClass::Business("SEARCH_QUERY")) => AbstractStep::InputQuery,
                _ => AbstractStep::InputAny,
            },
        })
        .collect()
}

/// Order-preserving subsequence containment of a template sequence in
/// the observed steps.
fn is_subsequence(template: &[AbstractStep], observed: &[AbstractStep]) -> bool {
    let mut wanted = template.iter();
    let mut next = wanted.next();
    for step in observed {
        match next {
            Some(t) if t.accepts(*step) => next = wanted.next(),
            Some(_) => {}
            None => break,
        }
    }
    next.is_none()
}

/// First catalog template contained in the observed sequence. No match
/// is a valid, common outcome.
pub fn match_workflow(observed: &[AbstractStep]) -> Option<&'static WorkflowTemplate> {
    CATALOG
        .iter()
        .find(|template| is_subsequence(template.sequence, observed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsequence_need_not_be_contiguous() {
        let observed = [
            AbstractStep::Navigate,
            AbstractStep::InputIdentifier,
            AbstractStep::ClickAny,
            AbstractStep::InputSecret,
            AbstractStep::ClickSubmitLike,
        ];
        assert!(is_subsequence(CATALOG[0].sequence, &observed));
        assert!(!is_subsequence(
            CATALOG[0].sequence,
            &[AbstractStep::InputSecret, AbstractStep::InputIdentifier]
        ));
    }

    #[test]
    fn login_wins_over_create_record() {
        let observed = [
            AbstractStep::InputIdentifier,
            AbstractStep::InputSecret,
            AbstractStep::ClickSubmitLike,
        ];
        let matched = match_workflow(&observed).unwrap();
        assert_eq!(matched.name, "login");
    }

    #[test]
    fn no_match_is_a_valid_outcome() {
        assert!(match_workflow(&[AbstractStep::Navigate]).is_none());
        assert!(match_workflow(&[]).is_none());
    }

    #[test]
    fn submit_like_detection_uses_text_and_element_type() {
        let mut action = ReducedAction {
            kind: ActionKind::Click,
            selector: None,
            text: Some("Sign In".into()),
            id: None,
            name: None,
            placeholder: None,
            value: None,
            element_type: None,
            url: None,
        };
        assert!(is_submit_like(&action));

        action.text = Some("Read more".into());
        assert!(!is_submit_like(&action));

        action.element_type = Some("submit".into());
        assert!(is_submit_like(&action));
    }
}
