//! Variable and workflow pattern matching over a reduced recording.
//!
//! Field classification and the workflow catalog are ordered
//! declarative tables so new patterns extend data, not control flow.

pub mod fields;
pub mod workflow;

pub use fields::{Classification, FieldClass, classify_fields};
pub use workflow::{WorkflowTemplate, match_workflow};

use crate::reducer::ReducedRecording;

/// The matcher's combined verdict. No workflow match is a valid, common
/// outcome; generation then falls back to per-field classification
/// alone.
#[derive(Debug)]
pub struct MatchOutcome {
    pub classifications: Vec<Classification>,
    pub workflow: Option<&'static WorkflowTemplate>,
}

pub fn classify(reduced: &ReducedRecording) -> MatchOutcome {
    let classifications = fields::classify_fields(reduced);
    let abstracted = workflow::abstract_actions(reduced, &classifications);
    let workflow = workflow::match_workflow(&abstracted);
    MatchOutcome {
        classifications,
        workflow,
    }
}
