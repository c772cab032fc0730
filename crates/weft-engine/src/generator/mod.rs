//! Dual-path spec generation behind one capability seam. The
//! coordinator holds an ordered list of `SpecGenerator` implementations
//! and runs a uniform try/fallback loop; nothing downstream branches on
//! which path produced a spec.

pub mod model;
pub mod prompt;
pub mod rules;

use crate::matcher::{Classification, FieldClass};
use crate::reducer::ReducedRecording;
use async_trait::async_trait;
use weft_common::error::CompileError;
use weft_common::spec::{IntentSpec, Param, placeholder};

#[async_trait]
pub trait SpecGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, reduced: &ReducedRecording) -> Result<IntentSpec, CompileError>;
}

/// Literals shorter than this are not swept or scanned: they are too
/// short to identify anything and substring replacement would mangle
/// unrelated snippet text.
pub const MIN_LITERAL_LEN: usize = 4;

pub fn param_description(class: FieldClass) -> Option<String> {
    match class {
        FieldClass::Identifier => Some("Login identifier (email or username)".into()),
        FieldClass::Secret => Some("Login secret".into()),
        FieldClass::Business(name) => Some(format!("Business value: {}", name.to_lowercase())),
        FieldClass::Generic => None,
    }
}

fn sweepable(binding: &Classification) -> bool {
    binding.value.len() >= MIN_LITERAL_LEN
}

/// Replaces every occurrence of a classified field's literal value in
/// step snippets and instructions with its placeholder, declaring the
/// param if the generator omitted it. The containment check runs
/// against every step, not just the field's own: a later step may
/// reference the same literal incidentally and must also be redacted.
///
/// Longer values substitute first so a value that contains another
/// (e.g. an email containing the username) is replaced whole.
pub fn substitute_literals(spec: &mut IntentSpec, bindings: &[Classification]) -> usize {
    let mut ordered: Vec<&Classification> = bindings.iter().filter(|b| sweepable(b)).collect();
    ordered.sort_by(|a, b| b.value.len().cmp(&a.value.len()));

    let mut replaced = 0;
    for binding in ordered {
        let token = placeholder(&binding.param_name);
        let mut used = false;
        for step in &mut spec.steps {
            if step.snippet.contains(&binding.value) {
                step.snippet = step.snippet.replace(&binding.value, &token);
                replaced += 1;
                used = true;
            }
            if step.instruction.contains(&binding.value) {
                step.instruction = step.instruction.replace(&binding.value, &token);
                replaced += 1;
                used = true;
            }
        }
        if used && !spec.params.iter().any(|p| p.name == binding.param_name) {
            spec.params.push(Param {
                name: binding.param_name.clone(),
                description: param_description(binding.class),
                default: default_for(binding),
            });
        }
    }
    replaced
}

/// Credentials never get a default; business and generic values do,
/// since the observed value is the natural starting point at replay.
pub fn default_for(binding: &Classification) -> Option<String> {
    if binding.is_sensitive() {
        None
    } else {
        Some(binding.value.clone())
    }
}

/// Scans a finished spec for any classified literal that survived
/// substitution. A hit means the placeholder could not be traced, which
/// is fatal for the generation path that produced the spec.
pub fn find_leaked_literal<'a>(
    spec: &IntentSpec,
    bindings: &'a [Classification],
) -> Option<&'a Classification> {
    bindings.iter().filter(|b| sweepable(b)).find(|binding| {
        spec.steps
            .iter()
            .any(|s| s.snippet.contains(&binding.value) || s.instruction.contains(&binding.value))
    })
}
