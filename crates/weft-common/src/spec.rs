use crate::recording::ActionKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Spec name cannot be empty")]
    EmptyName,
    #[error("Duplicate parameter name: {0}")]
    DuplicateParameter(String),
    #[error("Step '{step}' references undeclared parameter: {param}")]
    UndeclaredParameter { step: String, param: String },
}

/// The compiled, parameterized automation specification. Created once
/// by the generation coordinator and never mutated afterwards;
/// corrections happen by re-running the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub provenance: Provenance,
}

/// One replay instruction. The snippet substitutes a `{{NAME}}`
/// placeholder for every value that corresponds to a declared Param;
/// literal values of sensitive fields must never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub kind: ActionKind,
    #[serde(default)]
    pub selector: String,
    /// Natural-language instruction for a human-in-the-loop or
    /// model-driven replayer.
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub snippet: String,
}

/// A named variable substituted at replay time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Which generation path produced a spec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    RuleBased,
    ModelAssisted,
}

/// The replay-time placeholder token for a param name.
pub fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

pub trait Validatable {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validatable for IntentSpec {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let mut param_names = HashSet::new();
        for param in &self.params {
            if !param_names.insert(param.name.as_str()) {
                return Err(ValidationError::DuplicateParameter(param.name.clone()));
            }
        }

        // Every placeholder referenced by a snippet must name a declared
        // param, otherwise the spec is not replayable.
        for step in &self.steps {
            for referenced in placeholder_names(&step.snippet) {
                if !param_names.contains(referenced.as_str()) {
                    return Err(ValidationError::UndeclaredParameter {
                        step: step.name.clone(),
                        param: referenced,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Extracts the `{{NAME}}` tokens referenced by a snippet.
pub fn placeholder_names(snippet: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = snippet;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &after[end + 2..];
            }
            None => break,
        }
    }
    names
}
