//! Generation coordination: strategy selection, the try/fallback loop,
//! and final enforcement of the no-literal-secret invariant. This is
//! the single place that guarantees a returned spec carries no literal
//! value of any declared param, regardless of which path produced it.

use crate::analyzer::Analyzer;
use crate::config::{CompilerConfig, Strategy};
use crate::generator::model::ModelAssistedGenerator;
use crate::generator::rules::RuleBasedGenerator;
use crate::generator::{SpecGenerator, find_leaked_literal, substitute_literals};
use crate::matcher::{self, MatchOutcome};
use crate::reducer;
use std::time::Duration;
use tracing::{info, warn};
use weft_common::error::CompileError;
use weft_common::recording::Recording;
use weft_common::spec::{IntentSpec, Validatable};

pub struct Compiler {
    config: CompilerConfig,
    strategies: Vec<Box<dyn SpecGenerator>>,
}

impl Compiler {
    /// Builds the ordered strategy list for the configured mode. The
    /// model path needs an analyzer; without one the coordinator runs
    /// rule-based generation only.
    pub fn new(config: CompilerConfig, analyzer: Option<Box<dyn Analyzer>>) -> Self {
        let model = analyzer.map(|a| {
            Box::new(ModelAssistedGenerator::new(
                a,
                Duration::from_millis(config.analyzer.timeout_ms),
                config.analyzer.max_messages,
            )) as Box<dyn SpecGenerator>
        });
        let rules = || Box::new(RuleBasedGenerator::new()) as Box<dyn SpecGenerator>;

        let mut strategies: Vec<Box<dyn SpecGenerator>> = Vec::new();
        match (config.strategy, model) {
            (Strategy::RuleBased, _) => strategies.push(rules()),
            (Strategy::ModelAssisted, Some(model)) => strategies.push(model),
            (Strategy::ModelWithFallback, Some(model)) => {
                strategies.push(model);
                strategies.push(rules());
            }
            (_, None) => {
                warn!("no analyzer configured, running rule-based generation only");
                strategies.push(rules());
            }
        }

        Self { config, strategies }
    }

    /// Compiles one recording into an intent spec. Only a malformed
    /// recording or an exhausted fallback chain surfaces as an error.
    ///
    /// Concurrent calls share no state; calls for the same recording
    /// are independent generation requests, deliberately not coalesced.
    pub async fn compile(&self, recording: &Recording) -> Result<IntentSpec, CompileError> {
        recording.validate()?;

        // Both paths feed from the same bounded reduction; a raw
        // recording never crosses the service boundary.
        let reduced = reducer::reduce_bounded(recording, self.config.reducer.budget_bytes)?;
        let outcome = matcher::classify(&reduced);

        let mut last_error: Option<CompileError> = None;
        for generator in &self.strategies {
            match generator.generate(&reduced).await {
                Ok(spec) => match self.finalize(spec, &outcome) {
                    Ok(spec) => {
                        info!(
                            generator = generator.name(),
                            steps = spec.steps.len(),
                            params = spec.params.len(),
                            "compiled intent spec"
                        );
                        return Ok(spec);
                    }
                    Err(error) if error.is_recoverable() => {
                        warn!(generator = generator.name(), %error, "generated spec rejected");
                        last_error = Some(error);
                    }
                    Err(error) => return Err(error),
                },
                Err(error) if error.is_recoverable() => {
                    warn!(generator = generator.name(), %error, "generation path failed");
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            CompileError::MalformedRecording("no generation strategy configured".into())
        }))
    }

    /// Redaction enforcement and validation, uniform across paths. The
    /// external service is not trusted to have honored its redaction
    /// instruction; a literal param value found in a snippet is
    /// corrected here, and one that cannot be corrected kills this
    /// path's result.
    fn finalize(
        &self,
        mut spec: IntentSpec,
        outcome: &MatchOutcome,
    ) -> Result<IntentSpec, CompileError> {
        substitute_literals(&mut spec, &outcome.classifications);
        if let Some(leak) = find_leaked_literal(&spec, &outcome.classifications) {
            return Err(CompileError::RedactionViolation(format!(
                "literal value of param '{}' could not be replaced",
                leak.param_name
            )));
        }
        spec.validate()?;
        Ok(spec)
    }
}
