use crate::spec::ValidationError;
use thiserror::Error;

/// Failure taxonomy for the compilation pipeline. Only
/// `MalformedRecording` and an exhausted fallback chain reach the
/// caller; everything else resolves to a spec from another path.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Malformed recording: {0}")]
    MalformedRecording(String),
    #[error("Reduced recording still exceeds budget after retry: {size} > {budget} bytes")]
    ReductionOverflow { size: usize, budget: usize },
    #[error("Analysis service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Analysis service timed out after {0}ms")]
    ServiceTimeout(u64),
    #[error("No JSON object could be extracted from service response: {0}")]
    UnparseableResponse(String),
    #[error("Analysis service protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("Redaction violation: {0}")]
    RedactionViolation(String),
    #[error("Generated spec failed validation: {0}")]
    Validation(#[from] ValidationError),
}

impl CompileError {
    /// Whether the coordinator may recover by falling back to another
    /// generation path. A malformed input is fatal everywhere.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            CompileError::MalformedRecording(_) | CompileError::ReductionOverflow { .. }
        )
    }
}
