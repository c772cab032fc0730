use async_trait::async_trait;
use weft_common::error::CompileError;
use weft_common::protocol::{AnalyzerMessage, AnalyzerRequest};

/// The external analysis service boundary: one prompt out, an ordered
/// stream of typed messages back. Implementations perform no retries;
/// retrying a paid external service is the caller's cost decision, not
/// a correctness one.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, prompt: &str) -> Result<Vec<AnalyzerMessage>, CompileError>;
}

/// HTTP client for the analysis service.
pub struct HttpAnalyzer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnalyzer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(&self, prompt: &str) -> Result<Vec<AnalyzerMessage>, CompileError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzerRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await
            .map_err(|e| CompileError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompileError::ServiceUnavailable(format!(
                "analysis service returned {status}"
            )));
        }

        response
            .json::<Vec<AnalyzerMessage>>()
            .await
            .map_err(|e| CompileError::UnparseableResponse(format!("malformed envelope: {e}")))
    }
}
