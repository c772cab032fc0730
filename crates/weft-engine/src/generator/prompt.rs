use crate::reducer::ReducedRecording;
use weft_common::error::CompileError;

/// Hard ceiling on a prompt sent to the analysis service. The reducer's
/// own budget sits below this, so a bounded reduction always fits.
pub const MAX_PROMPT_BYTES: usize = 50 * 1024;

const INSTRUCTIONS: &str = "\
You are given a reduced browser session recording as JSON. Compile it \
into an automation spec: a single JSON object with fields `name`, \
`description`, `url`, `steps` and `params`.

Each step has `name`, `kind` (the action kind), `selector`, \
`instruction` (one sentence for a human or model replayer) and \
`snippet` (a Playwright-style one-liner). Every value that would vary \
between runs - credentials, names, prices, quantities - must be \
declared once in `params` (fields `name`, `description`, `default`) \
and referenced from snippets only as a {{NAME}} placeholder. Never put \
the literal value of a param in a snippet, an instruction, or a \
default of a credential param.

Reply with exactly one JSON object and no surrounding commentary.";

/// Builds the single bounded prompt for the analysis service. The
/// reduction is the only legitimate input; raw recordings never reach
/// this function.
pub fn build_prompt(reduced: &ReducedRecording) -> Result<String, CompileError> {
    let payload = serde_json::to_string_pretty(reduced)
        .map_err(|e| CompileError::MalformedRecording(format!("unencodable reduction: {e}")))?;
    let prompt = format!("{INSTRUCTIONS}\n\nRecording:\n{payload}\n");
    if prompt.len() > MAX_PROMPT_BYTES {
        return Err(CompileError::ReductionOverflow {
            size: prompt.len(),
            budget: MAX_PROMPT_BYTES,
        });
    }
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::ReductionStats;

    #[test]
    fn prompt_embeds_reduction_and_stays_bounded() {
        let reduced = ReducedRecording {
            session_id: "s1".into(),
            url: "https://example.com".into(),
            title: Some("Example".into()),
            duration_ms: 1234,
            viewport: None,
            user_agent: None,
            actions: vec![],
            captured_inputs: Default::default(),
            snapshots: vec![],
            api_endpoints: vec!["api.example.com/v1".into()],
            reduction: ReductionStats {
                bytes_before: 100,
                bytes_after: 50,
                ratio: 0.5,
            },
        };
        let prompt = build_prompt(&reduced).unwrap();
        assert!(prompt.contains("\"session_id\": \"s1\""));
        assert!(prompt.contains("{{NAME}}"));
        assert!(prompt.len() <= MAX_PROMPT_BYTES);
    }
}
