// src/protocol/verifier.rs

use crate::llm::{ChatModel, ChatRequest, LlmError};
use crate::protocol::extract::parse_model_json;
use crate::protocol::{ExecutionResults, Verification, VerifiedOutput};
use std::sync::Arc;

pub trait Verifier: Send + Sync {
    /// Only model-call failures escape; unparseable output wraps the raw results.
    fn verify(&self, results: &ExecutionResults, task: &str) -> Result<VerifiedOutput, LlmError>;
}

const VERIFIER_PROMPT: &str = r#"
You are a Verifier Agent. Your job is to:
1. Check if all required data is present
2. Validate data completeness
3. Format into a clean, structured JSON output

Return a JSON object with:
{
  "status": "complete" or "incomplete",
  "summary": "Brief summary of findings",
  "github_results": [...],
  "weather_results": {...},
  "missing_data": []
}

Rules:
- Return ONLY valid JSON, no other text
- Check for errors in the results
- Summarize key findings
- Flag any missing or incomplete data
"#;

pub struct LLMVerifier {
    llm: Arc<dyn ChatModel>,
}

impl LLMVerifier {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }
}

fn user_prompt(results: &ExecutionResults, task: &str) -> String {
    let results_json =
        serde_json::to_string_pretty(results).unwrap_or_else(|_| String::from("{}"));
    format!(
        "\nOriginal Task: {task}\n\nExecution Results:\n{results_json}\n\nVerify and format these results.\n"
    )
}

impl Verifier for LLMVerifier {
    fn verify(&self, results: &ExecutionResults, task: &str) -> Result<VerifiedOutput, LlmError> {
        let request = ChatRequest::new(VERIFIER_PROMPT, user_prompt(results, task));
        let raw = self.llm.complete(&request)?;

        match parse_model_json::<Verification>(&raw) {
            Ok(verification) => Ok(VerifiedOutput::Verified(verification)),
            Err(err) => {
                log::warn!("Failed to parse verification, returning raw results: {err}");
                log::debug!("Raw verifier output: {raw}");
                Ok(VerifiedOutput::unverified(results.clone(), err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Step, VerificationStatus};
    use crate::tools::ToolOutput;
    use serde_json::json;
    use std::sync::Mutex;

    struct Canned {
        reply: String,
        last: Mutex<Option<ChatRequest>>,
    }

    impl Canned {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                last: Mutex::new(None),
            })
        }
    }

    impl ChatModel for Canned {
        fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
            *self.last.lock().unwrap() = Some(request.clone());
            Ok(self.reply.clone())
        }
    }

    struct Unavailable;

    impl ChatModel for Unavailable {
        fn complete(&self, _request: &ChatRequest) -> Result<String, LlmError> {
            Err(LlmError::Status {
                status: 503,
                body: "overloaded".into(),
            })
        }
    }

    fn results_with_error() -> ExecutionResults {
        let mut results = ExecutionResults::new();
        results.record_output(
            &Step::new(1, "weather", "", json!({ "city": "Atlantis" })),
            ToolOutput::failure("Weather API error: 404 Not Found"),
        );
        results.record_error(&Step::new(2, "stocks", "", json!({})), "Unknown tool: stocks");
        results
    }

    #[test]
    fn parsed_verification_is_returned_verbatim() {
        let reply = r#"```json
{
  "status": "incomplete",
  "summary": "Weather lookup failed; stocks tool is unknown.",
  "github_results": [],
  "weather_results": {},
  "missing_data": ["weather for Atlantis", "stocks"]
}
```"#;
        let output = LLMVerifier::new(Canned::new(reply))
            .verify(&results_with_error(), "weather in Atlantis and stock prices")
            .unwrap();

        match output {
            VerifiedOutput::Verified(v) => {
                assert_eq!(v.status, VerificationStatus::Incomplete);
                assert_eq!(v.missing_data.map(|m| m.len()), Some(2));
                assert!(v.summary.contains("unknown"));
            }
            other => panic!("expected verified output, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_reply_keeps_raw_results() {
        let results = results_with_error();
        let output = LLMVerifier::new(Canned::new("All good!"))
            .verify(&results, "task")
            .unwrap();

        match output {
            VerifiedOutput::Unverified {
                status,
                raw_results,
                error,
            } => {
                assert_eq!(status, VerificationStatus::VerificationFailed);
                assert_eq!(raw_results, results);
                assert!(raw_results.get("step_2_error").is_some());
                assert!(!error.is_empty());
            }
            other => panic!("expected raw passthrough, got {other:?}"),
        }
    }

    #[test]
    fn null_github_results_still_verify() {
        let reply = r#"{
  "status": "incomplete",
  "summary": "GitHub search failed.",
  "github_results": null,
  "weather_results": {"city": "Delhi"},
  "missing_data": ["github results"]
}"#;
        let output = LLMVerifier::new(Canned::new(reply))
            .verify(&results_with_error(), "task")
            .unwrap();
        assert_eq!(output.status(), VerificationStatus::Incomplete);

        let value = serde_json::to_value(&output).unwrap();
        assert!(value.get("github_results").is_none());
        assert_eq!(value["weather_results"]["city"], "Delhi");
    }

    #[test]
    fn missing_summary_counts_as_parse_failure() {
        let output = LLMVerifier::new(Canned::new(r#"{"status": "complete"}"#))
            .verify(&ExecutionResults::new(), "task")
            .unwrap();
        assert_eq!(output.status(), VerificationStatus::VerificationFailed);
    }

    #[test]
    fn prompt_embeds_task_and_results() {
        let model = Canned::new(r#"{"status": "complete", "summary": "ok"}"#);
        LLMVerifier::new(model.clone())
            .verify(&results_with_error(), "weather in Atlantis")
            .unwrap();

        let request = model.last.lock().unwrap().clone().unwrap();
        assert!(request.user.contains("Original Task: weather in Atlantis"));
        assert!(request.user.contains("\"step_2_error\": \"Unknown tool: stocks\""));
        assert!(request.system.contains("Flag any missing or incomplete data"));
    }

    #[test]
    fn model_failure_propagates() {
        let err = LLMVerifier::new(Arc::new(Unavailable))
            .verify(&ExecutionResults::new(), "task")
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
