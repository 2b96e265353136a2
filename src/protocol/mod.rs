// src/protocol/mod.rs

use crate::tools::{Params, ToolOutput};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

pub mod extract;
pub mod planner;
pub mod verifier;

/// One planned tool call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step_id: i64,
    pub tool: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub params: Params,
}

impl Step {
    pub fn new(step_id: i64, tool: &str, action: &str, params: Value) -> Self {
        Self {
            step_id,
            tool: tool.to_string(),
            action: action.to_string(),
            params: match params {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }
}

/// Ordered list of steps. Execution follows list order, not `step_id` order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<Step>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            parse_error: None,
        }
    }

    /// Substituted when the model's plan cannot be parsed.
    pub fn fallback(parse_error: impl Into<String>) -> Self {
        Self {
            steps: vec![
                Step::new(
                    1,
                    "github",
                    "search repositories",
                    json!({ "query": "python", "limit": 3 }),
                ),
                Step::new(2, "weather", "get weather", json!({ "city": "Bangalore" })),
            ],
            parse_error: Some(parse_error.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.parse_error.is_some()
    }
}

/// What one step produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepOutcome {
    Output(ToolOutput),
    Error(String),
}

/// Per-step results keyed by `step_{id}_{tool}` or `step_{id}_error`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionResults(BTreeMap<String, StepOutcome>);

impl ExecutionResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_output(&mut self, step: &Step, output: ToolOutput) {
        self.0
            .insert(format!("step_{}_{}", step.step_id, step.tool), StepOutcome::Output(output));
    }

    pub fn record_error(&mut self, step: &Step, message: impl Into<String>) {
        self.0
            .insert(format!("step_{}_error", step.step_id), StepOutcome::Error(message.into()));
    }

    pub fn get(&self, key: &str) -> Option<&StepOutcome> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StepOutcome)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Keys whose step failed outright (unknown tool or dispatch error).
    pub fn error_keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys().filter(|k| k.ends_with("_error"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Complete,
    Incomplete,
    VerificationFailed,
}

/// The verifier model's structured answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub status: VerificationStatus,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_results: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub weather_results: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_data: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Final output: either the model's verification or the raw results it failed on.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VerifiedOutput {
    Verified(Verification),
    Unverified {
        status: VerificationStatus,
        raw_results: ExecutionResults,
        error: String,
    },
}

impl VerifiedOutput {
    pub fn unverified(raw_results: ExecutionResults, error: impl Into<String>) -> Self {
        VerifiedOutput::Unverified {
            status: VerificationStatus::VerificationFailed,
            raw_results,
            error: error.into(),
        }
    }

    pub fn status(&self) -> VerificationStatus {
        match self {
            VerifiedOutput::Verified(v) => v.status,
            VerifiedOutput::Unverified { status, .. } => *status,
        }
    }
}

/// Everything one pipeline run produced.
#[derive(Clone, Debug, Serialize)]
pub struct TaskResponse {
    pub plan: Plan,
    pub execution_results: ExecutionResults,
    pub final_output: VerifiedOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_requires_id_and_tool() {
        let ok: Result<Step, _> = serde_json::from_value(json!({ "step_id": 3, "tool": "weather" }));
        let step = ok.unwrap();
        assert_eq!(step.action, "");
        assert!(step.params.is_empty());

        let missing_tool: Result<Step, _> = serde_json::from_value(json!({ "step_id": 3 }));
        assert!(missing_tool.is_err());

        let string_id: Result<Step, _> =
            serde_json::from_value(json!({ "step_id": "one", "tool": "github" }));
        assert!(string_id.is_err());
    }

    #[test]
    fn fallback_plan_is_github_then_weather() {
        let plan = Plan::fallback("expected value at line 1 column 1");
        assert!(plan.is_fallback());
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].tool, "github");
        assert_eq!(plan.steps[0].params["query"], "python");
        assert_eq!(plan.steps[0].params["limit"], 3);
        assert_eq!(plan.steps[1].tool, "weather");
        assert_eq!(plan.steps[1].params["city"], "Bangalore");
    }

    #[test]
    fn model_supplied_parse_error_is_ignored() {
        let plan: Plan = serde_json::from_value(json!({
            "steps": [{ "step_id": 1, "tool": "github" }],
            "parse_error": "pretend"
        }))
        .unwrap();
        assert!(!plan.is_fallback());
        assert!(plan.parse_error.is_none());
    }

    #[test]
    fn parse_error_is_omitted_when_absent() {
        let value = serde_json::to_value(Plan::new(vec![])).unwrap();
        assert_eq!(value, json!({ "steps": [] }));
    }

    #[test]
    fn results_are_keyed_by_step_and_tool() {
        let step = Step::new(7, "weather", "", json!({}));
        let mut results = ExecutionResults::new();
        results.record_output(&step, ToolOutput::failure("Weather API error: 401"));
        results.record_error(&Step::new(8, "jira", "", json!({})), "Unknown tool: jira");

        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(value["step_7_weather"], json!({ "error": "Weather API error: 401" }));
        assert_eq!(value["step_8_error"], "Unknown tool: jira");
        assert_eq!(results.error_keys().collect::<Vec<_>>(), vec!["step_8_error"]);
    }

    #[test]
    fn verification_rejects_unknown_status() {
        let bad: Result<Verification, _> =
            serde_json::from_value(json!({ "status": "done", "summary": "ok" }));
        assert!(bad.is_err());
    }

    #[test]
    fn null_result_lists_count_as_absent() {
        let v: Verification = serde_json::from_value(json!({
            "status": "incomplete",
            "summary": "GitHub search failed",
            "github_results": null,
            "weather_results": null,
            "missing_data": null
        }))
        .unwrap();
        assert_eq!(v.status, VerificationStatus::Incomplete);
        assert!(v.github_results.is_none());
        assert!(v.missing_data.is_none());
    }

    #[test]
    fn omitted_fields_stay_omitted() {
        let v: Verification =
            serde_json::from_value(json!({ "status": "complete", "summary": "ok" })).unwrap();
        assert_eq!(
            serde_json::to_value(VerifiedOutput::Verified(v)).unwrap(),
            json!({ "status": "complete", "summary": "ok" })
        );
    }

    #[test]
    fn verification_keeps_extra_fields() {
        let v: Verification = serde_json::from_value(json!({
            "status": "incomplete",
            "summary": "weather missing",
            "missing_data": ["weather for Paris"],
            "confidence": "low"
        }))
        .unwrap();
        assert_eq!(v.status, VerificationStatus::Incomplete);
        assert_eq!(v.extra["confidence"], "low");

        let out = serde_json::to_value(VerifiedOutput::Verified(v)).unwrap();
        assert_eq!(out["confidence"], "low");
        assert_eq!(out["status"], "incomplete");
    }

    #[test]
    fn unverified_output_wraps_raw_results() {
        let out = VerifiedOutput::unverified(ExecutionResults::new(), "EOF while parsing");
        assert_eq!(out.status(), VerificationStatus::VerificationFailed);
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({ "status": "verification_failed", "raw_results": {}, "error": "EOF while parsing" })
        );
    }
}
