// src/validation/plan.rs

use crate::protocol::Plan;
use serde_json::{Value, json};
use std::collections::HashSet;

#[derive(Debug, PartialEq)]
pub enum PlanValidationError {
    EmptyPlan,
    DuplicateStepId(i64),
    InvalidTool { step_id: i64, tool: String },
    ParamTypeMismatch {
        step_id: i64,
        param: &'static str,
        expected: &'static str,
    },
}

impl PlanValidationError {
    pub fn hint(&self) -> (String, Option<Value>) {
        match self {
            PlanValidationError::EmptyPlan => ("Plan has no steps; nothing will run.".to_string(), None),
            PlanValidationError::DuplicateStepId(id) => (
                format!("Duplicate step_id {id}; later results overwrite earlier ones."),
                id.checked_add(1).map(|next| json!({ "step_id": next })),
            ),
            PlanValidationError::InvalidTool { step_id, tool } => (
                format!("Step {step_id} uses unknown tool '{tool}'."),
                Some(json!({ "tool": "github | weather" })),
            ),
            PlanValidationError::ParamTypeMismatch {
                step_id,
                param,
                expected,
            } => (
                format!("Step {step_id}: param '{param}' should be {expected}."),
                Some(json!({ "params": { param.to_string(): expected } })),
            ),
        }
    }
}

type ParamCheck = (&'static str, &'static str, fn(&Value) -> bool);

const GITHUB_PARAMS: &[ParamCheck] = &[
    ("query", "a string", Value::is_string as fn(&Value) -> bool),
    ("limit", "a non-negative integer", Value::is_u64 as fn(&Value) -> bool),
];
const WEATHER_PARAMS: &[ParamCheck] = &[("city", "a string", Value::is_string as fn(&Value) -> bool)];

/// Lints a plan against the registered tools. Advisory only: the executor
/// still runs every step.
pub fn validate_plan(plan: &Plan, registered_tools: &[&str]) -> Vec<PlanValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    if plan.steps.is_empty() {
        errors.push(PlanValidationError::EmptyPlan);
    }

    for step in &plan.steps {
        if !seen.insert(step.step_id) {
            errors.push(PlanValidationError::DuplicateStepId(step.step_id));
        }

        if !registered_tools.contains(&step.tool.as_str()) {
            errors.push(PlanValidationError::InvalidTool {
                step_id: step.step_id,
                tool: step.tool.clone(),
            });
            continue;
        }

        let expectations: &[ParamCheck] = match step.tool.as_str() {
            "github" => GITHUB_PARAMS,
            "weather" => WEATHER_PARAMS,
            _ => &[],
        };

        for &(param, expected, check) in expectations {
            match step.params.get(param) {
                Some(value) if !value.is_null() && !check(value) => {
                    errors.push(PlanValidationError::ParamTypeMismatch {
                        step_id: step.step_id,
                        param,
                        expected,
                    });
                }
                _ => {}
            }
        }
    }

    errors
}
