// src/protocol/planner.rs

use crate::llm::{ChatModel, ChatRequest, LlmError};
use crate::protocol::Plan;
use crate::protocol::extract::parse_model_json;
use std::sync::Arc;

/// Trait for turning a free-text task into a [`Plan`].
pub trait Planner: Send + Sync {
    /// Only model-call failures escape; unparseable output yields the fallback plan.
    fn generate_plan(&self, task: &str) -> Result<Plan, LlmError>;
}

const PLANNER_PROMPT: &str = r#"
You are a Planner Agent. Your job is to break down user tasks into structured execution steps.

Available tools:
- github: Search GitHub repositories (queries like: "python repos", "AI repositories", "machine learning projects")
- weather: Get weather information for cities (queries like: "Bangalore", "Delhi", "Mumbai")

Analyze the user's task and create a JSON plan with the following structure:
{
  "steps": [
    {"step_id": 1, "tool": "github", "action": "search for python repositories", "params": {"query": "python", "limit": 3}},
    {"step_id": 2, "tool": "weather", "action": "get weather for Bangalore", "params": {"city": "Bangalore"}}
  ]
}

Rules:
1. Extract city names for weather queries
2. Extract search topics for GitHub queries
3. Return ONLY valid JSON, no other text
4. Each step must have: step_id, tool, action, params
"#;

/// Implementation backed by a chat model and a fixed planning prompt.
pub struct LLMPlanner {
    llm: Arc<dyn ChatModel>,
}

impl LLMPlanner {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }
}

impl Planner for LLMPlanner {
    fn generate_plan(&self, task: &str) -> Result<Plan, LlmError> {
        let request = ChatRequest::new(
            PLANNER_PROMPT,
            format!("Task: {task}\n\nCreate an execution plan."),
        );
        let raw = self.llm.complete(&request)?;

        match parse_model_json::<Plan>(&raw) {
            Ok(plan) => Ok(plan),
            Err(err) => {
                log::warn!("Failed to parse plan, using fallback: {err}");
                log::debug!("Raw planner output: {raw}");
                Ok(Plan::fallback(err.to_string()))
            }
        }
    }
}
