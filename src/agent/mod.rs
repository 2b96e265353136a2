// src/agent/mod.rs

use crate::config::Settings;
use crate::context::Context;
use crate::error::RuntimeError;
use crate::llm::{ChatModel, LlmError, OpenAIClient, RetryPolicy, RetryingModel};
use crate::protocol::planner::{LLMPlanner, Planner};
use crate::protocol::verifier::{LLMVerifier, Verifier};
use crate::protocol::{ExecutionResults, Plan, TaskResponse, VerifiedOutput};
use crate::validation::validate_plan;
use std::sync::Arc;

pub mod executor;

pub use executor::execute_plan;

/// The three pipeline stages. `run` chains them.
pub trait Agent {
    fn plan(&self, task: &str) -> Result<Plan, LlmError>;
    fn execute(&self, plan: &Plan) -> ExecutionResults;
    fn evaluate(&self, results: &ExecutionResults, task: &str) -> Result<VerifiedOutput, LlmError>;

    fn run(&self, task: &str) -> Result<TaskResponse, RuntimeError> {
        let plan = self.plan(task)?;
        let execution_results = self.execute(&plan);
        let final_output = self.evaluate(&execution_results, task)?;

        Ok(TaskResponse {
            plan,
            execution_results,
            final_output,
        })
    }
}

/// Plans with a model, executes against registered tools, verifies with a model.
pub struct OperationsAgent {
    planner: Box<dyn Planner>,
    verifier: Box<dyn Verifier>,
    context: Context,
}

impl OperationsAgent {
    pub fn new(planner: Box<dyn Planner>, verifier: Box<dyn Verifier>, context: Context) -> Self {
        Self {
            planner,
            verifier,
            context,
        }
    }

    /// Planner and verifier share one model handle.
    pub fn with_model(llm: Arc<dyn ChatModel>, context: Context) -> Self {
        Self::new(
            Box::new(LLMPlanner::new(llm.clone())),
            Box::new(LLMVerifier::new(llm)),
            context,
        )
    }

    /// Production wiring: OpenAI client with retries, GitHub and weather tools.
    pub fn from_settings(settings: &Settings) -> Result<Self, RuntimeError> {
        let client = OpenAIClient::new(settings)?;
        let llm = RetryingModel::new(client, RetryPolicy::new(settings.max_llm_attempts));
        let context = Context::from_settings(settings)?;
        Ok(Self::with_model(Arc::new(llm), context))
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl Agent for OperationsAgent {
    fn plan(&self, task: &str) -> Result<Plan, LlmError> {
        let plan = self.planner.generate_plan(task)?;

        for issue in validate_plan(&plan, &self.context.tool_names()) {
            let (message, hint) = issue.hint();
            log::warn!("Plan validation: {message}");
            if let Some(hint) = hint {
                log::debug!("Hint: {hint}");
            }
        }

        Ok(plan)
    }

    fn execute(&self, plan: &Plan) -> ExecutionResults {
        execute_plan(&self.context, plan)
    }

    fn evaluate(&self, results: &ExecutionResults, task: &str) -> Result<VerifiedOutput, LlmError> {
        self.verifier.verify(results, task)
    }
}
