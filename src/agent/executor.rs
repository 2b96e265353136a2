// src/agent/executor.rs

use crate::context::Context;
use crate::protocol::{ExecutionResults, Plan};
use crate::tools::ToolOutput;

/// Runs every step in list order. A failing step is recorded and the next
/// one still runs, so the result has exactly one entry per step.
pub fn execute_plan(context: &Context, plan: &Plan) -> ExecutionResults {
    let mut results = ExecutionResults::new();

    for step in &plan.steps {
        let Some(tool) = context.get_tool(&step.tool) else {
            log::warn!("Step {}: unknown tool '{}'", step.step_id, step.tool);
            results.record_error(step, format!("Unknown tool: {}", step.tool));
            continue;
        };

        log::info!("Step {}: running {} ({})", step.step_id, step.tool, step.action);
        match tool.execute(&step.params) {
            Ok(output) => {
                if let ToolOutput::Error { error } = &output {
                    log::warn!("Step {}: {}", step.step_id, error);
                }
                results.record_output(step, output);
            }
            Err(err) => {
                log::warn!("Step {} failed: {}", step.step_id, err);
                results.record_error(step, err.to_string());
            }
        }
    }

    results
}
