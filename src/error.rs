// src/error.rs

use crate::llm::LlmError;
use crate::tools::ToolError;
use thiserror::Error;

/// Everything that can stop a pipeline run. Tool and parse failures never
/// reach this type; they are recorded as data along the way.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}
