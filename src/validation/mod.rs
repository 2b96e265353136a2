// src/validation/mod.rs

pub mod plan;

pub use plan::{PlanValidationError, validate_plan};
