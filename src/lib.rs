pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod protocol;
pub mod tools;
pub mod validation;

pub use agent::{Agent, OperationsAgent};
pub use config::Settings;
pub use error::RuntimeError;
