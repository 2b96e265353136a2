// src/tools/mod.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod github;
pub mod weather;

pub use github::GithubTool;
pub use weather::WeatherTool;

/// Parameters of a plan step, as emitted by the planner.
pub type Params = Map<String, Value>;

/// One repository from a search, projected to the fields we report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub stars: u64,
    pub url: String,
    pub description: String,
}

/// Current conditions for a city, in metric units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub humidity: i64,
    pub wind_speed: f64,
}

/// The result of executing a tool.
///
/// API failures are data, not errors: they come back as [`ToolOutput::Error`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Repositories(Vec<Repository>),
    Weather(WeatherReport),
    Error { error: String },
}

impl ToolOutput {
    pub fn failure(message: impl Into<String>) -> Self {
        ToolOutput::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolOutput::Error { .. })
    }
}

/// Raised by the dispatch layer when a step cannot be turned into a call.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid params for {tool}: {message}")]
    InvalidParams { tool: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Trait that defines a pluggable tool usable by the executor.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn execute(&self, params: &Params) -> Result<ToolOutput, ToolError>;
}

/// Decodes step params into a typed argument struct, treating `null` as absent.
pub(crate) fn decode_params<T>(tool: &str, params: &Params) -> Result<T, ToolError>
where
    T: serde::de::DeserializeOwned,
{
    let present: Map<String, Value> = params
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    serde_json::from_value(Value::Object(present)).map_err(|e| ToolError::InvalidParams {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::blocking::Client, ToolError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
