// src/context/mod.rs

use crate::config::Settings;
use crate::tools::{GithubTool, Tool, ToolError, WeatherTool};
use std::collections::HashMap;

/// Runtime context for the executor: the tools a plan may call, by name.
pub struct Context {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registers the GitHub and weather tools configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, ToolError> {
        Ok(Self::new()
            .register_tool(GithubTool::new(settings)?)
            .register_tool(WeatherTool::new(settings)?))
    }

    pub fn register_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.insert(tool.name().into(), Box::new(tool));
        self
    }

    pub fn get_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|boxed| boxed.as_ref())
    }

    /// Registered tool names, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
