// src/tools/github.rs

use crate::config::Settings;
use crate::tools::{Params, Repository, Tool, ToolError, ToolOutput, decode_params, http_client};
use serde::Deserialize;

pub const DEFAULT_QUERY: &str = "python";
pub const DEFAULT_SORT: &str = "stars";
pub const DEFAULT_LIMIT: usize = 3;
const NO_DESCRIPTION: &str = "No description";

/// Repository search against the GitHub REST API.
pub struct GithubTool {
    client: reqwest::blocking::Client,
    api_url: String,
    token: Option<String>,
}

impl GithubTool {
    pub fn new(settings: &Settings) -> Result<Self, ToolError> {
        Ok(Self {
            client: http_client(settings.tool_timeout)?,
            api_url: settings.github_api_url.trim_end_matches('/').to_string(),
            token: settings.github_token.clone(),
        })
    }

    /// Returns at most `limit` repositories sorted by `sort`, descending.
    /// Any failure is returned as [`ToolOutput::Error`].
    pub fn search_repos(&self, query: &str, sort: &str, limit: usize) -> ToolOutput {
        match self.fetch(query, sort) {
            Ok(response) => ToolOutput::Repositories(project(response, limit)),
            Err(err) => ToolOutput::failure(format!("GitHub API error: {err}")),
        }
    }

    fn fetch(&self, query: &str, sort: &str) -> Result<SearchResponse, reqwest::Error> {
        let url = format!("{}/search/repositories", self.api_url);
        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .query(&[("q", query), ("sort", sort), ("order", "desc")]);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request.send()?.error_for_status()?.json()
    }
}

#[derive(Deserialize)]
struct GithubParams {
    #[serde(default = "default_query")]
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Tool for GithubTool {
    fn name(&self) -> &str {
        "github"
    }

    fn description(&self) -> &str {
        "Search GitHub repositories (queries like: \"python repos\", \"AI repositories\", \"machine learning projects\")"
    }

    fn execute(&self, params: &Params) -> Result<ToolOutput, ToolError> {
        let params: GithubParams = decode_params(self.name(), params)?;
        Ok(self.search_repos(&params.query, DEFAULT_SORT, params.limit))
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    name: String,
    stargazers_count: u64,
    html_url: String,
    #[serde(default)]
    description: Option<String>,
}

fn project(response: SearchResponse, limit: usize) -> Vec<Repository> {
    response
        .items
        .into_iter()
        .take(limit)
        .map(|item| Repository {
            name: item.name,
            stars: item.stargazers_count,
            url: item.html_url,
            description: item.description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        })
        .collect()
}
