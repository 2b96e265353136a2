// src/config/mod.rs

use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_WEATHER_API_URL: &str = "http://api.openweathermap.org/data/2.5";
pub const DEFAULT_MAX_LLM_ATTEMPTS: u32 = 3;

/// Fixed timeout for every outbound tool request.
pub const TOOL_TIMEOUT: Duration = Duration::from_secs(10);

/// Values shipped in `.env.example` that mean "not configured yet".
const PLACEHOLDERS: &[&str] = &[
    "your_openai_key_here",
    "your_github_token_here",
    "your_openweather_api_key_here",
];

/// Process-wide configuration, read once and never mutated afterwards.
///
/// Agents and tools receive a reference at construction time instead of
/// reaching for the environment themselves.
#[derive(Clone, Debug)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub github_token: Option<String>,
    pub weather_api_key: Option<String>,
    pub model: String,
    pub openai_base_url: String,
    pub github_api_url: String,
    pub weather_api_url: String,
    pub max_llm_attempts: u32,
    pub tool_timeout: Duration,
}

impl Settings {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                log::warn!("Failed to load .env file: {err}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |key: &str| lookup(key).and_then(non_placeholder);
        let or_default = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let max_llm_attempts = match lookup("LLM_MAX_ATTEMPTS").map(|v| v.trim().parse::<u32>()) {
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                log::warn!(
                    "Ignoring invalid LLM_MAX_ATTEMPTS, using {}",
                    DEFAULT_MAX_LLM_ATTEMPTS
                );
                DEFAULT_MAX_LLM_ATTEMPTS
            }
            None => DEFAULT_MAX_LLM_ATTEMPTS,
        };

        Self {
            openai_api_key: secret("OPENAI_API_KEY"),
            github_token: secret("GITHUB_TOKEN"),
            weather_api_key: secret("WEATHER_API_KEY"),
            model: or_default("OPENAI_MODEL", DEFAULT_MODEL),
            openai_base_url: or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            github_api_url: or_default("GITHUB_API_URL", DEFAULT_GITHUB_API_URL),
            weather_api_url: or_default("WEATHER_API_URL", DEFAULT_WEATHER_API_URL),
            max_llm_attempts,
            tool_timeout: TOOL_TIMEOUT,
        }
    }

    /// Inspects the configuration the way a setup checker would.
    pub fn check(&self) -> SetupReport {
        let mut report = SetupReport::default();

        match &self.openai_api_key {
            Some(key) => report.configured.push(("OPENAI_API_KEY", mask(key))),
            None => report.issues.push("OPENAI_API_KEY not set in .env".into()),
        }
        match &self.github_token {
            Some(key) => report.configured.push(("GITHUB_TOKEN", mask(key))),
            None => report.issues.push("GITHUB_TOKEN not set in .env".into()),
        }
        match &self.weather_api_key {
            Some(key) => report.configured.push(("WEATHER_API_KEY", mask(key))),
            None => report.warnings.push(
                "WEATHER_API_KEY not set - get one from https://openweathermap.org/api".into(),
            ),
        }

        report
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Outcome of [`Settings::check`].
#[derive(Debug, Default)]
pub struct SetupReport {
    pub configured: Vec<(&'static str, String)>,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

impl SetupReport {
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }
}

fn non_placeholder(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn mask(secret: &str) -> String {
    let prefix: String = secret.chars().take(8).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let settings = Settings::default();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.github_api_url, DEFAULT_GITHUB_API_URL);
        assert_eq!(settings.weather_api_url, DEFAULT_WEATHER_API_URL);
        assert_eq!(settings.max_llm_attempts, 3);
        assert_eq!(settings.tool_timeout, Duration::from_secs(10));
        assert!(settings.openai_api_key.is_none());
    }

    #[test]
    fn placeholder_and_blank_secrets_count_as_unset() {
        let settings = settings_from(&[
            ("OPENAI_API_KEY", "your_openai_key_here"),
            ("GITHUB_TOKEN", "   "),
            ("WEATHER_API_KEY", "abc123"),
        ]);
        assert!(settings.openai_api_key.is_none());
        assert!(settings.github_token.is_none());
        assert_eq!(settings.weather_api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn invalid_attempt_count_falls_back_to_default() {
        assert_eq!(
            settings_from(&[("LLM_MAX_ATTEMPTS", "zero")]).max_llm_attempts,
            3
        );
        assert_eq!(settings_from(&[("LLM_MAX_ATTEMPTS", "0")]).max_llm_attempts, 3);
        assert_eq!(settings_from(&[("LLM_MAX_ATTEMPTS", "5")]).max_llm_attempts, 5);
    }

    #[test]
    fn check_reports_missing_weather_key_as_warning_only() {
        let settings = settings_from(&[
            ("OPENAI_API_KEY", "sk-test-1234567890"),
            ("GITHUB_TOKEN", "ghp_abcdefghijkl"),
        ]);
        let report = settings.check();
        assert!(report.is_ready());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.configured[0], ("OPENAI_API_KEY", "sk-test-...".to_string()));
    }

    #[test]
    fn check_flags_missing_model_key() {
        let report = Settings::default().check();
        assert!(!report.is_ready());
        assert_eq!(report.issues.len(), 2);
    }
}
