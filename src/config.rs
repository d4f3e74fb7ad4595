use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    // Required
    pub project_secret: String,
    pub github_token: String,
    pub llm_api_token: String,

    // Text generation
    #[serde(default = "default_llm_api_url")]
    pub llm_api_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,

    // Repository hosting
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,
    #[serde(default = "default_github_timeout_secs")]
    pub github_timeout_secs: u64,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    #[serde(default = "default_repo_init_delay_ms")]
    pub repo_init_delay_ms: u64,

    // Server
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // Job queue
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    #[serde(default = "default_job_queue_capacity")]
    pub job_queue_capacity: usize,

    // Callback delivery
    #[serde(default = "default_notify_max_attempts")]
    pub notify_max_attempts: u32,
    #[serde(default = "default_notify_initial_backoff_ms")]
    pub notify_initial_backoff_ms: u64,
    #[serde(default = "default_notify_timeout_secs")]
    pub notify_timeout_secs: u64,
}

fn default_llm_api_url() -> String {
    "https://aipipe.org/openai/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    120
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_timeout_secs() -> u64 {
    30
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_repo_init_delay_ms() -> u64 {
    2000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_concurrent_jobs() -> usize {
    4
}

fn default_job_queue_capacity() -> usize {
    32
}

fn default_notify_max_attempts() -> u32 {
    4
}

fn default_notify_initial_backoff_ms() -> u64 {
    1000
}

fn default_notify_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let llm_api_token = resolve_token(
            std::env::var("LLM_API_TOKEN").ok(),
            std::env::var("AI_PIPE_TOKEN").ok(),
        );

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("llm_api_token", llm_api_token)?
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.project_secret.is_empty() {
            return Err("PROJECT_SECRET is required".to_string());
        }
        if self.github_token.is_empty() {
            return Err("GITHUB_TOKEN is required".to_string());
        }
        if self.llm_api_token.is_empty() {
            return Err("LLM_API_TOKEN is required".to_string());
        }
        if !is_http_url(&self.llm_api_url) {
            return Err("LLM_API_URL must be an http(s) URL".to_string());
        }
        if !is_http_url(&self.github_api_url) {
            return Err("GITHUB_API_URL must be an http(s) URL".to_string());
        }
        if self.default_branch.trim().is_empty() {
            return Err("DEFAULT_BRANCH cannot be empty".to_string());
        }
        if self.max_concurrent_jobs == 0 {
            return Err("MAX_CONCURRENT_JOBS must be at least 1".to_string());
        }
        if self.job_queue_capacity == 0 {
            return Err("JOB_QUEUE_CAPACITY must be at least 1".to_string());
        }
        if self.github_timeout_secs == 0 {
            return Err("GITHUB_TIMEOUT_SECS must be at least 1".to_string());
        }
        if self.notify_max_attempts == 0 {
            return Err("NOTIFY_MAX_ATTEMPTS must be at least 1".to_string());
        }

        if self.project_secret.len() < 8 {
            tracing::warn!("PROJECT_SECRET is shorter than 8 characters");
        }

        Ok(())
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn github_timeout(&self) -> Duration {
        Duration::from_secs(self.github_timeout_secs)
    }

    pub fn repo_init_delay(&self) -> Duration {
        Duration::from_millis(self.repo_init_delay_ms)
    }

    pub fn notify_initial_backoff(&self) -> Duration {
        Duration::from_millis(self.notify_initial_backoff_ms)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }
}

/// Prefers the current variable, falling back to the legacy name.
fn resolve_token(primary: Option<String>, legacy: Option<String>) -> Option<String> {
    [primary, legacy]
        .into_iter()
        .flatten()
        .map(|raw| raw.trim().to_string())
        .find(|token| !token.is_empty())
}

pub(crate) fn is_http_url(raw: &str) -> bool {
    reqwest::Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
