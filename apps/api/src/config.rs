use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;
const DEFAULT_QUESTIONS_COUNT: usize = 5;

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub upload_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub frontend_url: String,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub max_upload_size: usize,
    pub questions_count: usize,
    pub task_workers: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let questions_count = parse_env("DEFAULT_QUESTIONS_COUNT", DEFAULT_QUESTIONS_COUNT)?;
        if questions_count == 0 {
            bail!("DEFAULT_QUESTIONS_COUNT must be at least 1");
        }

        Ok(Config {
            upload_dir: PathBuf::from(
                std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            ),
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            max_upload_size: parse_env("MAX_UPLOAD_SIZE", DEFAULT_MAX_UPLOAD_SIZE)?,
            questions_count,
            task_workers: parse_env::<usize>("TASK_WORKERS", 2)?.max(1),
        })
    }

    /// Configuration used by tests: mock providers, a caller-chosen root.
    #[cfg(test)]
    pub fn for_tests(upload_dir: impl Into<PathBuf>) -> Self {
        Config {
            upload_dir: upload_dir.into(),
            port: 0,
            rust_log: "debug".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            openai_api_key: None,
            gemini_api_key: None,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            questions_count: DEFAULT_QUESTIONS_COUNT,
            task_workers: 1,
        }
    }
}

/// Reads an optional key, treating an empty or whitespace-only value as unset.
fn optional_env(key: &str) -> Option<String> {
    non_empty(std::env::var(key).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
