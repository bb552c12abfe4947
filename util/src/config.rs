//! Process configuration.
//!
//! `AppConfig` is read once at start-up from `.env` and the process
//! environment, then passed explicitly to whatever needs it. The CLI may
//! override individual fields.

use std::env;
use std::path::PathBuf;

/// Environment variable holding the repository identifier (set by GitHub Actions).
pub const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub repository: Option<String>,
    pub data_path: PathBuf,
    pub results_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub student_command: String,
}

impl AppConfig {
    /// Loads the configuration from `.env` (if present) and the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        Self {
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "grader=info".into()),
            log_file: get("LOG_FILE").unwrap_or_else(|| "grader.log".into()),
            log_to_stdout: get("LOG_TO_STDOUT").as_deref() == Some("true"),
            repository: non_empty(REPOSITORY_VAR),
            data_path: get("GRADER_DATA_PATH")
                .unwrap_or_else(|| "data/price_data.csv".into())
                .into(),
            results_path: get("GRADER_RESULTS_PATH")
                .unwrap_or_else(|| "grading_results.json".into())
                .into(),
            config_path: non_empty("GRADER_CONFIG_PATH").map(PathBuf::from),
            student_command: get("STUDENT_COMMAND")
                .unwrap_or_else(|| "python3 student_bridge.py".into()),
        }
    }
}
