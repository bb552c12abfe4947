use marker::MarkerError;
use reference::ReferenceError;
use thiserror::Error;
use util::execution_config::ConfigError;
use util::lookback::LookbackError;

/// A failure that stops the run before (or while) producing a report.
#[derive(Debug, Error)]
pub enum GraderError {
    #[error("no repository identifier: set GITHUB_REPOSITORY or pass --repository")]
    MissingRepository,

    #[error(transparent)]
    Lookback(#[from] LookbackError),

    #[error("invalid grading config: {0}")]
    Config(#[from] ConfigError),

    #[error("reference computation failed: {0}")]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Marker(#[from] MarkerError),
}
