use std::time::Duration;
use thiserror::Error;
use util::functions::GradableFunction;

/// A student function could not be obtained from the submission.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("function '{function}' not found in submission: {message}")]
    MissingFunction {
        function: GradableFunction,
        message: String,
    },
    #[error("submission unavailable: {0}")]
    Unavailable(String),
}

/// A call into student code did not produce an output.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("exceeded time limit of {}s", .0.as_secs_f64())]
    Timeout(Duration),
    /// The submission does not define the requested function.
    #[error("function not defined: {0}")]
    MissingFunction(String),
    /// The student code raised or returned an error.
    #[error("{0}")]
    Exception(String),
    /// The student code panicked (in-process submissions only).
    #[error("panicked: {0}")]
    Panicked(String),
    #[error("process exited with {exit}: {stderr}", exit = describe_exit(.code))]
    Crashed { code: Option<i32>, stderr: String },
    #[error("unreadable response: {0}")]
    InvalidResponse(String),
    #[error("failed to encode call: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to run submission: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}
