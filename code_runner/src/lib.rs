//! # Code Runner
//!
//! Loads student implementations of the gradable functions and calls them
//! under a wall-clock limit.
//!
//! - [`SubmissionLoader`] resolves a
//!   [`GradableFunction`](util::functions::GradableFunction) to a callable
//!   [`StudentFunction`].
//! - [`CommandSubmission`] talks to an external bridge process (for example a
//!   Python script that imports the student's module).
//! - [`NativeSubmission`] wraps in-process Rust closures.
//! - [`invoke_with_timeout`] bounds a single call.

pub mod bridge;
pub mod command;
pub mod error;
pub mod loader;
pub mod native;

pub use command::CommandSubmission;
pub use error::{InvocationError, LoadError};
pub use loader::{StudentFunction, SubmissionLoader};
pub use native::NativeSubmission;

use tokio::time::{Duration, timeout};
use util::frame::Output;
use util::functions::FunctionCall;

/// Calls `function` once, giving up after `limit`.
///
/// When the limit elapses the pending call is dropped: an out-of-process
/// bridge is killed, an in-process call is abandoned on the blocking pool.
pub async fn invoke_with_timeout(
    function: &dyn StudentFunction,
    call: &FunctionCall,
    limit: Duration,
) -> Result<Output, InvocationError> {
    match timeout(limit, function.invoke(call)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(function = %function.function(), ?limit, "student call timed out");
            Err(InvocationError::Timeout(limit))
        }
    }
}
