//! The seam between the grader and student code.

use crate::error::{InvocationError, LoadError};
use async_trait::async_trait;
use std::sync::Arc;
use util::frame::Output;
use util::functions::{FunctionCall, GradableFunction};

/// One callable student function.
#[async_trait]
pub trait StudentFunction: Send + Sync {
    fn function(&self) -> GradableFunction;

    /// Calls the function once with `call`'s arguments.
    async fn invoke(&self, call: &FunctionCall) -> Result<Output, InvocationError>;
}

/// Resolves gradable functions in a student submission.
pub trait SubmissionLoader: Send + Sync {
    fn load(&self, function: GradableFunction) -> Result<Arc<dyn StudentFunction>, LoadError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}
