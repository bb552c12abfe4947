//! In-process submissions built from Rust closures.
//!
//! Each call runs on tokio's blocking pool, so a slow function does not
//! stall the runtime and a panic surfaces as [`InvocationError::Panicked`]
//! instead of unwinding through the grader.

use crate::error::{InvocationError, LoadError};
use crate::loader::{StudentFunction, SubmissionLoader};
use async_trait::async_trait;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use util::frame::Output;
use util::functions::{FunctionCall, GradableFunction};

pub type NativeFn = Arc<dyn Fn(FunctionCall) -> Result<Output, String> + Send + Sync>;

/// A submission made of in-process closures.
///
/// A call that times out is abandoned, not stopped: its blocking thread runs
/// until the closure returns, and dropping the tokio runtime waits for it.
/// Embedders that may see non-terminating closures should shut their runtime
/// down with [`tokio::runtime::Runtime::shutdown_timeout`].
#[derive(Clone, Default)]
pub struct NativeSubmission {
    functions: BTreeMap<GradableFunction, NativeFn>,
}

impl NativeSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` as the implementation of `function`, replacing any
    /// earlier one.
    pub fn with<F>(mut self, function: GradableFunction, f: F) -> Self
    where
        F: Fn(FunctionCall) -> Result<Output, String> + Send + Sync + 'static,
    {
        self.functions.insert(function, Arc::new(f));
        self
    }

    pub fn without(mut self, function: GradableFunction) -> Self {
        self.functions.remove(&function);
        self
    }
}

impl SubmissionLoader for NativeSubmission {
    fn load(&self, function: GradableFunction) -> Result<Arc<dyn StudentFunction>, LoadError> {
        let f = self
            .functions
            .get(&function)
            .cloned()
            .ok_or_else(|| LoadError::MissingFunction {
                function,
                message: "not registered".into(),
            })?;
        Ok(Arc::new(NativeFunction { function, f }))
    }

    fn describe(&self) -> String {
        format!("native submission with {} functions", self.functions.len())
    }
}

struct NativeFunction {
    function: GradableFunction,
    f: NativeFn,
}

#[async_trait]
impl StudentFunction for NativeFunction {
    fn function(&self) -> GradableFunction {
        self.function
    }

    async fn invoke(&self, call: &FunctionCall) -> Result<Output, InvocationError> {
        let f = Arc::clone(&self.f);
        let call = call.clone();
        match tokio::task::spawn_blocking(move || f(call)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(message)) => Err(InvocationError::Exception(message)),
            Err(e) if e.is_panic() => Err(InvocationError::Panicked(panic_message(e.into_panic()))),
            Err(e) => Err(InvocationError::Exception(e.to_string())),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
