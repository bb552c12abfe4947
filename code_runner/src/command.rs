//! Runs student code out of process through a bridge command.
//!
//! For every call the configured command is run through `sh -c` with the
//! function name appended as its last argument, e.g.
//! `python3 student_bridge.py calculate_returns`. The call's JSON goes to
//! stdin and the answer is read from stdout (see [`crate::bridge`]).
//!
//! The bridge runs in its own process group. The whole group is killed when
//! the call ends or is abandoned, so processes the student code started do
//! not outlive it.

use crate::bridge::{BridgeResponse, preview};
use crate::error::{InvocationError, LoadError};
use crate::loader::{StudentFunction, SubmissionLoader};
use async_trait::async_trait;
use shell_escape::escape;
use std::borrow::Cow;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use util::frame::Output;
use util::functions::{FunctionCall, GradableFunction};

#[derive(Debug, Clone)]
pub struct CommandSubmission {
    command: String,
}

impl CommandSubmission {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl SubmissionLoader for CommandSubmission {
    fn load(&self, function: GradableFunction) -> Result<Arc<dyn StudentFunction>, LoadError> {
        if self.command.trim().is_empty() {
            return Err(LoadError::Unavailable("no student command configured".into()));
        }
        Ok(Arc::new(CommandFunction {
            function,
            submission: self.clone(),
        }))
    }

    fn describe(&self) -> String {
        format!("command '{}'", self.command)
    }
}

struct CommandFunction {
    function: GradableFunction,
    submission: CommandSubmission,
}

#[async_trait]
impl StudentFunction for CommandFunction {
    fn function(&self) -> GradableFunction {
        self.function
    }

    async fn invoke(&self, call: &FunctionCall) -> Result<Output, InvocationError> {
        let payload = serde_json::to_vec(call)?;
        let script = format!(
            "{} {}",
            self.submission.command,
            escape(Cow::Borrowed(self.function.name()))
        );

        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        tracing::debug!(function = %self.function, %script, bytes = payload.len(), "spawning bridge");
        let mut child = command.spawn()?;
        let _group = ProcessGroup::of(&child);

        // Feed stdin concurrently so a bridge that writes before it has read
        // everything cannot deadlock on a full pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                let result = stdin.write_all(&payload).await;
                drop(stdin);
                result
            })
        });

        let output = child.wait_with_output().await?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Err(e)) => tracing::debug!(error = %e, "bridge closed stdin early"),
                Err(e) => tracing::debug!(error = %e, "stdin writer task failed"),
                Ok(Ok(())) => {}
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(InvocationError::Crashed {
                code: output.status.code(),
                stderr: preview(stderr.trim()),
            });
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(function = %self.function, stderr = %stderr.trim(), "bridge stderr");
        }

        BridgeResponse::from_stdout(&stdout)?.into_result()
    }
}

/// Kills the bridge's process group when dropped.
///
/// `kill_on_drop` only reaches the direct child; anything it spawned is in
/// the same group because the bridge is started as a group leader.
struct ProcessGroup {
    pgid: Option<u32>,
}

impl ProcessGroup {
    fn of(child: &tokio::process::Child) -> Self {
        Self { pgid: child.id() }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };
        #[cfg(unix)]
        {
            let Ok(pgid) = libc::pid_t::try_from(pgid) else {
                return;
            };
            // ESRCH just means the group is already gone.
            let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
            if rc == 0 {
                tracing::debug!(pgid, "killed bridge process group");
            }
        }
        #[cfg(not(unix))]
        let _ = pgid;
    }
}
