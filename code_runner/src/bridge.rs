//! Wire format spoken with an out-of-process bridge.
//!
//! The grader writes one [`FunctionCall`](util::functions::FunctionCall) as
//! JSON to the bridge's stdin and reads one [`BridgeResponse`] from the last
//! non-empty line of its stdout, so anything the student code prints before
//! that is ignored.

use crate::error::InvocationError;
use serde::{Deserialize, Serialize};
use util::frame::Output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeErrorKind {
    MissingFunction,
    Exception,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BridgeResponse {
    Ok { output: Output },
    Error { kind: BridgeErrorKind, message: String },
}

impl BridgeResponse {
    /// Parses the response from a bridge's captured stdout.
    pub fn from_stdout(stdout: &str) -> Result<Self, InvocationError> {
        let line = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| InvocationError::InvalidResponse("bridge printed nothing".into()))?;

        serde_json::from_str(line).map_err(|e| {
            InvocationError::InvalidResponse(format!("{e} in {}", preview(line)))
        })
    }

    pub fn into_result(self) -> Result<Output, InvocationError> {
        match self {
            BridgeResponse::Ok { output } => Ok(output),
            BridgeResponse::Error {
                kind: BridgeErrorKind::MissingFunction,
                message,
            } => Err(InvocationError::MissingFunction(message)),
            BridgeResponse::Error {
                kind: BridgeErrorKind::Exception,
                message,
            } => Err(InvocationError::Exception(message)),
        }
    }
}

/// First 200 characters of `text`, for error messages.
pub(crate) fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("'{}...'", &text[..cut]),
        None => format!("'{text}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response_after_student_prints() {
        let stdout = "debug: starting\n{\"status\":\"ok\",\"output\":{\"kind\":\"scalar\",\"value\":null}}\n\n";
        let output = BridgeResponse::from_stdout(stdout).unwrap().into_result().unwrap();
        match output {
            Output::Scalar { value } => assert!(value.is_nan()),
            other => panic!("unexpected kind {}", other.kind()),
        }
    }

    #[test]
    fn test_error_kinds() {
        let missing = r#"{"status":"error","kind":"missing_function","message":"no calculate_returns"}"#;
        assert!(matches!(
            BridgeResponse::from_stdout(missing).unwrap().into_result(),
            Err(InvocationError::MissingFunction(m)) if m == "no calculate_returns"
        ));

        let raised = r#"{"status":"error","kind":"exception","message":"ZeroDivisionError"}"#;
        assert!(matches!(
            BridgeResponse::from_stdout(raised).unwrap().into_result(),
            Err(InvocationError::Exception(_))
        ));
    }

    #[test]
    fn test_empty_and_garbage_output() {
        assert!(matches!(
            BridgeResponse::from_stdout("  \n"),
            Err(InvocationError::InvalidResponse(_))
        ));
        let err = BridgeResponse::from_stdout("Traceback (most recent call last)").unwrap_err();
        assert!(err.to_string().contains("Traceback"), "{err}");
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(500);
        assert_eq!(preview(&long).len(), 200 + 5);
    }
}
