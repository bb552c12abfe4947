use code_runner::{
    CommandSubmission, InvocationError, LoadError, NativeSubmission, SubmissionLoader,
    invoke_with_timeout,
};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use util::frame::Output;
use util::functions::{FunctionCall, GradableFunction};
use util::test_helpers::synthetic_prices;

const LIMIT: Duration = Duration::from_secs(10);

/// Writes a shell script standing in for a student bridge.
fn bridge_script(body: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("bridge.sh");
    fs::write(&path, body).expect("write script");
    (dir, path)
}

fn returns_call() -> FunctionCall {
    FunctionCall::CalculateReturns {
        prices: synthetic_prices(5),
    }
}

#[tokio::test]
async fn test_command_bridge_ok_response() {
    let (_dir, script) = bridge_script(
        "cat > /dev/null\n\
         echo 'student debug output'\n\
         echo '{\"status\":\"ok\",\"output\":{\"kind\":\"scalar\",\"value\":1.5}}'\n",
    );
    let submission = CommandSubmission::new(format!("sh {}", script.display()));
    let function = submission.load(GradableFunction::CalculateReturns).unwrap();

    let output = invoke_with_timeout(function.as_ref(), &returns_call(), LIMIT)
        .await
        .unwrap();
    match output {
        Output::Scalar { value } => assert_eq!(value, 1.5),
        other => panic!("unexpected kind {}", other.kind()),
    }
}

#[tokio::test]
async fn test_command_bridge_receives_call_and_function_name() {
    let (dir, script) = bridge_script(
        "cat > \"$(dirname \"$0\")/call.json\"\n\
         echo \"$1\" > \"$(dirname \"$0\")/name.txt\"\n\
         echo '{\"status\":\"ok\",\"output\":{\"kind\":\"scalar\",\"value\":0}}'\n",
    );
    let submission = CommandSubmission::new(format!("sh {}", script.display()));
    let function = submission.load(GradableFunction::CalculateMomentum).unwrap();
    let call = FunctionCall::CalculateMomentum {
        daily_returns: synthetic_prices(5),
        lookback_days: 100,
    };

    invoke_with_timeout(function.as_ref(), &call, LIMIT)
        .await
        .unwrap();

    let name = fs::read_to_string(dir.path().join("name.txt")).unwrap();
    assert_eq!(name.trim(), "calculate_momentum");

    let received: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("call.json")).unwrap()).unwrap();
    assert_eq!(received["function"], "calculate_momentum");
    assert_eq!(received["args"]["lookback_days"], 100);
    assert!(received["args"]["daily_returns"]["columns"].is_array());
}

#[tokio::test]
async fn test_command_bridge_missing_function() {
    let (_dir, script) = bridge_script(
        "cat > /dev/null\n\
         echo '{\"status\":\"error\",\"kind\":\"missing_function\",\"message\":\"no generate_signals\"}'\n",
    );
    let submission = CommandSubmission::new(format!("sh {}", script.display()));
    let function = submission.load(GradableFunction::GenerateSignals).unwrap();
    let call = FunctionCall::GenerateSignals {
        momentum: synthetic_prices(3),
    };

    let err = invoke_with_timeout(function.as_ref(), &call, LIMIT)
        .await
        .unwrap_err();
    assert!(matches!(err, InvocationError::MissingFunction(_)), "{err}");
}

#[tokio::test]
async fn test_command_bridge_exception() {
    let (_dir, script) = bridge_script(
        "cat > /dev/null\n\
         echo '{\"status\":\"error\",\"kind\":\"exception\",\"message\":\"KeyError: SP500\"}'\n",
    );
    let submission = CommandSubmission::new(format!("sh {}", script.display()));
    let function = submission.load(GradableFunction::CalculateReturns).unwrap();

    let err = invoke_with_timeout(function.as_ref(), &returns_call(), LIMIT)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "KeyError: SP500");
}

#[tokio::test]
async fn test_command_bridge_crash_reports_stderr() {
    let (_dir, script) = bridge_script("cat > /dev/null\necho 'segfault-ish' >&2\nexit 3\n");
    let submission = CommandSubmission::new(format!("sh {}", script.display()));
    let function = submission.load(GradableFunction::CalculateReturns).unwrap();

    let err = invoke_with_timeout(function.as_ref(), &returns_call(), LIMIT)
        .await
        .unwrap_err();
    match err {
        InvocationError::Crashed { code, stderr } => {
            assert_eq!(code, Some(3));
            assert!(stderr.contains("segfault-ish"), "{stderr}");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[tokio::test]
async fn test_command_bridge_invalid_response() {
    let (_dir, script) = bridge_script("cat > /dev/null\necho 'not json'\n");
    let submission = CommandSubmission::new(format!("sh {}", script.display()));
    let function = submission.load(GradableFunction::CalculateReturns).unwrap();

    let err = invoke_with_timeout(function.as_ref(), &returns_call(), LIMIT)
        .await
        .unwrap_err();
    assert!(matches!(err, InvocationError::InvalidResponse(_)), "{err}");
}

#[tokio::test]
async fn test_command_bridge_timeout() {
    let (dir, script) = bridge_script("sleep 1\ntouch \"$(dirname \"$0\")/still_alive\"\n");
    let submission = CommandSubmission::new(format!("sh {}", script.display()));
    let function = submission.load(GradableFunction::CalculateReturns).unwrap();

    let started = std::time::Instant::now();
    let err = invoke_with_timeout(function.as_ref(), &returns_call(), Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, InvocationError::Timeout(_)), "{err}");
    assert!(started.elapsed() < Duration::from_secs(1));

    // Processes started by the bridge die with it.
    tokio::time::sleep(Duration::from_millis(1800)).await;
    assert!(!dir.path().join("still_alive").exists());
}

#[tokio::test]
async fn test_command_bridge_background_children_are_reaped() {
    let (dir, script) = bridge_script(
        "cat > /dev/null\n\
         (sleep 1; touch \"$(dirname \"$0\")/orphan\") < /dev/null > /dev/null 2>&1 &\n\
         echo '{\"status\":\"ok\",\"output\":{\"kind\":\"scalar\",\"value\":2}}'\n",
    );
    let submission = CommandSubmission::new(format!("sh {}", script.display()));
    let function = submission.load(GradableFunction::CalculateReturns).unwrap();

    let output = invoke_with_timeout(function.as_ref(), &returns_call(), LIMIT)
        .await
        .unwrap();
    assert_eq!(output.kind(), "scalar");

    tokio::time::sleep(Duration::from_millis(1800)).await;
    assert!(!dir.path().join("orphan").exists());
}

#[test]
fn test_empty_command_cannot_load() {
    let submission = CommandSubmission::new("  ");
    assert!(matches!(
        submission.load(GradableFunction::ReadData),
        Err(LoadError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_native_submission_calls_closure() {
    let submission = NativeSubmission::new().with(GradableFunction::CalculateReturns, |call| {
        match call {
            FunctionCall::CalculateReturns { prices } => Ok(Output::Frame(prices)),
            _ => Err("wrong call".to_string()),
        }
    });
    let function = submission.load(GradableFunction::CalculateReturns).unwrap();
    assert_eq!(function.function(), GradableFunction::CalculateReturns);

    let output = invoke_with_timeout(function.as_ref(), &returns_call(), LIMIT)
        .await
        .unwrap();
    assert_eq!(output.kind(), "frame");
}

#[tokio::test]
async fn test_native_submission_errors_and_panics() {
    let submission = NativeSubmission::new()
        .with(GradableFunction::CalculateReturns, |_| Err("bad input".to_string()))
        .with(GradableFunction::GenerateSignals, |_| panic!("index out of range"));

    let failing = submission.load(GradableFunction::CalculateReturns).unwrap();
    let err = invoke_with_timeout(failing.as_ref(), &returns_call(), LIMIT)
        .await
        .unwrap_err();
    assert!(matches!(err, InvocationError::Exception(ref m) if m == "bad input"));

    let panicking = submission.load(GradableFunction::GenerateSignals).unwrap();
    let call = FunctionCall::GenerateSignals {
        momentum: synthetic_prices(3),
    };
    let err = invoke_with_timeout(panicking.as_ref(), &call, LIMIT)
        .await
        .unwrap_err();
    assert!(matches!(err, InvocationError::Panicked(ref m) if m.contains("index out of range")));
}

#[tokio::test]
async fn test_native_submission_missing_function() {
    let submission = NativeSubmission::new();
    assert!(matches!(
        submission.load(GradableFunction::CalculatePerformance),
        Err(LoadError::MissingFunction { .. })
    ));
}

#[tokio::test]
async fn test_native_submission_timeout() {
    let submission = NativeSubmission::new().with(GradableFunction::CalculateReturns, |call| {
        std::thread::sleep(Duration::from_millis(800));
        match call {
            FunctionCall::CalculateReturns { prices } => Ok(Output::Frame(prices)),
            _ => Err("wrong call".to_string()),
        }
    });
    let function = submission.load(GradableFunction::CalculateReturns).unwrap();
    let err = invoke_with_timeout(function.as_ref(), &returns_call(), Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, InvocationError::Timeout(_)));
}
