use clap::Parser;
use code_runner::CommandSubmission;
use colored::*;
use grader::{RunSettings, Runner, exit_code};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_appender::rolling;
use util::config::AppConfig;

/// Grades a momentum-strategy homework submission.
///
/// Every option falls back to its environment variable (see `.env`).
#[derive(Parser, Debug)]
#[command(name = "grade", version, about)]
struct Args {
    /// Price data CSV [env: GRADER_DATA_PATH]
    #[arg(long)]
    data: Option<PathBuf>,

    /// Where to write the JSON report [env: GRADER_RESULTS_PATH]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Grading config JSON (weights, tolerances, limits) [env: GRADER_CONFIG_PATH]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Repository identifier, e.g. course-org/hw1-jdoe [env: GITHUB_REPOSITORY]
    #[arg(long)]
    repository: Option<String>,

    /// Command that runs the student bridge [env: STUDENT_COMMAND]
    #[arg(long)]
    student_command: Option<String>,

    /// Time limit for one student call, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Exit with status 1 unless the submission earns full marks
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = AppConfig::from_env();
    let _log_guard = init_logging(&config);

    let mut settings = RunSettings::from_config(&config);
    if let Some(data) = args.data {
        settings.data_path = data;
    }
    if let Some(output) = args.output {
        settings.results_path = output;
    }
    if let Some(path) = args.config {
        settings.config_path = Some(path);
    }
    if let Some(repository) = args.repository {
        settings.repository = Some(repository);
    }
    settings.timeout_secs = args.timeout_secs;

    let student_command = args.student_command.unwrap_or(config.student_command);
    let submission = CommandSubmission::new(student_command);

    let mut runner = Runner::new(settings);
    match runner.run(&submission).await {
        Ok(report) => ExitCode::from(exit_code(&report, args.strict)),
        Err(e) => {
            tracing::error!(error = %e, state = %runner.state(), "grading aborted");
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn init_logging(config: &AppConfig) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", &config.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true);

    let env_filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new("grader=info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config.log_to_stdout {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
