// tests/real_processes.rs
//
// Runs actual child processes through `sh`, so these only build on unix.

#![cfg(unix)]

use std::error::Error;

use fanrun::errors::FanrunError;
use fanrun::{FormatterKind, ProcessRunner, formatter_for};
use fanrun_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn sorted_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.lines().collect();
    lines.sort();
    lines
}

#[tokio::test]
async fn captures_stdout_and_stderr_of_every_instance() -> TestResult {
    init_tracing();

    let runner = ProcessRunner::new(
        "sh",
        vec![
            "-c 'echo one'".to_string(),
            "-c 'echo two; echo err >&2'".to_string(),
            "-c 'printf \"no newline\"'".to_string(),
        ],
        false,
        formatter_for(FormatterKind::AppendLine),
    )?;

    let results = with_timeout(runner.run()).await?;

    assert_eq!(sorted_lines(results.output()), vec!["no newline", "one", "two"]);
    assert_eq!(results.error(), "err\n");
    assert_eq!(results.combined_output().lines().count(), 4);

    runner.dispose();
    Ok(())
}

#[tokio::test]
async fn repeated_template_runs_count_instances() -> TestResult {
    let runner = ProcessRunner::repeated(
        "sh",
        "-c 'echo hi'",
        4,
        false,
        formatter_for(FormatterKind::AppendLine),
    )?;

    let results = with_timeout(runner.run()).await?;
    assert_eq!(results.output(), "hi\nhi\nhi\nhi\n");

    Ok(())
}

#[tokio::test]
async fn non_zero_exit_is_not_an_error() -> TestResult {
    let runner = ProcessRunner::new(
        "sh",
        vec!["-c 'echo partial; exit 7'".to_string()],
        false,
        formatter_for(FormatterKind::AppendLine),
    )?;

    let results = with_timeout(runner.run()).await?;
    assert_eq!(results.output(), "partial\n");

    Ok(())
}

#[tokio::test]
async fn no_messages_runs_without_capture() -> TestResult {
    let runner = ProcessRunner::new(
        "sh",
        vec!["-c 'exit 0'".to_string(), "-c 'exit 1'".to_string()],
        false,
        formatter_for(FormatterKind::NoMessages),
    )?;

    let results = with_timeout(runner.run()).await?;
    assert!(results.is_empty());

    Ok(())
}

#[tokio::test]
async fn missing_executable_is_launch_error() -> TestResult {
    let runner = ProcessRunner::new(
        "/definitely/not/a/fanrun/binary",
        vec![String::new()],
        false,
        formatter_for(FormatterKind::AppendLine),
    )?;

    match runner.start() {
        Err(FanrunError::LaunchError { index, .. }) => assert_eq!(index, 0),
        other => panic!("expected LaunchError, got {other:?}"),
    }
    assert!(!runner.is_running());

    Ok(())
}

#[tokio::test]
async fn unbalanced_quotes_are_launch_error() -> TestResult {
    let runner = ProcessRunner::new(
        "sh",
        vec!["-c 'echo".to_string()],
        false,
        formatter_for(FormatterKind::AppendLine),
    )?;

    assert!(matches!(
        runner.start(),
        Err(FanrunError::LaunchError { .. })
    ));

    Ok(())
}
