// tests/config_loading.rs

use std::io::Write;

use clap::Parser;
use tempfile::NamedTempFile;

use fanrun::FormatterKind;
use fanrun::cli::CliArgs;
use fanrun::config::load_and_validate;
use fanrun::errors::FanrunError;
use fanrun::resolve_run_file;
use fanrun_test_utils::builders::RunFileBuilder;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn loads_explicit_argument_list() {
    let file = write_config(
        r#"
executable = "python3"
arguments = ["job.py 0", "job.py 1"]
formatter = "append-line"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.executable, "python3");
    assert_eq!(cfg.arguments, vec!["job.py 0", "job.py 1"]);
    assert_eq!(cfg.formatter, FormatterKind::AppendLine);
    assert!(!cfg.show_window);
}

#[test]
fn expands_argument_template() {
    let file = write_config(
        r#"
executable = "worker"
argument = "--fast"
count = 3
show_window = true
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.process_count(), 3);
    assert!(cfg.arguments.iter().all(|a| a == "--fast"));
    assert!(cfg.show_window);
    assert_eq!(cfg.formatter, FormatterKind::NoMessages);
}

#[test]
fn missing_executable_is_config_error() {
    let file = write_config(r#"arguments = ["a"]"#);

    match load_and_validate(file.path()) {
        Err(FanrunError::ConfigError(msg)) => assert!(msg.contains("executable")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn arguments_and_template_are_exclusive() {
    let raw = RunFileBuilder::new("tool")
        .arguments(&["a"])
        .repeated("b", 2)
        .build_raw();

    assert!(matches!(
        fanrun::config::RunFile::try_from(raw),
        Err(FanrunError::ConfigError(_))
    ));
}

#[test]
fn zero_count_is_config_error() {
    let raw = RunFileBuilder::new("tool").repeated("b", 0).build_raw();

    match fanrun::config::RunFile::try_from(raw) {
        Err(FanrunError::ConfigError(msg)) => assert!(msg.contains("count")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn empty_argument_list_is_config_error() {
    let raw = RunFileBuilder::new("tool").arguments(&[]).build_raw();
    assert!(matches!(
        fanrun::config::RunFile::try_from(raw),
        Err(FanrunError::ConfigError(_))
    ));
}

#[test]
fn unknown_formatter_is_toml_error() {
    let file = write_config(
        r#"
executable = "tool"
argument = "x"
formatter = "everything"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(FanrunError::TomlError(_))
    ));
}

#[test]
fn unknown_key_is_toml_error() {
    let file = write_config(
        r#"
executable = "tool"
argument = "x"
retries = 3
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(FanrunError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    assert!(matches!(
        load_and_validate("/definitely/not/here/fanrun.toml"),
        Err(FanrunError::IoError(_))
    ));
}

#[test]
fn cli_flags_build_run_file() {
    let args = CliArgs::parse_from([
        "fanrun",
        "--exe",
        "echo",
        "--arg",
        "hello",
        "--count",
        "3",
        "--formatter",
        "last-line",
    ]);

    let cfg = resolve_run_file(&args).unwrap();
    assert_eq!(cfg.executable, "echo");
    assert_eq!(cfg.arguments, vec!["hello"; 3]);
    assert_eq!(cfg.formatter, FormatterKind::LastLine);
}

#[test]
fn cli_flags_override_config_file() {
    let file = write_config(
        r#"
executable = "python3"
arguments = ["a", "b"]
formatter = "append-line"
"#,
    );
    let path = file.path().to_string_lossy().to_string();

    let args = CliArgs::parse_from(["fanrun", "--config", &path, "--arg", "-v", "--arg", "z"]);

    let cfg = resolve_run_file(&args).unwrap();
    assert_eq!(cfg.executable, "python3");
    assert_eq!(cfg.arguments, vec!["-v", "z"]);
    assert_eq!(cfg.formatter, FormatterKind::AppendLine);
}

#[test]
fn count_with_several_args_is_rejected() {
    let args = CliArgs::parse_from([
        "fanrun", "--exe", "echo", "--arg", "a", "--arg", "b", "--count", "2",
    ]);

    assert!(matches!(
        resolve_run_file(&args),
        Err(FanrunError::ConfigError(_))
    ));
}

#[test]
fn formatter_kind_parses_common_spellings() {
    assert_eq!("append_line".parse::<FormatterKind>(), Ok(FormatterKind::AppendLine));
    assert_eq!("Last-Line".parse::<FormatterKind>(), Ok(FormatterKind::LastLine));
    assert_eq!("none".parse::<FormatterKind>(), Ok(FormatterKind::NoMessages));
    assert!("loud".parse::<FormatterKind>().is_err());
}
