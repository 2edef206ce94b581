// tests/process_creator.rs

use std::sync::Arc;

use fanrun::drain::DrainLoop;
use fanrun::errors::FanrunError;
use fanrun::exec::{ProcessCreator, ProcessLauncher};
use fanrun_test_utils::fake_launcher::FakeLauncher;

fn launcher() -> Arc<dyn ProcessLauncher> {
    Arc::new(FakeLauncher::new())
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|a| a.to_string()).collect()
}

#[test]
fn rejects_empty_executable() {
    let result = ProcessCreator::new("  ", args(&["a"]), false, launcher());
    match result {
        Err(FanrunError::ConfigError(msg)) => assert!(msg.contains("executable")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn rejects_empty_argument_list() {
    let result = ProcessCreator::new("tool", Vec::new(), false, launcher());
    assert!(matches!(result, Err(FanrunError::ConfigError(_))));
}

#[test]
fn rejects_nul_in_arguments() {
    let result = ProcessCreator::new("tool", args(&["ok", "bad\0arg"]), false, launcher());
    match result {
        Err(FanrunError::ConfigError(msg)) => assert!(msg.contains("#1")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn repeated_rejects_zero_count() {
    let result = ProcessCreator::repeated("tool", "x", 0, false, launcher());
    assert!(matches!(result, Err(FanrunError::ConfigError(_))));
}

#[test]
fn repeated_expands_template() {
    let creator = ProcessCreator::repeated("tool", "--job 1", 3, true, launcher()).unwrap();
    assert_eq!(creator.process_count(), 3);
    assert!(creator.arguments().iter().all(|a| a == "--job 1"));
    assert!(creator.show_window());
}

#[test]
fn creates_one_handle_per_argument_in_order() {
    let creator = ProcessCreator::new("tool", args(&["a", "b", "c"]), false, launcher()).unwrap();

    let handles = creator.create_handles(None).unwrap();

    let seen: Vec<(usize, &str)> = handles.iter().map(|h| (h.index(), h.arguments())).collect();
    assert_eq!(seen, vec![(0, "a"), (1, "b"), (2, "c")]);
    assert!(handles.iter().all(|h| !h.redirects_output()));
}

#[test]
fn sink_enables_redirection() {
    let creator = ProcessCreator::new("tool", args(&["a", "b"]), false, launcher()).unwrap();
    let (_drain, sink) = DrainLoop::new();

    let handles = creator.create_handles(Some(sink)).unwrap();
    assert!(handles.iter().all(|h| h.redirects_output()));
}

#[test]
fn recreating_handles_disposes_previous_set() {
    let creator = ProcessCreator::new("tool", args(&["a", "b"]), false, launcher()).unwrap();

    let first = creator.create_handles(None).unwrap();
    let second = creator.create_handles(None).unwrap();

    assert!(first.iter().all(|h| h.is_disposed()));
    assert!(second.iter().all(|h| !h.is_disposed()));
    assert!(matches!(first[0].start(), Err(FanrunError::Disposed(_))));
    assert!(second[0].start().is_ok());
}

#[test]
fn clone_is_independent() {
    let creator = ProcessCreator::new("tool", args(&["a"]), false, launcher()).unwrap();
    let original_handles = creator.create_handles(None).unwrap();

    let clone = creator.try_clone().unwrap();
    assert_eq!(clone.executable(), "tool");
    assert_eq!(clone.arguments(), creator.arguments());

    let _clone_handles = clone.create_handles(None).unwrap();
    clone.dispose();

    assert!(!original_handles[0].is_disposed());
    assert!(!creator.is_disposed());
}

#[test]
fn dispose_is_idempotent_and_terminal() {
    let creator = ProcessCreator::new("tool", args(&["a", "b"]), false, launcher()).unwrap();
    let handles = creator.create_handles(None).unwrap();

    creator.dispose();
    creator.dispose();

    assert!(creator.is_disposed());
    assert!(handles.iter().all(|h| h.is_disposed()));
    assert!(matches!(
        creator.create_handles(None),
        Err(FanrunError::Disposed(_))
    ));
    assert!(matches!(creator.try_clone(), Err(FanrunError::Disposed(_))));
}

#[test]
fn handle_start_goes_through_launcher() {
    let fake = FakeLauncher::new();
    let creator =
        ProcessCreator::new("tool", args(&["x", "y"]), true, Arc::new(fake.clone())).unwrap();

    let handles = creator.create_handles(None).unwrap();
    let launched = handles[1].start().unwrap();
    assert_eq!(launched.index(), 1);

    let launches = fake.launches();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].arguments, "y");
    assert!(launches[0].show_window);
    assert!(!launches[0].redirected);
}
