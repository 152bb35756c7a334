use std::str::FromStr;

use crate::core::condorman_config::CondormanConfig;
use crate::core::status::{JobState, StatusError, StatusResolver};
use crate::core::tests::{FakeInvoker, QUEUE_EMPTY, QUEUE_WITH_1234, failure, success};

const HISTORY_SUCCESS: &str = "ClusterId = 1234\nExitCode = 0\nExitStatus = 0\nJobStatus = 4\n";
const HISTORY_FAILED: &str = "ClusterId = 1234\nExitCode = 1\nExitStatus = 1\nJobStatus = 4\n";

// ============================================================================
// Tests for JobState
// ============================================================================

#[test]
fn test_job_state_labels() {
  assert_eq!(JobState::Running.to_string(), "running");
  assert_eq!(JobState::Succeeded.to_string(), "success");
  assert_eq!(JobState::Failed.to_string(), "failed");
  assert_eq!(JobState::from_str("success").unwrap(), JobState::Succeeded);
}

#[test]
fn test_job_state_from_exit_status() {
  assert_eq!(JobState::from_exit_status(0), JobState::Succeeded);
  assert_eq!(JobState::from_exit_status(1), JobState::Failed);
  assert_eq!(JobState::from_exit_status(-1), JobState::Failed);
  assert_eq!(JobState::from_exit_status(137), JobState::Failed);
}

// ============================================================================
// Tests for StatusResolver::is_in_queue
// ============================================================================

#[test]
fn test_is_in_queue_present() {
  let fake = FakeInvoker::new();
  fake.always("condor_q", success(QUEUE_WITH_1234));
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  assert!(resolver.is_in_queue("1234.0").unwrap());
  assert!(!resolver.is_in_queue("9999.0").unwrap());
  assert!(!resolver.is_in_queue("1234").unwrap());
}

#[test]
fn test_is_in_queue_empty_block() {
  let fake = FakeInvoker::new();
  fake.always("condor_q", success(QUEUE_EMPTY));
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  assert!(!resolver.is_in_queue("1234.0").unwrap());
}

#[test]
fn test_is_in_queue_scoped_to_user() {
  let fake = FakeInvoker::new();
  fake.always("condor_q", success(QUEUE_EMPTY));
  let config = CondormanConfig {
    queue_extra_args: vec!["-nobatch".to_string()],
    ..Default::default()
  };
  let resolver = StatusResolver::new(&fake, &config, "bob");
  resolver.is_in_queue("1234.0").unwrap();

  assert_eq!(
    fake.calls(),
    vec![(
      "condor_q".to_string(),
      vec!["-sub".to_string(), "bob".to_string(), "-nobatch".to_string()]
    )]
  );
}

#[test]
fn test_is_in_queue_command_failure() {
  let fake = FakeInvoker::new();
  fake.always("condor_q", failure(1, "Failed to fetch ads from schedd"));
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  let result = resolver.is_in_queue("1234.0");
  assert!(matches!(
    result,
    Err(StatusError::QueueLookupFailed { code: Some(1), .. })
  ));
}

// ============================================================================
// Tests for StatusResolver::exit_status
// ============================================================================

#[test]
fn test_exit_status_invocation() {
  let fake = FakeInvoker::new();
  fake.push("condor_history", success(HISTORY_FAILED));
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  assert_eq!(resolver.exit_status("1234.0").unwrap(), 1);
  assert_eq!(
    fake.calls(),
    vec![(
      "condor_history".to_string(),
      vec!["-l".to_string(), "1234.0".to_string()]
    )]
  );
}

#[test]
fn test_exit_status_lookup_failed() {
  let fake = FakeInvoker::new();
  fake.push("condor_history", failure(1, "history file missing"));
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  let err = resolver.exit_status("1234.0").unwrap_err();
  assert!(matches!(err, StatusError::HistoryLookupFailed { .. }));
  assert!(err.is_indeterminate());
}

#[test]
fn test_exit_status_not_found() {
  let fake = FakeInvoker::new();
  fake.push("condor_history", success("ClusterId = 1234\n"));
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  let err = resolver.exit_status("1234.0").unwrap_err();
  assert!(matches!(err, StatusError::ExitStatusNotFound(ref id) if id == "1234.0"));
  assert!(err.is_indeterminate());
}

// ============================================================================
// Tests for StatusResolver::resolve
// ============================================================================

#[test]
fn test_resolve_running_skips_history() {
  let fake = FakeInvoker::new();
  fake
    .push("condor_q", success(QUEUE_WITH_1234))
    .forbid("condor_history");
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  assert_eq!(resolver.resolve("1234.0").unwrap(), JobState::Running);
  assert_eq!(fake.calls_to("condor_history"), 0);
}

#[test]
fn test_resolve_succeeded() {
  let fake = FakeInvoker::new();
  fake
    .push("condor_q", success(QUEUE_EMPTY))
    .push("condor_history", success(HISTORY_SUCCESS));
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  assert_eq!(resolver.resolve("1234.0").unwrap(), JobState::Succeeded);
}

#[test]
fn test_resolve_failed() {
  let fake = FakeInvoker::new();
  fake
    .push("condor_q", success(QUEUE_EMPTY))
    .push("condor_history", success(HISTORY_FAILED));
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  assert_eq!(resolver.resolve("1234.0").unwrap(), JobState::Failed);
}

#[test]
fn test_resolve_other_job_running() {
  let fake = FakeInvoker::new();
  fake
    .push("condor_q", success(QUEUE_WITH_1234))
    .push("condor_history", success(HISTORY_SUCCESS));
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  assert_eq!(resolver.resolve("1200.0").unwrap(), JobState::Succeeded);
  assert_eq!(fake.calls_to("condor_history"), 1);
}

#[test]
fn test_resolve_queue_failure_skips_history() {
  let fake = FakeInvoker::new();
  fake
    .push("condor_q", failure(1, "schedd unavailable"))
    .forbid("condor_history");
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  let err = resolver.resolve("1234.0").unwrap_err();
  assert!(!err.is_indeterminate());
}

#[test]
fn test_resolve_not_yet_recorded() {
  let fake = FakeInvoker::new();
  fake
    .push("condor_q", success(QUEUE_EMPTY))
    .push("condor_history", success(""));
  let config = CondormanConfig::default();
  let resolver = StatusResolver::new(&fake, &config, "alice");

  let err = resolver.resolve("1234.0").unwrap_err();
  assert!(matches!(err, StatusError::ExitStatusNotFound(_)));
}
