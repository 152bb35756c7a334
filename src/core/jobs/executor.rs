use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::core::jobs::utils::{lossy_trimmed, make_script_executable};
use crate::core::jobs::{JobError, SubmissionDescriptor};
use crate::core::process::{ProcessInvoker, ProcessOutput};

/// Writes descriptors to disk and hands them to the submit command.
pub struct SubmissionExecutor<'a> {
  invoker: &'a dyn ProcessInvoker,
  submit_command: &'a str,
  extra_args: &'a [String],
  attempts: u32,
  root: PathBuf,
}

impl<'a> SubmissionExecutor<'a> {
  pub fn new(
    invoker: &'a dyn ProcessInvoker,
    submit_command: &'a str,
    attempts: u32,
    root: &Path,
  ) -> Self {
    SubmissionExecutor {
      invoker,
      submit_command,
      extra_args: &[],
      attempts: attempts.max(1),
      root: root.to_path_buf(),
    }
  }

  /// Options passed to the submit command ahead of the descriptor path.
  pub fn with_extra_args(mut self, extra_args: &'a [String]) -> Self {
    self.extra_args = extra_args;
    self
  }

  /// Copies the job script to the descriptor's executable path and writes the
  /// submit description next to it. Existing files for the same job are replaced.
  pub fn write_descriptor(
    &self,
    descriptor: &SubmissionDescriptor,
    script_path: &Path,
  ) -> Result<(), JobError> {
    if !script_path.is_file() {
      return Err(JobError::MissingScript(script_path.to_path_buf()));
    }

    let executable = self.root.join(&descriptor.executable);
    let same_file = match (fs::canonicalize(script_path), fs::canonicalize(&executable)) {
      (Ok(a), Ok(b)) => a == b,
      _ => false,
    };
    if !same_file {
      fs::copy(script_path, &executable)?;
    }
    make_script_executable(&executable)?;

    fs::write(self.root.join(&descriptor.path), descriptor.body())?;
    debug!("Wrote submit description {}", descriptor.path);
    Ok(())
  }

  /// Runs the submit command on the descriptor, retrying a failed run until the
  /// attempt bound is reached. No delay is inserted between attempts.
  pub fn submit(&self, descriptor: &SubmissionDescriptor) -> Result<Vec<u8>, JobError> {
    let mut last_code = None;
    let mut last_stderr = String::new();
    let mut args: Vec<&str> = self.extra_args.iter().map(String::as_str).collect();
    args.push(descriptor.path.as_str());

    for attempt in 1..=self.attempts {
      match self
        .invoker
        .invoke(self.submit_command, &args)?
      {
        ProcessOutput::Success { stdout } => {
          if attempt > 1 {
            info!("Submission of {} succeeded on attempt {}", descriptor.path, attempt);
          }
          return Ok(stdout);
        }
        ProcessOutput::Failed { code, stderr, .. } => {
          last_stderr = lossy_trimmed(&stderr);
          warn!(
            "Submission attempt {}/{} of {} failed (exit code {:?}): {}",
            attempt, self.attempts, descriptor.path, code, last_stderr
          );
          last_code = code;
        }
      }
    }

    Err(JobError::SubmissionFailed {
      attempts: self.attempts,
      code: last_code,
      stderr: last_stderr,
    })
  }
}
