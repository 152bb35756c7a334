use std::process::{Command, Stdio};

use log::debug;
use thiserror::Error;


#[derive(Error, Debug)]
pub enum ProcessError {
  #[error("Failed to spawn '{0}': {1}")]
  Spawn(String, std::io::Error),
}

/// Outcome of a process that was started and ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutput {
  Success {
    stdout: Vec<u8>,
  },
  /// `code` is `None` when the process was terminated by a signal.
  Failed {
    code: Option<i32>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
  },
}

/// Runs an external scheduler tool and captures its output.
pub trait ProcessInvoker {
  fn invoke(&self, program: &str, args: &[&str]) -> Result<ProcessOutput, ProcessError>;
}

/// Blocking invoker backed by `std::process::Command`. The child inherits the
/// caller's working directory.
#[derive(Debug, Default)]
pub struct SystemInvoker;

impl ProcessInvoker for SystemInvoker {
  fn invoke(&self, program: &str, args: &[&str]) -> Result<ProcessOutput, ProcessError> {
    debug!("Running `{} {}`", program, args.join(" "));
    let output = Command::new(program)
      .args(args)
      .stdin(Stdio::null())
      .output()
      .map_err(|e| ProcessError::Spawn(program.to_string(), e))?;

    if output.status.success() {
      Ok(ProcessOutput::Success {
        stdout: output.stdout,
      })
    } else {
      debug!("`{}` exited with {:?}", program, output.status.code());
      Ok(ProcessOutput::Failed {
        code: output.status.code(),
        stdout: output.stdout,
        stderr: output.stderr,
      })
    }
  }
}
