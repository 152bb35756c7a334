mod descriptor;
mod executor;
mod properties;
pub(crate) mod utils;
use std::path::{Path, PathBuf};


use log::info;
use thiserror::Error;

use crate::core::{
  condorman_config::CondormanConfig,
  parsers::{self, ParserError},
  process::{ProcessError, ProcessInvoker},
};

pub use descriptor::{DescriptorBuilder, SubmissionDescriptor};
pub use executor::SubmissionExecutor;
pub use properties::{JobProperties, read_job_properties};

#[derive(Error, Debug)]
pub enum JobError {
  #[error("Invalid job properties: {0}")]
  InvalidJobProperties(String),
  #[error("Invalid base directory '{0}': must be a non-empty relative path")]
  InvalidBaseDir(String),
  #[error("Job script not found: {0:?}")]
  MissingScript(PathBuf),
  #[error("Submission failed after {attempts} attempts (last exit code: {code:?}): {stderr}")]
  SubmissionFailed {
    attempts: u32,
    code: Option<i32>,
    stderr: String,
  },
  #[error("Parser Error: {0}")]
  ParserError(#[from] ParserError),
  #[error("Process Error: {0}")]
  ProcessError(#[from] ProcessError),
  #[error("IO Error: {0}")]
  IoError(#[from] std::io::Error),
}

/// Submits the job script at `script_path` and returns the scheduler's job
/// identifier. `root` must be the working directory the scheduler tools run in,
/// since every path in the descriptor is relative to it.
pub fn submit_job(
  invoker: &dyn ProcessInvoker,
  config: &CondormanConfig,
  root: &Path,
  script_path: &Path,
) -> Result<String, JobError> {
  let properties = read_job_properties(script_path)?;
  let descriptor = DescriptorBuilder::new(root, &config.base_dir).build(&properties)?;

  let executor = SubmissionExecutor::new(
    invoker,
    &config.submit_command,
    config.submit_attempts,
    root,
  )
  .with_extra_args(&config.submit_extra_args);
  executor.write_descriptor(&descriptor, &properties.script_path)?;
  let stdout = executor.submit(&descriptor)?;

  let job_id = parsers::parse_submission_output(&stdout)?;
  info!(
    "Submitted rule '{}' as job {} ({})",
    properties.rule, job_id, descriptor.path
  );
  Ok(job_id)
}
