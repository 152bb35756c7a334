#[cfg(test)]
mod tests;

use log::{debug, info};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::core::{
  condorman_config::CondormanConfig,
  jobs::utils::lossy_trimmed,
  parsers,
  process::{ProcessError, ProcessInvoker, ProcessOutput},
};

/// State reported back to the workflow engine. Recomputed on every query.
#[derive(Debug, EnumString, Display, PartialEq, Eq, Clone, Copy)]
pub enum JobState {
  #[strum(serialize = "running")]
  Running,
  #[strum(serialize = "success")]
  Succeeded,
  #[strum(serialize = "failed")]
  Failed,
}

impl JobState {
  pub fn from_exit_status(exit_status: i32) -> Self {
    if exit_status == 0 {
      JobState::Succeeded
    } else {
      JobState::Failed
    }
  }
}

#[derive(Error, Debug)]
pub enum StatusError {
  #[error("Queue listing failed (exit code {code:?}): {stderr}")]
  QueueLookupFailed { code: Option<i32>, stderr: String },
  #[error("History lookup for job {job_id} failed (exit code {code:?}): {stderr}")]
  HistoryLookupFailed {
    job_id: String,
    code: Option<i32>,
    stderr: String,
  },
  #[error("No ExitStatus recorded for job {0}")]
  ExitStatusNotFound(String),
  #[error("Process Error: {0}")]
  ProcessError(#[from] ProcessError),
}

impl StatusError {
  /// True for outcomes caused by the job not having reached the history yet.
  /// The query should be repeated later instead of treating the job as failed.
  pub fn is_indeterminate(&self) -> bool {
    matches!(
      self,
      StatusError::HistoryLookupFailed { .. } | StatusError::ExitStatusNotFound(_)
    )
  }
}

/// Resolves job states from the live queue and the history, for one user.
pub struct StatusResolver<'a> {
  invoker: &'a dyn ProcessInvoker,
  config: &'a CondormanConfig,
  username: String,
}

impl<'a> StatusResolver<'a> {
  pub fn new(invoker: &'a dyn ProcessInvoker, config: &'a CondormanConfig, username: &str) -> Self {
    StatusResolver {
      invoker,
      config,
      username: username.to_string(),
    }
  }

  /// Whether `job_id` is listed in the user's active queue.
  pub fn is_in_queue(&self, job_id: &str) -> Result<bool, StatusError> {
    let mut args = vec!["-sub", self.username.as_str()];
    args.extend(self.config.queue_extra_args.iter().map(String::as_str));

    match self.invoker.invoke(&self.config.queue_command, &args)? {
      ProcessOutput::Success { stdout } => {
        let active = parsers::parse_queue_listing(&stdout);
        debug!("{} active job(s) for user {}", active.len(), self.username);
        Ok(active.iter().any(|id| id == job_id))
      }
      ProcessOutput::Failed { code, stderr, .. } => Err(StatusError::QueueLookupFailed {
        code,
        stderr: lossy_trimmed(&stderr),
      }),
    }
  }

  /// Exit status of a job that has left the queue.
  pub fn exit_status(&self, job_id: &str) -> Result<i32, StatusError> {
    match self
      .invoker
      .invoke(&self.config.history_command, &["-l", job_id])?
    {
      ProcessOutput::Success { stdout } => parsers::parse_exit_status(&stdout)
        .ok_or_else(|| StatusError::ExitStatusNotFound(job_id.to_string())),
      ProcessOutput::Failed { code, stderr, .. } => Err(StatusError::HistoryLookupFailed {
        job_id: job_id.to_string(),
        code,
        stderr: lossy_trimmed(&stderr),
      }),
    }
  }

  /// A queued job is running and the history is not consulted. Otherwise the
  /// recorded exit status decides between success and failure.
  pub fn resolve(&self, job_id: &str) -> Result<JobState, StatusError> {
    let state = if self.is_in_queue(job_id)? {
      JobState::Running
    } else {
      JobState::from_exit_status(self.exit_status(job_id)?)
    };
    info!("Job {} is {}", job_id, state);
    Ok(state)
  }
}
