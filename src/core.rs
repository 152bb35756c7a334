pub mod condorman_config;
pub mod jobs;
mod parsers;
pub mod process;
pub mod status;


use std::path::{Path, PathBuf};

use crate::core::{
  condorman_config::CondormanConfig,
  process::{ProcessInvoker, SystemInvoker},
  status::{JobState, StatusResolver},
};

pub struct Condorman {
  config: CondormanConfig,
  root: PathBuf,
  invoker: Box<dyn ProcessInvoker>,
}

#[derive(thiserror::Error, Debug)]
pub enum CondormanError {
  #[error("Config Error: {0}")]
  ConfigError(#[from] condorman_config::CondormanConfigError),
  #[error("Job Error: {0}")]
  JobError(#[from] jobs::JobError),
  #[error("Status Error: {0}")]
  StatusError(#[from] status::StatusError),
  #[error("Could not read current directory: {0}")]
  CurrentDir(std::io::Error),
}

impl CondormanError {
  pub fn is_indeterminate(&self) -> bool {
    matches!(self, CondormanError::StatusError(e) if e.is_indeterminate())
  }
}

impl Condorman {
  /// Loads the configuration for the current working directory and talks to the
  /// real scheduler tools.
  pub fn new() -> Result<Self, CondormanError> {
    let _ = env_logger::try_init();

    let root = std::env::current_dir().map_err(CondormanError::CurrentDir)?;
    let config = condorman_config::load_condorman_config(&root)?;
    Ok(Condorman::with_invoker(config, root, Box::new(SystemInvoker)))
  }

  pub fn with_invoker(
    config: CondormanConfig,
    root: PathBuf,
    invoker: Box<dyn ProcessInvoker>,
  ) -> Self {
    Condorman {
      config,
      root,
      invoker,
    }
  }

  pub fn config(&self) -> &CondormanConfig {
    &self.config
  }

  pub fn submit(&self, script_path: &Path) -> Result<String, CondormanError> {
    Ok(jobs::submit_job(
      self.invoker.as_ref(),
      &self.config,
      &self.root,
      script_path,
    )?)
  }

  pub fn status(&self, job_id: &str, username: &str) -> Result<JobState, CondormanError> {
    let resolver = StatusResolver::new(self.invoker.as_ref(), &self.config, username);
    Ok(resolver.resolve(job_id)?)
  }
}
