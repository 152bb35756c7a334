use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;


pub const LOCAL_CONFIG_FILE: &str = "condorman.conf";

#[derive(Error, Debug)]
pub enum CondormanConfigError {
  #[error("IO Error: {0}")]
  ConfyError(#[from] confy::ConfyError),
  #[error("No user name configured and none found in the environment")]
  UsernameNotFound,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CondormanConfig {
  /// Owner used to scope the live queue listing.
  pub username: Option<String>,
  pub submit_command: String,
  /// Options placed before the descriptor path, e.g. `-verbose` so the
  /// scheduler prints the `** Proc` confirmation line.
  pub submit_extra_args: Vec<String>,
  pub queue_command: String,
  pub queue_extra_args: Vec<String>,
  pub history_command: String,
  /// Total number of submission attempts, the first one included.
  pub submit_attempts: u32,
  /// Root of the descriptor and log tree, relative to the working directory.
  pub base_dir: String,
}

impl Default for CondormanConfig {
  fn default() -> Self {
    Self {
      username: None,
      submit_command: "condor_submit".into(),
      submit_extra_args: Vec::new(),
      queue_command: "condor_q".into(),
      queue_extra_args: Vec::new(),
      history_command: "condor_history".into(),
      submit_attempts: 10,
      base_dir: "condor".into(),
    }
  }
}

impl CondormanConfig {
  /// Returns the configured user, or the one given by `fallback` when unset.
  pub fn resolve_username(
    &self,
    fallback: impl FnOnce() -> Option<String>,
  ) -> Result<String, CondormanConfigError> {
    self
      .username
      .clone()
      .filter(|u| !u.is_empty())
      .or_else(fallback)
      .ok_or(CondormanConfigError::UsernameNotFound)
  }
}

pub fn get_condorman_config_global() -> Result<CondormanConfig, CondormanConfigError> {
  let config: CondormanConfig = confy::load("condorman", "config")?;
  Ok(config)
}

/// Loads `condorman.conf` from `dir`, or `None` if there is no such file.
pub fn get_condorman_config_local(
  dir: &Path,
) -> Result<Option<CondormanConfig>, CondormanConfigError> {
  let path = dir.join(LOCAL_CONFIG_FILE);
  if !path.is_file() {
    return Ok(None);
  }
  debug!("Loading local configuration from {:?}", path);
  let config: CondormanConfig = confy::load_path(path)?;
  Ok(Some(config))
}

pub fn set_condorman_config_local(
  dir: &Path,
  config: &CondormanConfig,
) -> Result<(), CondormanConfigError> {
  confy::store_path(dir.join(LOCAL_CONFIG_FILE), config)?;
  Ok(())
}

/// The local file in `dir` takes precedence over the global one.
pub fn load_condorman_config(dir: &Path) -> Result<CondormanConfig, CondormanConfigError> {
  match get_condorman_config_local(dir)? {
    Some(config) => Ok(config),
    None => get_condorman_config_global(),
  }
}
