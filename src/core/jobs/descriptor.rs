use std::fs::create_dir_all;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::core::jobs::{JobError, JobProperties};

/// Subdirectories of the base directory, one per kind of per-job file.
pub const LAYOUT_DIRS: [&str; 4] = ["sub", "log", "out", "err"];

/// A submit description file and the relative paths it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDescriptor {
  /// Where the description itself is written, e.g. `condor/sub/rule.tag.sub`.
  pub path: String,
  pub executable: String,
  pub log: String,
  pub output: String,
  pub error: String,
}

impl SubmissionDescriptor {
  pub fn body(&self) -> String {
    format!(
      "executable = {}\nlog = {}\noutput = {}\nerror = {}\nqueue\n",
      self.executable, self.log, self.output, self.error
    )
  }
}

pub struct DescriptorBuilder {
  root: PathBuf,
  base_dir: String,
}

impl DescriptorBuilder {
  pub fn new(root: &Path, base_dir: &str) -> Self {
    let base_dir = base_dir.replace('\\', "/").trim_end_matches('/').to_string();
    DescriptorBuilder {
      root: root.to_path_buf(),
      base_dir,
    }
  }

  /// Creates the four layout directories under the root. Existing directories
  /// are left untouched.
  pub fn ensure_layout(&self) -> Result<(), JobError> {
    self.check_base_dir()?;
    for kind in LAYOUT_DIRS {
      let dir = self.root.join(&self.base_dir).join(kind);
      create_dir_all(&dir)?;
    }
    debug!("Ensured layout under {:?}", self.root.join(&self.base_dir));
    Ok(())
  }

  pub fn build(&self, properties: &JobProperties) -> Result<SubmissionDescriptor, JobError> {
    if properties.rule.is_empty() {
      return Err(JobError::InvalidJobProperties("empty rule".to_string()));
    }
    if properties.script_path.as_os_str().is_empty() {
      return Err(JobError::InvalidJobProperties("empty script path".to_string()));
    }
    if !properties.script_path.is_file() {
      return Err(JobError::MissingScript(properties.script_path.clone()));
    }

    self.ensure_layout()?;

    let tag = properties.wildcard_tag();
    let stem = if tag.is_empty() {
      properties.rule.clone()
    } else {
      format!("{}.{}", properties.rule, tag)
    };

    Ok(SubmissionDescriptor {
      path: self.job_file("sub", &stem, "sub"),
      executable: self.job_file("sub", &stem, "sh"),
      log: self.job_file("log", &stem, "log"),
      output: self.job_file("out", &stem, "out"),
      error: self.job_file("err", &stem, "err"),
    })
  }

  /// The base directory must stay below the root: `condor_submit` resolves
  /// every descriptor path against the working directory.
  fn check_base_dir(&self) -> Result<(), JobError> {
    let relative = Path::new(&self.base_dir);
    let escapes = relative
      .components()
      .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if self.base_dir.is_empty() || self.base_dir.starts_with('/') || escapes {
      return Err(JobError::InvalidBaseDir(self.base_dir.clone()));
    }
    Ok(())
  }

  fn job_file(&self, kind: &str, stem: &str, ext: &str) -> String {
    format!("{}/{}/{}.{}", self.base_dir, kind, stem, ext)
  }
}
