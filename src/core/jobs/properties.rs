use std::fs;
use std::path::{Path, PathBuf};

use hashlink::LinkedHashMap;
use log::debug;
use serde::Deserialize;

use crate::core::jobs::JobError;

/// Marker of the comment line the workflow engine embeds in every job script.
pub const PROPERTIES_MARKER: &str = "# properties = ";
/// Separates `key_value` pairs inside a wildcard tag.
pub const WILDCARD_DELIMITER: &str = ".";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct JobProperties {
  #[serde(default)]
  pub rule: String,
  /// Insertion order of the source document is kept.
  #[serde(default)]
  pub wildcards: LinkedHashMap<String, String>,
  #[serde(skip)]
  pub script_path: PathBuf,
}

impl JobProperties {
  pub fn wildcard_tag(&self) -> String {
    wildcard_tag(&self.wildcards, None)
  }
}

/// Reads the properties line out of a job script.
pub fn read_job_properties(script_path: &Path) -> Result<JobProperties, JobError> {
  if !script_path.is_file() {
    return Err(JobError::MissingScript(script_path.to_path_buf()));
  }
  let text = fs::read_to_string(script_path)?;
  let json = text
    .lines()
    .find_map(|line| line.trim_start().strip_prefix(PROPERTIES_MARKER))
    .ok_or_else(|| {
      JobError::InvalidJobProperties(format!(
        "no '{}' line in {:?}",
        PROPERTIES_MARKER.trim(),
        script_path
      ))
    })?;

  let mut properties: JobProperties = serde_json::from_str(json)
    .map_err(|e| JobError::InvalidJobProperties(format!("{:?}: {}", script_path, e)))?;
  if properties.rule.is_empty() {
    return Err(JobError::InvalidJobProperties(format!(
      "missing 'rule' in {:?}",
      script_path
    )));
  }
  properties.script_path = script_path.to_path_buf();

  debug!(
    "Read properties of rule '{}' with {} wildcard(s)",
    properties.rule,
    properties.wildcards.len()
  );
  Ok(properties)
}

/// Builds the deterministic `key_value.key_value` encoding of `wildcards`.
///
/// Keys are sorted alphabetically unless `key_order` is given, in which case the
/// listed keys come first in that order and any remaining keys follow sorted.
/// Path separators inside keys and values are percent-escaped so the tag stays a
/// single path component without merging distinct values. An empty mapping
/// yields an empty tag.
pub fn wildcard_tag(wildcards: &LinkedHashMap<String, String>, key_order: Option<&[&str]>) -> String {
  let mut keys: Vec<&str> = Vec::with_capacity(wildcards.len());
  if let Some(order) = key_order {
    for key in order {
      if wildcards.contains_key(*key) && !keys.contains(key) {
        keys.push(*key);
      }
    }
  }
  let mut rest: Vec<&str> = wildcards
    .keys()
    .map(String::as_str)
    .filter(|k| !keys.contains(k))
    .collect();
  rest.sort_unstable();
  keys.extend(rest);

  keys
    .iter()
    .map(|key| format!("{}_{}", path_safe(key), path_safe(&wildcards[*key])))
    .collect::<Vec<_>>()
    .join(WILDCARD_DELIMITER)
}

fn path_safe(s: &str) -> String {
  let mut escaped = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '%' => escaped.push_str("%25"),
      '/' => escaped.push_str("%2F"),
      '\\' => escaped.push_str("%5C"),
      _ => escaped.push(ch),
    }
  }
  escaped
}
