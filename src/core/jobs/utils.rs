use std::path::Path;

use crate::core::jobs::JobError;

/// Make a script file executable (Unix only)
#[cfg(unix)]
pub fn make_script_executable(script_path: &Path) -> Result<(), JobError> {
  use std::os::unix::fs::PermissionsExt;
  let mut perms = std::fs::metadata(script_path)?.permissions();
  perms.set_mode(perms.mode() | 0o755);
  std::fs::set_permissions(script_path, perms)?;
  Ok(())
}

#[cfg(not(unix))]
pub fn make_script_executable(_script_path: &Path) -> Result<(), JobError> {
  Ok(())
}

pub fn lossy_trimmed(bytes: &[u8]) -> String {
  String::from_utf8_lossy(bytes).trim().to_string()
}
