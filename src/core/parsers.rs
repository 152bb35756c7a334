
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Prefix of the per-process confirmation line in `condor_submit` output,
/// e.g. `** Proc 1234.0:`.
pub const SUBMISSION_MARKER: &str = "** Proc";
/// Column header that precedes the job rows in a `condor_q` listing.
pub const QUEUE_HEADER_MARKER: &str = "SUBMITTED";
/// ClassAd attribute holding the exit code in `condor_history -l` output.
pub const EXIT_STATUS_FIELD: &str = "ExitStatus";

static EXIT_STATUS_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(&format!(r"^{}\s*=\s*(-?\d+)\s*$", EXIT_STATUS_FIELD)).unwrap()
});

#[derive(Error, Debug)]
pub enum ParserError {
  #[error("No '** Proc' line found in submission output")]
  SubmissionIdNotFound,
}

/// Extracts the job identifier from the first `** Proc <id>:` line.
pub fn parse_submission_output(stdout: &[u8]) -> Result<String, ParserError> {
  let text = String::from_utf8_lossy(stdout);
  let job_id = text
    .lines()
    .find(|line| line.starts_with(SUBMISSION_MARKER))
    .and_then(|line| line.split_whitespace().last())
    .map(|token| token.trim_end_matches(':'))
    .filter(|token| !token.is_empty())
    .ok_or(ParserError::SubmissionIdNotFound)?;

  debug!("Parsed job identifier '{}'", job_id);
  Ok(job_id.to_string())
}

/// Returns the first column of every row in the block that follows the queue
/// header, up to the first blank line. A listing without the header yields no rows.
pub fn parse_queue_listing(stdout: &[u8]) -> Vec<String> {
  let text = String::from_utf8_lossy(stdout);
  text
    .lines()
    .skip_while(|line| !line.contains(QUEUE_HEADER_MARKER))
    .skip(1)
    .take_while(|line| !line.trim().is_empty())
    .filter_map(|line| line.split_whitespace().next())
    .map(str::to_string)
    .collect()
}

/// Scans long-form history output for `ExitStatus = <n>`. When several records
/// are present the last one wins.
pub fn parse_exit_status(stdout: &[u8]) -> Option<i32> {
  let text = String::from_utf8_lossy(stdout);
  text
    .lines()
    .filter_map(|line| EXIT_STATUS_RE.captures(line.trim_end()))
    .filter_map(|caps| caps[1].parse::<i32>().ok())
    .last()
}
