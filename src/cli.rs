use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::warn;

use crate::core::{
  Condorman, CondormanError,
  condorman_config::{self, CondormanConfig},
};


/// EX_TEMPFAIL from sysexits.h: the state could not be determined yet.
const EXIT_INDETERMINATE: u8 = 75;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Write a default condorman.conf into the current directory
  Init {},
  /// Submit a job script and print the scheduler job identifier
  Submit { jobscript: PathBuf },
  /// Print `running`, `success` or `failed` for a job identifier
  Status {
    jobid: String,
    /// Owner of the job in the scheduler queue [default: current user]
    #[arg(long)]
    user: Option<String>,
  },
}

pub fn main() -> ExitCode {
  let cli = Cli::parse();

  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("Error: {:#}", e);
      ExitCode::from(exit_status_for(&e))
    }
  }
}

fn exit_status_for(error: &anyhow::Error) -> u8 {
  let indeterminate = error
    .downcast_ref::<CondormanError>()
    .is_some_and(CondormanError::is_indeterminate);
  if indeterminate {
    warn!("Job state is indeterminate, query again later");
    EXIT_INDETERMINATE
  } else {
    1
  }
}

fn run(cli: &Cli) -> Result<()> {
  match &cli.command {
    Commands::Init {} => {
      let dir = env::current_dir().context("Failed to get current directory")?;
      init_local_config(&dir)?;
      println!("Wrote {:?}", dir.join(condorman_config::LOCAL_CONFIG_FILE));
    }
    Commands::Submit { jobscript } => {
      let condorman = Condorman::new().context("Failed to initialize condorman")?;
      let job_id = condorman
        .submit(jobscript)
        .with_context(|| format!("Failed to submit {:?}", jobscript))?;
      println!("{}", job_id);
    }
    Commands::Status { jobid, user } => {
      let condorman = Condorman::new().context("Failed to initialize condorman")?;
      let username = match user {
        Some(user) => user.clone(),
        None => condorman
          .config()
          .resolve_username(current_user)
          .context("Failed to determine the queue owner")?,
      };
      let state = condorman
        .status(jobid, &username)
        .with_context(|| format!("Failed to query the state of job {}", jobid))?;
      println!("{}", state);
    }
  }
  Ok(())
}

/// Keeps an existing local configuration untouched.
fn init_local_config(dir: &Path) -> Result<()> {
  if condorman_config::get_condorman_config_local(dir)?.is_some() {
    return Ok(());
  }
  condorman_config::set_condorman_config_local(dir, &CondormanConfig::default())
    .context("Failed to write local configuration")?;
  Ok(())
}

fn current_user() -> Option<String> {
  env::var("USER")
    .or_else(|_| env::var("LOGNAME"))
    .ok()
    .filter(|u| !u.is_empty())
}
