//! Golden-file test harness.
//!
//! Feeds `input.<n>` to the subject executable and compares its stdout with
//! `output.<n>`, for n = 1, 2, ... until a pair is missing.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use golden::exit_codes;
use golden::io::config::{ConfigOverrides, DEFAULT_CONFIG_FILE, apply_overrides, load_config};
use golden::logging;
use golden::suite::{list_cases, run_suite};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "golden",
    version,
    about = "Run numbered golden-file cases against an executable"
)]
struct Cli {
    /// Config file (default: `golden.toml` if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing `input.<n>` and `output.<n>`.
    #[arg(long, global = true)]
    fixtures_dir: Option<PathBuf>,

    /// Subject executable, relative to the fixtures directory unless absolute.
    #[arg(long, global = true)]
    exe: Option<PathBuf>,

    /// Kill a subject that runs longer than this many seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Maximum stdout bytes captured per case.
    #[arg(long, global = true)]
    output_limit_bytes: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the case numbers a run would attempt, without running the subject.
    List,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            fixtures_dir: self.fixtures_dir.clone(),
            executable: self.exe.clone(),
            timeout_secs: self.timeout_secs,
            output_limit_bytes: self.output_limit_bytes,
        }
    }
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) if !path.exists() => bail!("config {} not found", path.display()),
        Some(path) => path.clone(),
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };
    let config = apply_overrides(load_config(&config_path)?, &cli.overrides())?;
    debug!(?config, "configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        None => {
            let outcome = run_suite(&config, &mut out)?;
            debug!(?outcome, "run finished");
        }
        Some(Command::List) => list_cases(&config.fixtures_dir, &mut out)?,
    }
    Ok(())
}
