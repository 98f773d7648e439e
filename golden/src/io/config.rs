//! Harness configuration stored in `golden.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "golden.toml";
pub const DEFAULT_EXECUTABLE: &str = "../bin/simpleDB";
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 64 * 1024 * 1024;

/// Harness configuration (TOML).
///
/// Missing fields take the defaults below, so an absent file and an empty file
/// behave the same.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory holding `input.<n>` / `output.<n>`.
    pub fixtures_dir: PathBuf,

    /// Subject executable. Relative paths are resolved against `fixtures_dir`.
    pub executable: PathBuf,

    /// Kill the subject after this many seconds. Unset means wait forever.
    pub timeout_secs: Option<u64>,

    /// Keep at most this many stdout bytes per case; the rest is drained and dropped.
    pub output_limit_bytes: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: PathBuf::from("."),
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            timeout_secs: None,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fixtures_dir.as_os_str().is_empty() {
            return Err(anyhow!("fixtures_dir must be non-empty"));
        }
        if self.executable.as_os_str().is_empty() {
            return Err(anyhow!("executable must be non-empty"));
        }
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("timeout_secs must be > 0 when set"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    /// Subject path as seen from the current working directory.
    pub fn executable_path(&self) -> PathBuf {
        if self.executable.is_absolute() {
            self.executable.clone()
        } else {
            self.fixtures_dir.join(&self.executable)
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub fixtures_dir: Option<PathBuf>,
    pub executable: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub output_limit_bytes: Option<usize>,
}

/// Apply overrides on top of `base` and validate the result.
pub fn apply_overrides(
    mut base: HarnessConfig,
    overrides: &ConfigOverrides,
) -> Result<HarnessConfig> {
    if let Some(dir) = &overrides.fixtures_dir {
        base.fixtures_dir = dir.clone();
    }
    if let Some(executable) = &overrides.executable {
        base.executable = executable.clone();
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
        base.timeout_secs = Some(timeout_secs);
    }
    if let Some(limit) = overrides.output_limit_bytes {
        base.output_limit_bytes = limit;
    }
    base.validate()?;
    Ok(base)
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `HarnessConfig::default()`.
pub fn load_config(path: &Path) -> Result<HarnessConfig> {
    if !path.exists() {
        let cfg = HarnessConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HarnessConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
