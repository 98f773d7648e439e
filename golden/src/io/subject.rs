//! Subject abstraction: the external program under test.
//!
//! The [`Subject`] trait decouples the case loop from process spawning. Tests
//! use scripted subjects that answer from memory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::io::process::{ProcessLimits, run_with_input};

/// What a subject produced for one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectOutput {
    pub stdout: Vec<u8>,
    /// Bytes dropped beyond the output limit.
    pub stdout_truncated: usize,
    pub timed_out: bool,
    pub exit_code: Option<i32>,
}

pub trait Subject {
    /// Feed `input` to a fresh subject instance and collect its output.
    fn run(&self, input: Vec<u8>) -> Result<SubjectOutput>;
}

/// Subject backed by an executable file, spawned once per case.
#[derive(Debug, Clone)]
pub struct ProcessSubject {
    pub program: PathBuf,
    pub workdir: PathBuf,
    pub limits: ProcessLimits,
}

impl Subject for ProcessSubject {
    #[instrument(skip_all, fields(program = %self.program.display()))]
    fn run(&self, input: Vec<u8>) -> Result<SubjectOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.workdir);
        let output = run_with_input(cmd, input, self.limits)
            .with_context(|| format!("run subject {}", self.program.display()))?;
        Ok(SubjectOutput {
            stdout: output.stdout,
            stdout_truncated: output.stdout_truncated,
            timed_out: output.timed_out,
            exit_code: output.status.code(),
        })
    }
}

/// Resolve the subject executable, or `None` if no file exists at `path`.
///
/// The returned path is absolute so it stays valid once the child's working
/// directory is set to the fixture directory.
pub fn locate_subject(path: &Path) -> Result<Option<PathBuf>> {
    if !path.is_file() {
        debug!(path = %path.display(), "subject executable missing");
        return Ok(None);
    }
    let resolved =
        fs::canonicalize(path).with_context(|| format!("resolve {}", path.display()))?;
    Ok(Some(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixtureDir;

    #[test]
    fn missing_executable_is_none() {
        let fixtures = FixtureDir::new().expect("fixtures");
        let located = locate_subject(&fixtures.path().join("simpleDB")).expect("locate");
        assert_eq!(located, None);
    }

    #[test]
    fn directory_is_not_an_executable() {
        let fixtures = FixtureDir::new().expect("fixtures");
        let located = locate_subject(fixtures.path()).expect("locate");
        assert_eq!(located, None);
    }

    #[test]
    fn existing_file_resolves_to_absolute_path() {
        let fixtures = FixtureDir::new().expect("fixtures");
        let path = fixtures.path().join("simpleDB");
        fs::write(&path, "").expect("write");
        let located = locate_subject(&path).expect("locate").expect("present");
        assert!(located.is_absolute());
        assert!(located.ends_with("simpleDB"));
    }

    #[cfg(unix)]
    #[test]
    fn process_subject_runs_in_workdir() {
        let fixtures = FixtureDir::new().expect("fixtures");
        let script = fixtures
            .write_script("pwd.sh", "cat >/dev/null\npwd\n")
            .expect("script");
        let subject = ProcessSubject {
            program: script,
            workdir: fixtures.path().to_path_buf(),
            limits: ProcessLimits {
                timeout: None,
                output_limit_bytes: 4096,
            },
        };
        let output = subject.run(b"ignored".to_vec()).expect("run");
        let expected = fs::canonicalize(fixtures.path()).expect("canonical");
        let printed = String::from_utf8(output.stdout).expect("utf8");
        assert_eq!(
            fs::canonicalize(printed.trim_end()).expect("canonical pwd"),
            expected
        );
        assert_eq!(output.exit_code, Some(0));
    }
}
