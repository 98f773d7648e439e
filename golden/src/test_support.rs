//! Test-only helpers: scratch fixture directories and scripted subjects.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::case::{CaseNumber, expected_file_name, input_file_name};
use crate::io::config::HarnessConfig;
use crate::io::subject::{Subject, SubjectOutput};

/// Temporary fixture directory removed on drop.
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create fixture dir")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write both `input.<n>` and `output.<n>`.
    pub fn write_case(&self, n: u32, input: &[u8], expected: &[u8]) -> Result<()> {
        self.write_input(n, input)?;
        self.write_expected(n, expected)
    }

    pub fn write_input(&self, n: u32, input: &[u8]) -> Result<()> {
        let name = input_file_name(case_number(n)?);
        self.write_file(&name, input)
    }

    pub fn write_expected(&self, n: u32, expected: &[u8]) -> Result<()> {
        let name = expected_file_name(case_number(n)?);
        self.write_file(&name, expected)
    }

    /// Write an executable `/bin/sh` script and return its path.
    #[cfg(unix)]
    pub fn write_script(&self, name: &str, body: &str) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}"))
            .with_context(|| format!("write {}", path.display()))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("chmod {}", path.display()))?;
        Ok(path)
    }

    /// Config pointing at this directory and the given subject.
    pub fn config_for(&self, executable: impl Into<PathBuf>) -> HarnessConfig {
        HarnessConfig {
            fixtures_dir: self.path().to_path_buf(),
            executable: executable.into(),
            ..HarnessConfig::default()
        }
    }

    fn write_file(&self, name: &str, contents: &[u8]) -> Result<()> {
        let path = self.path().join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }
}

fn case_number(n: u32) -> Result<CaseNumber> {
    CaseNumber::new(n).context("case numbers start at 1")
}

type Respond = Box<dyn Fn(&[u8]) -> Result<SubjectOutput>>;

/// Subject that answers from a closure and records every input it receives.
pub struct ScriptedSubject {
    respond: Respond,
    inputs: RefCell<Vec<Vec<u8>>>,
}

impl ScriptedSubject {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&[u8]) -> Result<SubjectOutput> + 'static,
    {
        Self {
            respond: Box::new(respond),
            inputs: RefCell::new(Vec::new()),
        }
    }

    /// Writes its input back unchanged.
    pub fn echo() -> Self {
        Self::new(|input| Ok(output_of(input)))
    }

    pub fn inputs(&self) -> Vec<Vec<u8>> {
        self.inputs.borrow().clone()
    }
}

impl Subject for ScriptedSubject {
    fn run(&self, input: Vec<u8>) -> Result<SubjectOutput> {
        let output = (self.respond)(&input);
        self.inputs.borrow_mut().push(input);
        output
    }
}

/// Clean exit with the given stdout.
pub fn output_of(stdout: &[u8]) -> SubjectOutput {
    SubjectOutput {
        stdout: stdout.to_vec(),
        stdout_truncated: 0,
        timed_out: false,
        exit_code: Some(0),
    }
}

/// Split captured console output into lines.
pub fn report_of(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out)
        .lines()
        .map(str::to_string)
        .collect()
}
