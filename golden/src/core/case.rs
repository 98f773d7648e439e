//! Case numbering and fixture naming.
//!
//! A case `n` owns two fixture files in the fixture directory: `input.<n>`
//! (bytes fed to the subject) and `output.<n>` (bytes the subject must emit).
//! Suffixes are plain decimal without zero padding.

use std::fmt;
use std::path::{Path, PathBuf};

/// 1-based case number. Cases are visited in strictly increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseNumber(u32);

impl CaseNumber {
    /// The first case of every run.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns `None` for zero; case numbers start at 1.
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// The case after this one, or `None` once `u32` is exhausted.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixture file locations for a single case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePaths {
    pub number: CaseNumber,
    pub input: PathBuf,
    pub expected: PathBuf,
}

impl CasePaths {
    pub fn new(fixtures_dir: &Path, number: CaseNumber) -> Self {
        Self {
            number,
            input: fixtures_dir.join(input_file_name(number)),
            expected: fixtures_dir.join(expected_file_name(number)),
        }
    }
}

pub fn input_file_name(number: CaseNumber) -> String {
    format!("input.{number}")
}

pub fn expected_file_name(number: CaseNumber) -> String {
    format!("output.{number}")
}
