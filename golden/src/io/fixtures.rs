//! Fixture discovery and loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::case::{CaseNumber, CasePaths};

/// Paths for case `number` if both of its fixture files exist.
///
/// A missing file is not an error; it ends discovery.
pub fn find_case(fixtures_dir: &Path, number: CaseNumber) -> Option<CasePaths> {
    let paths = CasePaths::new(fixtures_dir, number);
    let input_exists = paths.input.exists();
    let expected_exists = paths.expected.exists();
    if input_exists && expected_exists {
        Some(paths)
    } else {
        debug!(
            case = number.get(),
            input_exists, expected_exists, "fixture pair incomplete"
        );
        None
    }
}

/// Contiguous cases starting at 1, stopping at the first incomplete pair.
///
/// Cases after a gap are never reached, even if their files exist.
pub fn contiguous_cases(fixtures_dir: &Path) -> impl Iterator<Item = CasePaths> + '_ {
    std::iter::successors(find_case(fixtures_dir, CaseNumber::first()), move |prev| {
        prev.number
            .next()
            .and_then(|number| find_case(fixtures_dir, number))
    })
}

/// Read a fixture file verbatim.
pub fn read_fixture(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read fixture {}", path.display()))
}
