//! Pure, deterministic logic for golden-file runs.
//!
//! Nothing in this module touches the filesystem or spawns processes.

pub mod case;
pub mod verdict;
