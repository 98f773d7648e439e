//! I/O helpers: configuration, fixtures, and subject processes.

pub mod config;
pub mod fixtures;
pub mod process;
pub mod subject;
