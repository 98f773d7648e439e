//! Golden-file test harness.
//!
//! Runs an external executable once per numbered case, feeding it
//! `input.<n>` on stdin and comparing its stdout byte-for-byte with
//! `output.<n>`. Cases are discovered sequentially from 1 and the run stops at
//! the first missing pair.
//!
//! - **[`core`]**: case numbering, fixture naming, and verdicts. No I/O.
//! - **[`io`]**: configuration, fixture reads, and subject processes.
//!
//! [`suite`] ties them together into the case loop.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod suite;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
