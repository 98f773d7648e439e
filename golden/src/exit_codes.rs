//! Stable exit codes for the `golden` binary.
//!
//! Case results never affect the exit code; they are reported on stdout only.

/// Run completed, or the subject executable was missing.
pub const OK: i32 = 0;
/// Invalid configuration or the report could not be written.
pub const INVALID: i32 = 1;
