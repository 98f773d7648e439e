//! Pass/fail classification and the console report format.

/// Outcome of comparing a subject's output against its golden file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    NotOk,
}

impl Verdict {
    pub fn passed(self) -> bool {
        self == Verdict::Ok
    }
}

/// Compare captured stdout with the expected bytes.
///
/// Equality is exact: same length, same bytes, same order. A capture that lost
/// bytes to the output limit never passes, even if the retained prefix matches.
pub fn judge(actual: &[u8], truncated: usize, expected: &[u8]) -> Verdict {
    if truncated == 0 && actual == expected {
        Verdict::Ok
    } else {
        Verdict::NotOk
    }
}

/// One console line per executed case, without the trailing newline.
pub fn report_line(case: impl std::fmt::Display, verdict: Verdict) -> String {
    match verdict {
        Verdict::Ok => format!("Test case {case} is OK!"),
        Verdict::NotOk => format!("Test case {case} is not OK!"),
    }
}
