//! The golden-file case loop.
//!
//! Cases run strictly one after another: case `n` is fully executed and
//! reported before the fixture pair for `n + 1` is looked up. The loop ends at
//! the first number whose `input.<n>` or `output.<n>` is missing.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument};

use crate::core::case::CasePaths;
use crate::core::verdict::{Verdict, judge, report_line};
use crate::io::config::HarnessConfig;
use crate::io::fixtures::{contiguous_cases, read_fixture};
use crate::io::process::ProcessLimits;
use crate::io::subject::{ProcessSubject, Subject, locate_subject};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteOutcome {
    /// The subject executable was absent; no case was attempted.
    MissingExecutable { path: PathBuf },
    /// The loop reached the first incomplete fixture pair.
    Finished { cases_run: u32 },
}

/// Locate the subject, then run every contiguous case, writing one report
/// line per case to `out`.
#[instrument(skip_all, fields(fixtures_dir = %config.fixtures_dir.display()))]
pub fn run_suite<W: Write>(config: &HarnessConfig, out: &mut W) -> Result<SuiteOutcome> {
    let executable = config.executable_path();
    let Some(program) = locate_subject(&executable)? else {
        writeln!(
            out,
            "no executable found at {}, please compile first...",
            executable.display()
        )
        .context("write diagnostic")?;
        out.flush().context("flush diagnostic")?;
        return Ok(SuiteOutcome::MissingExecutable { path: executable });
    };

    info!(program = %program.display(), "subject located");
    let subject = ProcessSubject {
        program,
        workdir: config.fixtures_dir.clone(),
        limits: ProcessLimits {
            timeout: config.timeout(),
            output_limit_bytes: config.output_limit_bytes,
        },
    };
    let cases_run = run_cases(&config.fixtures_dir, &subject, out)?;
    Ok(SuiteOutcome::Finished { cases_run })
}

/// Run contiguous cases from `fixtures_dir` against `subject`.
///
/// Returns the number of cases attempted. Only failing to write the report is
/// fatal; a case that cannot be executed is reported as not OK.
pub fn run_cases<S: Subject, W: Write>(
    fixtures_dir: &Path,
    subject: &S,
    out: &mut W,
) -> Result<u32> {
    let mut cases_run = 0u32;
    for case in contiguous_cases(fixtures_dir) {
        let verdict = run_case(&case, subject);
        writeln!(out, "{}", report_line(case.number, verdict)).context("write report line")?;
        out.flush().context("flush report line")?;
        cases_run += 1;
    }
    debug!(cases_run, "no further fixture pair");
    Ok(cases_run)
}

/// Print the numbers of the cases a run would attempt.
pub fn list_cases<W: Write>(fixtures_dir: &Path, out: &mut W) -> Result<()> {
    for case in contiguous_cases(fixtures_dir) {
        writeln!(out, "{}", case.number).context("write case number")?;
    }
    out.flush().context("flush case list")?;
    Ok(())
}

fn run_case<S: Subject>(case: &CasePaths, subject: &S) -> Verdict {
    match try_run_case(case, subject) {
        Ok(verdict) => verdict,
        Err(err) => {
            error!(
                case = case.number.get(),
                err = %format!("{err:#}"),
                "case could not be executed"
            );
            Verdict::NotOk
        }
    }
}

#[instrument(skip_all, fields(case = case.number.get()))]
fn try_run_case<S: Subject>(case: &CasePaths, subject: &S) -> Result<Verdict> {
    let input = read_fixture(&case.input)?;
    let output = subject.run(input)?;
    let expected = read_fixture(&case.expected)?;
    let verdict = if output.timed_out {
        Verdict::NotOk
    } else {
        judge(&output.stdout, output.stdout_truncated, &expected)
    };
    debug!(
        actual_len = output.stdout.len(),
        expected_len = expected.len(),
        timed_out = output.timed_out,
        exit_code = ?output.exit_code,
        passed = verdict.passed(),
        "case judged"
    );
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::subject::SubjectOutput;
    use crate::test_support::{FixtureDir, ScriptedSubject, output_of, report_of};
    use anyhow::bail;

    #[test]
    fn runs_every_contiguous_case_in_order() {
        let fixtures = FixtureDir::new().expect("fixtures");
        for n in 1..=3 {
            let body = format!("case {n}\n");
            fixtures
                .write_case(n, body.as_bytes(), body.as_bytes())
                .expect("case");
        }
        let subject = ScriptedSubject::echo();
        let mut out = Vec::new();

        let cases_run = run_cases(fixtures.path(), &subject, &mut out).expect("run");

        assert_eq!(cases_run, 3);
        assert_eq!(
            report_of(&out),
            vec![
                "Test case 1 is OK!",
                "Test case 2 is OK!",
                "Test case 3 is OK!"
            ]
        );
        assert_eq!(
            subject.inputs(),
            vec![b"case 1\n".to_vec(), b"case 2\n".to_vec(), b"case 3\n".to_vec()]
        );
    }

    #[test]
    fn gap_stops_the_run() {
        let fixtures = FixtureDir::new().expect("fixtures");
        fixtures.write_case(1, b"a", b"a").expect("case 1");
        fixtures.write_case(2, b"b", b"b").expect("case 2");
        fixtures.write_case(4, b"d", b"d").expect("case 4");
        let subject = ScriptedSubject::echo();
        let mut out = Vec::new();

        let cases_run = run_cases(fixtures.path(), &subject, &mut out).expect("run");

        assert_eq!(cases_run, 2);
        assert_eq!(subject.inputs().len(), 2);
    }

    #[test]
    fn mismatch_is_reported_and_run_continues() {
        let fixtures = FixtureDir::new().expect("fixtures");
        fixtures.write_case(1, b"q", b"42\n").expect("case 1");
        fixtures.write_case(2, b"q", b"41\n").expect("case 2");
        let subject = ScriptedSubject::new(|_| Ok(output_of(b"41\n")));
        let mut out = Vec::new();

        run_cases(fixtures.path(), &subject, &mut out).expect("run");

        assert_eq!(
            report_of(&out),
            vec!["Test case 1 is not OK!", "Test case 2 is OK!"]
        );
    }

    #[test]
    fn subject_failure_is_reported_as_not_ok() {
        let fixtures = FixtureDir::new().expect("fixtures");
        fixtures.write_case(1, b"boom", b"").expect("case 1");
        fixtures.write_case(2, b"fine", b"fine").expect("case 2");
        let subject = ScriptedSubject::new(|input| {
            if input == b"boom" {
                bail!("spawn subject");
            }
            Ok(output_of(input))
        });
        let mut out = Vec::new();

        let cases_run = run_cases(fixtures.path(), &subject, &mut out).expect("run");

        assert_eq!(cases_run, 2);
        assert_eq!(
            report_of(&out),
            vec!["Test case 1 is not OK!", "Test case 2 is OK!"]
        );
    }

    #[test]
    fn truncated_output_is_not_ok() {
        let fixtures = FixtureDir::new().expect("fixtures");
        fixtures.write_case(1, b"x", b"abc").expect("case 1");
        let subject = ScriptedSubject::new(|_| {
            Ok(SubjectOutput {
                stdout_truncated: 10,
                ..output_of(b"abc")
            })
        });
        let mut out = Vec::new();

        run_cases(fixtures.path(), &subject, &mut out).expect("run");

        assert_eq!(report_of(&out), vec!["Test case 1 is not OK!"]);
    }

    #[test]
    fn timed_out_subject_is_not_ok_even_with_matching_output() {
        let fixtures = FixtureDir::new().expect("fixtures");
        fixtures.write_case(1, b"x", b"partial\n").expect("case 1");
        let subject = ScriptedSubject::new(|_| {
            Ok(SubjectOutput {
                timed_out: true,
                ..output_of(b"partial\n")
            })
        });
        let mut out = Vec::new();

        run_cases(fixtures.path(), &subject, &mut out).expect("run");

        assert_eq!(report_of(&out), vec!["Test case 1 is not OK!"]);
    }

    #[test]
    fn no_fixtures_means_no_lines() {
        let fixtures = FixtureDir::new().expect("fixtures");
        let subject = ScriptedSubject::echo();
        let mut out = Vec::new();

        let cases_run = run_cases(fixtures.path(), &subject, &mut out).expect("run");

        assert_eq!(cases_run, 0);
        assert!(out.is_empty());
        assert!(subject.inputs().is_empty());
    }

    #[test]
    fn missing_executable_prints_single_diagnostic() {
        let fixtures = FixtureDir::new().expect("fixtures");
        fixtures.write_case(1, b"a", b"a").expect("case 1");
        let config = fixtures.config_for(fixtures.path().join("bin/simpleDB"));
        let mut out = Vec::new();

        let outcome = run_suite(&config, &mut out).expect("run");

        assert!(matches!(outcome, SuiteOutcome::MissingExecutable { .. }));
        let lines = report_of(&out);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("no executable found at "));
        assert!(lines[0].ends_with("please compile first..."));
    }

    #[cfg(unix)]
    #[test]
    fn suite_runs_process_subject_end_to_end() {
        let fixtures = FixtureDir::new().expect("fixtures");
        let script = fixtures.write_script("echo.sh", "cat\n").expect("script");
        fixtures.write_case(1, b"select 1;\n", b"select 1;\n").expect("case 1");
        fixtures.write_case(2, b"select 2;\n", b"other\n").expect("case 2");
        let config = fixtures.config_for(script);
        let mut out = Vec::new();

        let outcome = run_suite(&config, &mut out).expect("run");

        assert_eq!(outcome, SuiteOutcome::Finished { cases_run: 2 });
        assert_eq!(
            report_of(&out),
            vec!["Test case 1 is OK!", "Test case 2 is not OK!"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn repeated_runs_print_identical_reports() {
        let fixtures = FixtureDir::new().expect("fixtures");
        let script = fixtures.write_script("echo.sh", "cat\n").expect("script");
        fixtures.write_case(1, b"a\n", b"a\n").expect("case 1");
        fixtures.write_case(2, b"b\n", b"c\n").expect("case 2");
        let config = fixtures.config_for(script);

        let mut first = Vec::new();
        run_suite(&config, &mut first).expect("first run");
        let mut second = Vec::new();
        run_suite(&config, &mut second).expect("second run");

        assert_eq!(first, second);
    }

    #[test]
    fn list_prints_contiguous_case_numbers() {
        let fixtures = FixtureDir::new().expect("fixtures");
        fixtures.write_case(1, b"a", b"a").expect("case 1");
        fixtures.write_case(2, b"b", b"b").expect("case 2");
        fixtures.write_case(5, b"e", b"e").expect("case 5");
        let mut out = Vec::new();

        list_cases(fixtures.path(), &mut out).expect("list");

        assert_eq!(report_of(&out), vec!["1", "2"]);
    }
}
