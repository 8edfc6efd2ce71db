//! # Score Extraction Module / 评分提取模块
//!
//! Reduces the captured text output of one test run to a [`ScoreRecord`].
//!
//! Each line is classified into at most one [`Evidence`] variant, in a fixed
//! priority order, and the evidence is folded into the record in output order.
//! Later evidence overwrites the fields it touches, so a closing summary line
//! wins over anything printed before it.
//!
//! 将一次测试运行捕获的文本输出归约为 [`ScoreRecord`]。
//! 每行按固定优先级最多被归类为一种 [`Evidence`]，并按输出顺序折叠进记录中。
//! 后出现的证据会覆盖其涉及的字段，因此最后的摘要行优先于之前的内容。

use crate::core::models::{ScoreRecord, Tally, Verdict};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Consistency errors detected while finalizing a score.
/// 在最终确定评分时检测到的一致性错误。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScoreError {
    #[error("inconsistent test counts: {failed} failed + {skipped} skipped exceeds {total} tests run")]
    NegativePassCount { total: u64, failed: u64, skipped: u64 },
}

static RAN_TESTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Ran (\d+) tests? in (\d+(?:\.\d*)?|\.\d+)s").expect("valid regex"));
static OK_WITH_SKIPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"OK \(SKIP=(\d+)\)").expect("valid regex"));
static FAILED_WITH_SKIPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^FAILED \(SKIP=(\d+), errors=(\d+)\)").expect("valid regex"));
static FAILED_WITH_ERRORS_AND_FAILURES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^FAILED \(errors=(\d+), failures=(\d+)\)").expect("valid regex"));
static FAILED_WITH_ERRORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^FAILED \(errors=(\d+)\)").expect("valid regex"));

/// A single recognized line shape and the values it carries.
/// 一种已识别的行格式及其携带的值。
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Evidence {
    /// `Ran N tests in S.SSSs`
    RanTests { total: u64, elapsed_secs: u64 },
    /// `OK (SKIP=K)`
    OkWithSkips { skipped: u64 },
    /// `FAILED (SKIP=K, errors=E)`
    FailedWithSkips { skipped: u64, errors: u64 },
    /// `FAILED (errors=E, failures=F)`
    FailedWithErrorsAndFailures { errors: u64, failures: u64 },
    /// `FAILED (errors=E)`
    FailedWithErrors { errors: u64 },
    /// A line starting with `OK`.
    Ok,
    /// A line starting with `RESULT:OK`.
    ResultOk,
    /// A line starting with `FAILED` that carries no parseable counts.
    Failed,
}

fn capture_u64(caps: &regex::Captures<'_>, idx: usize) -> Option<u64> {
    caps.get(idx)?.as_str().parse().ok()
}

/// Classifies one output line. The first matching shape wins; unrecognized
/// lines yield `None`.
///
/// 对一行输出进行分类。第一个匹配的格式生效；无法识别的行返回 `None`。
pub fn classify_line(line: &str) -> Option<Evidence> {
    let line = line.trim_end();

    if let Some(caps) = RAN_TESTS.captures(line) {
        let total = capture_u64(&caps, 1)?;
        let seconds: f64 = caps.get(2)?.as_str().parse().ok()?;
        return Some(Evidence::RanTests {
            total,
            elapsed_secs: seconds.round() as u64,
        });
    }
    if let Some(caps) = OK_WITH_SKIPS.captures(line) {
        return Some(Evidence::OkWithSkips {
            skipped: capture_u64(&caps, 1)?,
        });
    }
    if let Some(caps) = FAILED_WITH_SKIPS.captures(line) {
        return Some(Evidence::FailedWithSkips {
            skipped: capture_u64(&caps, 1)?,
            errors: capture_u64(&caps, 2)?,
        });
    }
    if let Some(caps) = FAILED_WITH_ERRORS_AND_FAILURES.captures(line) {
        return Some(Evidence::FailedWithErrorsAndFailures {
            errors: capture_u64(&caps, 1)?,
            failures: capture_u64(&caps, 2)?,
        });
    }
    if let Some(caps) = FAILED_WITH_ERRORS.captures(line) {
        return Some(Evidence::FailedWithErrors {
            errors: capture_u64(&caps, 1)?,
        });
    }

    if line.starts_with("OK") {
        Some(Evidence::Ok)
    } else if line.starts_with("RESULT:OK") {
        Some(Evidence::ResultOk)
    } else if line.starts_with("FAILED") {
        Some(Evidence::Failed)
    } else {
        None
    }
}

impl ScoreRecord {
    /// Folds one piece of evidence into the record, overwriting the fields it sets.
    /// 将一条证据折叠进记录，覆盖其设置的字段。
    pub fn absorb(&mut self, evidence: Evidence) {
        match evidence {
            Evidence::RanTests {
                total,
                elapsed_secs,
            } => {
                self.total = total;
                self.elapsed_secs = elapsed_secs;
            }
            Evidence::OkWithSkips { skipped } => {
                self.set_outcome(Verdict::Pass, Tally::Known(0), Tally::Known(skipped));
            }
            Evidence::FailedWithSkips { skipped, errors } => {
                self.set_outcome(Verdict::Fail, Tally::Known(errors), Tally::Known(skipped));
            }
            Evidence::FailedWithErrorsAndFailures { errors, failures } => {
                self.set_outcome(
                    Verdict::Fail,
                    Tally::Known(errors.saturating_add(failures)),
                    Tally::Known(0),
                );
            }
            Evidence::FailedWithErrors { errors } => {
                self.set_outcome(Verdict::Fail, Tally::Known(errors), Tally::Known(0));
            }
            Evidence::Ok | Evidence::ResultOk => {
                self.set_outcome(Verdict::Pass, Tally::Known(0), Tally::Known(0));
            }
            Evidence::Failed => {
                self.set_outcome(Verdict::Fail, Tally::Unknown, Tally::Unknown);
            }
        }
    }

    fn set_outcome(&mut self, verdict: Verdict, failed: Tally, skipped: Tally) {
        self.verdict = verdict;
        self.failed = failed;
        self.skipped = skipped;
    }

    /// Derives the pass count from the other counts.
    ///
    /// The pass count is only known when both the fail and skip counts are;
    /// a derivation that would go below zero is an error.
    fn derive_passed(&mut self) -> Result<(), ScoreError> {
        self.passed = match (self.failed, self.skipped) {
            (Tally::Known(failed), Tally::Known(skipped)) => {
                let passed = self
                    .total
                    .checked_sub(failed)
                    .and_then(|rest| rest.checked_sub(skipped))
                    .ok_or(ScoreError::NegativePassCount {
                        total: self.total,
                        failed,
                        skipped,
                    })?;
                Tally::Known(passed)
            }
            _ => Tally::Unknown,
        };
        Ok(())
    }
}

/// Grades a test run from its captured output lines.
///
/// This is a pure function of the line sequence. An empty sequence yields the
/// default `FAIL` record with zero counts.
///
/// 根据捕获的输出行对测试运行评分。
/// 这是一个仅依赖行序列的纯函数。空序列产生计数为零的默认 `FAIL` 记录。
///
/// # Errors
/// [`ScoreError::NegativePassCount`] when the reported fail and skip counts
/// exceed the number of tests run.
pub fn extract_score<I, S>(lines: I) -> Result<ScoreRecord, ScoreError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut record = lines
        .into_iter()
        .filter_map(|line| classify_line(line.as_ref()))
        .fold(ScoreRecord::default(), |mut record, evidence| {
            record.absorb(evidence);
            record
        });
    record.derive_passed()?;
    Ok(record)
}
