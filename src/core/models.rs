//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the batch tester.
//! It includes the per-module score record, the verdict and count types, and the
//! run context holding every derived filesystem path.
//!
//! 此模块定义了整个批量测试器中使用的核心数据结构。
//! 它包括每个模块的评分记录、判定与计数类型，以及保存所有派生文件系统路径的运行上下文。

use crate::core::config::{ModuleSpec, RunSettings};
use crate::infra::fs::ensure_dir;
use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// `strftime` layout shared by run/module timestamps and status lines.
pub const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Returns the current local time formatted with [`STAMP_FORMAT`].
pub fn timestamp_now() -> String {
    Local::now().format(STAMP_FORMAT).to_string()
}

/// The binary grade of one module's test run.
/// 单个模块测试运行的二元判定。
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Verdict {
    /// Conclusive evidence of success was found in the output.
    /// 输出中找到了确定的成功证据。
    Pass,
    /// The default until a passing summary is seen.
    /// 在看到通过摘要之前的默认值。
    #[default]
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("PASS"),
            Verdict::Fail => f.write_str("FAIL"),
        }
    }
}

/// A test count that is either measured or explicitly not measured.
///
/// `Unknown` is distinct from zero: it means the output said the run failed
/// without saying how many tests failed or were skipped.
///
/// 一个测试计数，要么已测得，要么明确未测得。
/// `Unknown` 与零不同：表示输出仅说明运行失败，却没有给出失败或跳过的数量。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Tally {
    Known(u64),
    Unknown,
}

impl Tally {
    /// Literal written to the report for [`Tally::Unknown`].
    pub const UNKNOWN_MARKER: &'static str = "N/A";

    pub fn known(&self) -> Option<u64> {
        match self {
            Tally::Known(n) => Some(*n),
            Tally::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Tally::Known(_))
    }
}

impl Default for Tally {
    fn default() -> Self {
        Tally::Known(0)
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tally::Known(n) => write!(f, "{}", n),
            Tally::Unknown => f.write_str(Self::UNKNOWN_MARKER),
        }
    }
}

/// The grade of one test run, reduced from the runner's text output.
/// 单次测试运行的评分，由测试运行器的文本输出归约而来。
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub verdict: Verdict,
    /// Number of tests attempted, `0` when never reported.
    /// 尝试的测试数量，未报告时为 `0`。
    pub total: u64,
    pub passed: Tally,
    pub failed: Tally,
    pub skipped: Tally,
    /// Runtime rounded to whole seconds, `0` when never reported.
    /// 四舍五入到整秒的运行时间，未报告时为 `0`。
    pub elapsed_secs: u64,
}

/// Per-run constants: the run timestamp and every path derived from the base path.
/// Created once at startup and read-only afterwards.
///
/// 每次运行的常量：运行时间戳以及从基础路径派生的所有路径。
/// 启动时创建一次，之后只读。
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Short program name used in status lines.
    pub program: String,
    /// Timestamp namespacing every output directory of this run.
    /// 为本次运行的所有输出目录提供命名空间的时间戳。
    pub run_timestamp: String,
    pub base_path: PathBuf,
    pub clone_logs_dir: PathBuf,
    pub test_logs_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub exec_dir: PathBuf,
    /// Full path of the harness template directory to install.
    /// 要安装的测试框架模板目录的完整路径。
    pub template_path: PathBuf,
    pub template_name: String,
    pub report_prefix: String,
}

impl RunContext {
    /// Derives all run paths below `base_path` without touching the filesystem.
    pub fn new(program: &str, base_path: &Path, settings: &RunSettings, run_timestamp: String) -> Self {
        let logs_dir = base_path.join("logs").join(&run_timestamp);
        let template_root = if settings.template_dir.is_absolute() {
            settings.template_dir.clone()
        } else {
            base_path.join(&settings.template_dir)
        };

        Self {
            program: program.to_string(),
            base_path: base_path.to_path_buf(),
            clone_logs_dir: logs_dir.join("clone"),
            test_logs_dir: logs_dir.join("test"),
            reports_dir: base_path.join("reports"),
            exec_dir: base_path.join("module_exec").join(&run_timestamp),
            template_path: template_root.join(&settings.template_name),
            template_name: settings.template_name.clone(),
            report_prefix: settings.report_prefix.clone(),
            run_timestamp,
        }
    }

    /// Creates the run-level directories.
    pub fn prepare(&self) -> Result<()> {
        for dir in [
            &self.clone_logs_dir,
            &self.test_logs_dir,
            &self.reports_dir,
            &self.exec_dir,
        ] {
            ensure_dir(dir)?;
        }
        Ok(())
    }

    /// Path of the report file for this run.
    pub fn report_path(&self) -> PathBuf {
        self.reports_dir
            .join(format!("{}_{}.tsv", self.report_prefix, self.run_timestamp))
    }

    /// Derives the per-module paths for one attempt and creates its working directory.
    ///
    /// 为一次模块执行派生路径并创建其工作目录。
    pub fn module_paths(&self, module: &ModuleSpec, module_timestamp: &str) -> Result<ModulePaths> {
        let tag = format!("{}_{}", module.name, module_timestamp);
        let checkout_dir = self.exec_dir.join(&tag);
        ensure_dir(&checkout_dir)?;

        Ok(ModulePaths {
            test_dir: checkout_dir.join(&module.name),
            checkout_log: self.clone_logs_dir.join(format!("{}-CLONE.log", tag)),
            test_log: self.test_logs_dir.join(format!("{}-TEST.log", tag)),
            checkout_dir,
        })
    }
}

/// Working and log paths of a single module within a run.
/// 单个模块在一次运行中的工作路径和日志路径。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePaths {
    /// Directory the checkout command runs in.
    /// 检出命令运行所在的目录。
    pub checkout_dir: PathBuf,
    pub checkout_log: PathBuf,
    /// The checked-out module tree; the test command runs here.
    /// 检出的模块目录；测试命令在此运行。
    pub test_dir: PathBuf,
    pub test_log: PathBuf,
}
