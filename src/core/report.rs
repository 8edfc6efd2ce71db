//! # Report Store Module / 报告存储模块
//!
//! The tab-separated report file is the durable state of a run: one row per
//! configured module, created as a placeholder and graded exactly once.
//! Graded rows are never rewritten, which makes a restarted run that reuses
//! the same report skip every module it already finished.
//!
//! 制表符分隔的报告文件是一次运行的持久状态：每个配置的模块对应一行，
//! 创建时为占位行，且只会被评分一次。已评分的行永远不会被重写，
//! 因此复用同一报告重新启动的运行会跳过所有已完成的模块。

use crate::core::config::ModuleSpec;
use crate::core::models::ScoreRecord;
use crate::infra::fs::{replace_file, write_new_file};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Cell value of a column that has not been graded yet.
pub const PLACEHOLDER: &str = "-";

/// Column headings, in file order.
pub const HEADER: [&str; 8] = [
    "#MODULE_NAME",
    "REPO_LOC",
    "P/F",
    "TOTAL_TESTS",
    "TESTS_PASSED",
    "TESTS_FAILED",
    "TESTS_SKIPPED",
    "TOTAL_RUNTIME",
];

const RUNTIME_UNIT: &str = "sec";
const VALUE_COLUMNS: usize = HEADER.len() - 2;

/// Errors raised by the report store.
/// 报告存储产生的错误。
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("a report already exists at {0}; refusing to overwrite it")]
    AlreadyExists(PathBuf),

    #[error("no report exists at {0}")]
    ReportMissing(PathBuf),

    #[error("{path}:{line}: malformed report row, expected {expected} tab-separated fields")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        expected: usize,
    },

    #[error("report I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One module's row: its key and the six value cells that follow it.
/// 单个模块的行：其键以及随后的六个值单元格。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub module: ModuleSpec,
    cells: [String; VALUE_COLUMNS],
}

impl ReportRow {
    /// A row with every value cell set to the placeholder.
    pub fn placeholder(module: &ModuleSpec) -> Self {
        Self {
            module: module.clone(),
            cells: std::array::from_fn(|_| PLACEHOLDER.to_string()),
        }
    }

    /// A graded row carrying the given score.
    pub fn graded(module: &ModuleSpec, score: &ScoreRecord) -> Self {
        Self {
            module: module.clone(),
            cells: [
                score.verdict.to_string(),
                score.total.to_string(),
                score.passed.to_string(),
                score.failed.to_string(),
                score.skipped.to_string(),
                format!("{}{}", score.elapsed_secs, RUNTIME_UNIT),
            ],
        }
    }

    /// `true` once the verdict cell holds anything but the placeholder.
    pub fn is_graded(&self) -> bool {
        self.cells[0] != PLACEHOLDER
    }

    /// Verdict cell as written, `-` while pending.
    pub fn verdict(&self) -> &str {
        &self.cells[0]
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        let [name, location, rest @ ..] = fields.as_slice() else {
            return None;
        };
        let cells: [String; VALUE_COLUMNS] = rest
            .iter()
            .map(|cell| cell.to_string())
            .collect::<Vec<_>>()
            .try_into()
            .ok()?;
        if name.is_empty() || location.is_empty() {
            return None;
        }
        Some(Self {
            module: ModuleSpec::new(*name, *location),
            cells,
        })
    }
}

impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.module.name, self.module.location)?;
        for cell in &self.cells {
            write!(f, "\t{}", cell)?;
        }
        Ok(())
    }
}

/// In-memory mirror of the report file.
///
/// The orchestrator hands the buffer to [`ReportStore::apply_score`] by value
/// and replaces it with the returned one.
///
/// 报告文件在内存中的镜像。
/// 编排器按值将缓冲区交给 [`ReportStore::apply_score`]，并用返回值替换它。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportBuffer {
    rows: Vec<ReportRow>,
}

impl ReportBuffer {
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Number of lines in the rendered file, header included.
    pub fn line_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// The first row with the given key.
    pub fn find(&self, module: &ModuleSpec) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.module == *module)
    }

    /// `true` when the module has a row and no placeholder row is left for it.
    pub fn is_graded(&self, module: &ModuleSpec) -> bool {
        let mut rows = self.rows.iter().filter(|row| row.module == *module).peekable();
        rows.peek().is_some() && rows.all(ReportRow::is_graded)
    }

    /// Number of rows still holding the placeholder verdict.
    pub fn pending_count(&self) -> usize {
        self.rows.iter().filter(|row| !row.is_graded()).count()
    }

    /// The file content: header plus one line per row, newline-terminated.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReportBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER.join("\t"))?;
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

/// Owns one report file. There must be a single writer per file.
/// 拥有一个报告文件。每个文件只能有一个写入者。
#[derive(Debug, Clone)]
pub struct ReportStore {
    path: PathBuf,
}

impl ReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> ReportError {
        ReportError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Creates the report with one placeholder row per module, in the given order.
    ///
    /// 创建报告，按给定顺序为每个模块写入一行占位行。
    ///
    /// # Errors
    /// [`ReportError::AlreadyExists`] when a file is already present at the path;
    /// that file is left untouched.
    pub fn create(&self, modules: &[ModuleSpec]) -> Result<ReportBuffer, ReportError> {
        if self.path.exists() {
            return Err(ReportError::AlreadyExists(self.path.clone()));
        }

        let buffer = ReportBuffer {
            rows: modules.iter().map(ReportRow::placeholder).collect(),
        };
        write_new_file(&self.path, &buffer.render()).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ReportError::AlreadyExists(self.path.clone()),
            _ => self.io_error(e),
        })?;
        Ok(buffer)
    }

    /// Loads an existing report, e.g. to resume an interrupted run.
    ///
    /// 加载现有报告，例如用于恢复中断的运行。
    pub fn open(&self) -> Result<ReportBuffer, ReportError> {
        let content = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ReportError::ReportMissing(self.path.clone()),
            _ => self.io_error(e),
        })?;

        let mut rows = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let row = ReportRow::parse(line).ok_or_else(|| ReportError::MalformedRow {
                path: self.path.clone(),
                line: idx + 1,
                expected: HEADER.len(),
            })?;
            rows.push(row);
        }
        Ok(ReportBuffer { rows })
    }

    /// Grades the first placeholder row matching `module` and rewrites the file.
    ///
    /// Already graded rows, and rows for other modules, pass through unchanged,
    /// so applying a score twice for the same module leaves the report as the
    /// first application wrote it.
    ///
    /// 为第一个匹配 `module` 的占位行评分并重写文件。
    /// 已评分的行以及其他模块的行保持不变，因此对同一模块重复评分不会改变
    /// 第一次写入后的报告。
    ///
    /// # Errors
    /// [`ReportError::ReportMissing`] when the report file does not exist.
    pub fn apply_score(
        &self,
        buffer: ReportBuffer,
        module: &ModuleSpec,
        score: &ScoreRecord,
    ) -> Result<ReportBuffer, ReportError> {
        if !self.path.exists() {
            return Err(ReportError::ReportMissing(self.path.clone()));
        }

        let mut applied = false;
        let rows = buffer
            .rows
            .into_iter()
            .map(|row| {
                if !applied && !row.is_graded() && row.module == *module {
                    applied = true;
                    ReportRow::graded(module, score)
                } else {
                    row
                }
            })
            .collect();
        let updated = ReportBuffer { rows };

        replace_file(&self.path, &updated.render()).map_err(|e| self.io_error(e))?;
        Ok(updated)
    }
}
