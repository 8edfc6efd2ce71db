//! # Command Execution Module / 命令执行模块
//!
//! Builds external commands from templates and runs them while teeing their
//! combined output into a log file, the console and an in-memory line buffer.
//!
//! 根据模板构建外部命令，并在运行时将其合并输出同时写入日志文件、控制台和内存行缓冲区。

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, PipeReader, Write};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

use crate::infra::t;

/// Expands and splits a command template into program and arguments.
///
/// Environment variables and `~` are expanded first, then the string is split
/// with shell quoting rules. Every `{key}` in `substitutions` is replaced inside
/// each resulting argument, so substituted values never get re-split.
///
/// 展开并拆分命令模板为程序和参数。
/// 先展开环境变量和 `~`，再按 shell 引号规则拆分。`substitutions` 中的每个 `{key}`
/// 在拆分后的每个参数内替换，因此替换的值不会被再次拆分。
pub fn parse_command_line(template: &str, substitutions: &[(&str, &str)]) -> Result<Vec<String>> {
    let expanded = shellexpand::full(template)
        .with_context(|| format!("Failed to expand command: {template}"))?
        .to_string();

    let parts = shlex::split(&expanded)
        .ok_or_else(|| anyhow!("Failed to parse command: {}", expanded))?;
    if parts.is_empty() {
        return Err(anyhow!("Empty command after parsing: {:?}", template));
    }

    Ok(parts
        .into_iter()
        .map(|part| {
            substitutions.iter().fold(part, |acc, (key, value)| {
                acc.replace(&format!("{{{key}}}"), value)
            })
        })
        .collect())
}

/// Creates a `tokio::process::Command` for `parts` that runs inside `cwd`.
/// The working directory is passed to the child only; the current process
/// directory is never changed.
pub fn prepare_command(parts: &[String], cwd: &Path) -> Result<Command> {
    let (program, args) = parts
        .split_first()
        .ok_or_else(|| anyhow!("Cannot run an empty command"))?;
    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(cwd).kill_on_drop(true);
    Ok(cmd)
}

/// Output and exit status of a finished child process.
/// 已结束子进程的输出和退出状态。
#[derive(Debug)]
pub struct CapturedRun {
    pub status: ExitStatus,
    /// Combined stdout and stderr lines, in the order the child wrote them,
    /// without line terminators.
    /// 合并的 stdout 和 stderr 行，按子进程写入的顺序排列，不含换行符。
    pub lines: Vec<String>,
}

/// Spawns a command and drains its combined output until the pipe closes.
///
/// stdout and stderr share one pipe, so lines keep the order the child wrote
/// them in. Each line is decoded lossily, appended to `log_path` (created or
/// truncated) and flushed immediately, echoed to the console when `echo` is
/// set, and collected. A non-zero exit status is returned, not turned into an
/// error.
///
/// 派生一个命令并读取其合并输出，直到管道关闭。
/// stdout 和 stderr 共用一个管道，因此各行保持子进程写入的顺序。
/// 每一行都以有损方式解码，追加到 `log_path`（创建或截断）并立即刷新；
/// 设置 `echo` 时回显到控制台；并被收集。非零退出状态会被返回，而不是转换为错误。
///
/// # Errors
/// Spawning the process, creating the pipe or the log file, or reading the
/// pipe failed.
pub async fn run_and_capture(mut cmd: Command, log_path: &Path, echo: bool) -> Result<CapturedRun> {
    let log = File::create(log_path)
        .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

    let (reader, writer) = io::pipe().with_context(|| t!("capture_pipe_failed").to_string())?;
    let stderr_writer = writer
        .try_clone()
        .with_context(|| t!("capture_pipe_failed").to_string())?;

    let program = cmd.as_std().get_program().to_string_lossy().into_owned();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(stderr_writer)
        .spawn()
        .with_context(|| format!("Failed to spawn command: {}", program))?;
    // The command still owns the parent's write ends; the reader only sees
    // EOF once they are closed.
    drop(cmd);

    let lines = tokio::task::spawn_blocking(move || drain_lines(reader, log, echo))
        .await
        .context("Output reader task failed")?
        .with_context(|| format!("Failed to capture output into log file: {}", log_path.display()))?;

    let status = child
        .wait()
        .await
        .context("Failed to get process status")?;

    Ok(CapturedRun { status, lines })
}

fn drain_lines(reader: PipeReader, mut log: File, echo: bool) -> io::Result<Vec<String>> {
    let mut reader = BufReader::new(reader);
    let mut raw = Vec::new();
    let mut lines = Vec::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        let line = decode_line(&raw);
        writeln!(log, "{}", line)?;
        log.flush()?;
        if echo {
            println!("{}", line);
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Strips the line terminator and replaces invalid UTF-8 with U+FFFD.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
