//! # Console Reporting Module / 控制台报告模块
//!
//! Timestamped status lines, alerts and the final report printout.
//!
//! 带时间戳的状态行、警报以及最终报告的输出。

use colored::*;

use crate::core::config::ModuleSpec;
use crate::core::models::timestamp_now;
use crate::core::report::ReportBuffer;
use crate::infra::t;

/// Formats a status line as `[<timestamp>][<program>] <message>`.
pub fn status_line(timestamp: &str, program: &str, message: &str) -> String {
    format!("[{}][{}] {}", timestamp, program, message)
}

/// Prints a status line stamped with the current time.
/// 打印带当前时间戳的状态行。
pub fn chirp(program: &str, message: &str) {
    println!("{}", status_line(&timestamp_now(), program, message));
}

/// Announces that `stage` is starting for `module`.
/// 宣告 `module` 的 `stage` 阶段开始。
pub fn print_stage(program: &str, stage: &str, module: &ModuleSpec) {
    let message = t!(
        "run.stage_progress",
        stage = stage.bold().blue(),
        name = module.name.as_str().yellow(),
        location = &module.location
    );
    chirp(program, &message);
}

/// Prints a tolerated failure that does not stop the run.
pub fn print_alert(message: &str) {
    println!("{} {}", t!("alert_prefix").yellow().bold(), message.yellow());
}

/// Prints the full report after a separator banner.
///
/// ```text
/// ===============================================================
/// #MODULE_NAME	REPO_LOC	P/F	TOTAL_TESTS	...
/// kb_foo	github.com/kbaseapps/kb_foo	PASS	12	10	0	2	4sec
/// ```
pub fn print_report(buffer: &ReportBuffer) {
    println!("\n\n{}", "=".repeat(63).bold());
    println!("{}", buffer.render());
}
