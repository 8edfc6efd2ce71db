//! # Reporting Module / 报告模块
//!
//! This module handles everything the operator sees on the console:
//! timestamped stage progress, alerts for tolerated failures and the
//! final report.
//!
//! 此模块处理操作员在控制台上看到的所有内容：
//! 带时间戳的阶段进度、可容忍失败的警报以及最终报告。

pub mod console;

// Re-export common reporting functions
pub use console::{chirp, print_alert, print_report, print_stage};
