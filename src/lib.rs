//! # Module Batch Tester Library / 模块批量测试器库
//!
//! This library provides the core functionality for the module batch tester,
//! a resumable executor that checks out a list of SDK modules, installs a
//! standard test harness into each, runs their tests and records a verdict
//! per module into a tab-separated report.
//!
//! 此库为模块批量测试器提供核心功能，
//! 这是一个可恢复的执行器：检出一组 SDK 模块，为每个模块安装标准测试框架，
//! 运行其测试，并将每个模块的判定记录到制表符分隔的报告中。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, score extraction, report store and the run orchestrator
//! - `infra` - Infrastructure services like command execution and file system operations
//! - `reporting` - Console status lines and the final report printout
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、评分提取、报告存储和运行编排器
//! - `infra` - 基础设施服务，如命令执行和文件系统操作
//! - `reporting` - 控制台状态行和最终报告输出
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod commands;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::models;
pub use crate::core::report;
pub use crate::core::score;

/// Detects the language to use for messages from the system locale.
///
/// It attempts to match the full locale (e.g., "zh-CN"), then just the
/// language code (e.g., "en"), and finally falls back to "en".
pub fn detect_locale() -> String {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&locale.as_str()) {
        locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
            .to_string()
    }
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
