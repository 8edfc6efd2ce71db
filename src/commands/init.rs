//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a sample module
//! list and a run settings file to get a new batch started.
//!
//! 此模块实现了 `init` 命令，用于写入示例模块列表和运行设置文件。

use anyhow::{bail, Context, Result};
use colored::*;
use std::{fs, path::Path};

use crate::core::config::RunSettings;
use crate::infra::{fs::ensure_dir, t};

/// File name of the sample module list.
pub const MODULE_LIST_FILE: &str = "modules.cfg";
/// File name of the sample settings file.
pub const SETTINGS_FILE: &str = "batch.toml";

const DEFAULT_MODULE_LIST: &str = r#"# Module list / 模块列表
# One module per line: <module_name> [source_location]
# 每行一个模块：<模块名> [源码位置]
#
# Without a location the module is fetched from `<repo_base>/<module_name>`.
# 未指定位置时，从 `<repo_base>/<模块名>` 获取模块。

kb_uploadmethods
kb_ReadsUtilities   github.com/kbaseapps/kb_ReadsUtilities
"#;

fn default_settings() -> Result<String> {
    let body = toml::to_string(&RunSettings::default()).context("Failed to render default settings")?;
    Ok(format!(
        "# Batch run settings / 批量运行设置\n\
         # `{{module}}` and `{{location}}` are substituted in command arguments.\n\
         # 命令参数中的 `{{module}}` 和 `{{location}}` 会被替换。\n\n{}",
        body
    ))
}

/// Writes the sample files into `dir`.
///
/// # Arguments
/// * `dir` - Target directory, created when missing
/// * `force` - Whether to overwrite existing files
pub fn execute(dir: &Path, force: bool) -> Result<()> {
    ensure_dir(dir)?;

    let files = [
        (dir.join(MODULE_LIST_FILE), DEFAULT_MODULE_LIST.to_string()),
        (dir.join(SETTINGS_FILE), default_settings()?),
    ];

    if !force {
        if let Some((existing, _)) = files.iter().find(|(path, _)| path.exists()) {
            bail!(t!("init.file_exists", path = existing.display()).to_string());
        }
    }

    for (path, content) in &files {
        fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{}", t!("init.file_written", path = path.display()).green());
    }
    Ok(())
}
