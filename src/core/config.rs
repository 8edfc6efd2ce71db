//! # Configuration Module / 配置模块
//!
//! Parses the line-oriented module list and the optional TOML run settings.
//!
//! 解析按行组织的模块列表以及可选的 TOML 运行设置。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading the module list or the run settings.
/// 读取模块列表或运行设置时产生的错误。
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected `<module_name> [source_location]`, found {found} fields")]
    TooManyFields { line: usize, found: usize },

    #[error("line {line}: module `{name}` is listed more than once")]
    DuplicateModule { line: usize, name: String },

    #[error("module list contains no modules")]
    Empty,

    #[error("invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// One module to be tested: its unique name and where to fetch it from.
/// The pair is also the key of the module's row in the report.
///
/// 一个待测试的模块：唯一名称以及获取源码的位置。
/// 这两个字段同时也是该模块在报告中对应行的键。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ModuleSpec {
    /// Unique module identifier, used in directory names and report keys.
    /// 唯一的模块标识符，用于目录名和报告键。
    pub name: String,
    /// Scheme-less source location, e.g. `github.com/kbaseapps/kb_uploadmethods`.
    /// 不含协议前缀的源码位置。
    pub location: String,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

/// Removes a leading `https://` or `http://` from an explicit source location.
pub fn normalize_location(raw: &str) -> String {
    raw.strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .unwrap_or(raw)
        .to_string()
}

/// Parses the content of a module list.
///
/// Each non-blank line that does not start with `#` is
/// `<module_name> [source_location]`. A missing location defaults to
/// `<repo_base>/<module_name>`.
///
/// 解析模块列表的内容。
/// 每个非空且不以 `#` 开头的行格式为 `<module_name> [source_location]`。
/// 缺少位置时默认为 `<repo_base>/<module_name>`。
pub fn parse_module_list(content: &str, repo_base: &str) -> Result<Vec<ModuleSpec>, ConfigError> {
    let mut modules = Vec::new();
    let mut seen = HashSet::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let (name, location) = match fields.as_slice() {
            [name] => (*name, format!("{}/{}", repo_base.trim_end_matches('/'), name)),
            [name, location] => (*name, normalize_location(location)),
            _ => {
                return Err(ConfigError::TooManyFields {
                    line: line_no,
                    found: fields.len(),
                });
            }
        };

        if !seen.insert(name.to_string()) {
            return Err(ConfigError::DuplicateModule {
                line: line_no,
                name: name.to_string(),
            });
        }
        modules.push(ModuleSpec::new(name, location));
    }

    if modules.is_empty() {
        return Err(ConfigError::Empty);
    }
    Ok(modules)
}

/// Reads and parses a module list file.
pub fn load_module_list(path: &Path, repo_base: &str) -> Result<Vec<ModuleSpec>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_module_list(&content, repo_base)
}

/// Run-wide settings, loaded from an optional TOML file.
/// Every field has a default so an empty file is valid.
///
/// 运行级设置，从可选的 TOML 文件加载。
/// 每个字段都有默认值，因此空文件也是有效的。
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RunSettings {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Base joined with the module name when a module has no explicit location.
    /// 模块未显式指定位置时，与模块名拼接的基础路径。
    pub repo_base: String,
    /// Checkout command template. `{module}` and `{location}` are substituted per argument.
    /// 检出命令模板。`{module}` 和 `{location}` 会在每个参数中被替换。
    pub checkout_command: String,
    /// Test command run inside the checked-out module.
    /// 在检出的模块目录中运行的测试命令。
    pub test_command: String,
    /// Directory holding harness templates, relative to the base path unless absolute.
    /// 存放测试框架模板的目录，除非是绝对路径，否则相对于基础路径。
    pub template_dir: PathBuf,
    /// Name of the harness template directory inside `template_dir`.
    /// `template_dir` 中测试框架模板目录的名称。
    pub template_name: String,
    /// File name prefix of the report; the run timestamp is appended.
    /// 报告文件名前缀；会追加运行时间戳。
    pub report_prefix: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            language: None,
            repo_base: "github.com/kbaseapps".to_string(),
            checkout_command: "git clone https://{location}".to_string(),
            test_command: "kb-sdk test".to_string(),
            template_dir: PathBuf::from("templates"),
            template_name: "test_local".to_string(),
            report_prefix: "sdk_unittests".to_string(),
        }
    }
}

/// Parses run settings from TOML text.
pub fn parse_settings(content: &str, path: &Path) -> Result<RunSettings, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Settings {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads run settings from `path`, or returns the defaults when no path is given.
pub fn load_settings(path: Option<&Path>) -> Result<RunSettings, ConfigError> {
    match path {
        None => Ok(RunSettings::default()),
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            parse_settings(&content, path)
        }
    }
}
