//! # Harness Installation Module / 测试框架安装模块
//!
//! Copies the standard test harness template into a checked-out module and
//! specializes it for that module.
//!
//! 将标准测试框架模板复制到检出的模块中，并针对该模块进行定制。

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::infra::fs::copy_dir_into;

/// Token replaced by the lower-cased module name in the harness scripts.
pub const MODULE_NAME_TOKEN: &str = "%%MODULE_NAME%%";

/// Harness scripts that carry [`MODULE_NAME_TOKEN`].
pub const TEMPLATED_SCRIPTS: [&str; 2] = ["run_bash.sh", "run_tests.sh"];

/// Name the harness config file gets inside the installed harness.
pub const HARNESS_CONFIG_NAME: &str = "test.cfg";

/// Installs the harness at `template_path` into `module_dir`.
///
/// The template directory is copied to `module_dir/<template name>`, the
/// harness config is copied in as `test.cfg`, and the module name token in
/// the templated scripts is replaced. Scripts missing from the template are
/// skipped.
///
/// 将 `template_path` 处的测试框架安装到 `module_dir`。
/// 模板目录被复制到 `module_dir/<模板名>`，框架配置文件以 `test.cfg` 复制进去，
/// 模板脚本中的模块名标记会被替换。模板中不存在的脚本将被跳过。
///
/// # Returns
/// Path of the installed harness directory.
pub fn install_harness(
    template_path: &Path,
    harness_config: &Path,
    module_name: &str,
    module_dir: &Path,
) -> Result<PathBuf> {
    if !template_path.is_dir() {
        bail!("Harness template not found: {}", template_path.display());
    }
    if !module_dir.is_dir() {
        bail!(
            "Checked-out module directory not found: {}",
            module_dir.display()
        );
    }
    let template_name = template_path
        .file_name()
        .with_context(|| format!("Invalid template path: {}", template_path.display()))?;

    copy_dir_into(template_path, module_dir)?;
    let installed = module_dir.join(template_name);

    let config_dst = installed.join(HARNESS_CONFIG_NAME);
    fs::copy(harness_config, &config_dst).with_context(|| {
        format!(
            "Failed to copy harness config {} to {}",
            harness_config.display(),
            config_dst.display()
        )
    })?;

    let replacement = module_name.to_lowercase();
    for script in TEMPLATED_SCRIPTS {
        let script_path = installed.join(script);
        if !script_path.is_file() {
            continue;
        }
        let content = fs::read_to_string(&script_path)
            .with_context(|| format!("Failed to read {}", script_path.display()))?;
        fs::write(&script_path, content.replace(MODULE_NAME_TOKEN, &replacement))
            .with_context(|| format!("Failed to write {}", script_path.display()))?;
    }

    Ok(installed)
}
