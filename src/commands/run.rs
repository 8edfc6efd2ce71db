//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which tests every module listed
//! in the module configuration and records the verdicts into a report.
//!
//! 此模块实现了 `run` 命令，测试模块配置中列出的每个模块并将判定记录到报告中。

use anyhow::{Context, Result};
use colored::*;
use std::path::PathBuf;

use crate::{
    core::{
        config::{self, RunSettings},
        execution::Orchestrator,
        models::{timestamp_now, RunContext},
        report::{ReportBuffer, ReportStore},
    },
    infra::{fs::absolute_path, t},
    reporting::console::{chirp, print_report},
};

/// Program name shown in status lines.
pub const PROGRAM: &str = env!("CARGO_PKG_NAME");

/// Arguments of the `run` command.
/// `run` 命令的参数。
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Line-oriented module list.
    pub module_config: PathBuf,
    /// Harness configuration file installed into each module as `test.cfg`.
    pub harness_config: PathBuf,
    /// Root under which logs, working trees, reports and templates live.
    pub base_path: PathBuf,
    /// Optional TOML run settings.
    pub settings: Option<PathBuf>,
    /// Existing report to resume instead of creating a new one.
    pub resume: Option<PathBuf>,
    /// Suppress echoing child process output.
    pub quiet: bool,
    /// Whether `--lang` was given explicitly.
    pub lang_overridden: bool,
}

/// Executes the run command with the provided arguments.
///
/// Configuration problems are reported before any module is touched.
/// Individual module verdicts do not affect the result; only configuration,
/// checkout and report consistency errors do.
///
/// # Returns
/// A Result indicating success or failure of the command execution
pub async fn execute(args: RunArgs) -> Result<()> {
    let settings = config::load_settings(args.settings.as_deref())
        .with_context(|| t!("settings_load_failed").to_string())?;
    if let (Some(language), false) = (&settings.language, args.lang_overridden) {
        rust_i18n::set_locale(language);
    }

    let base_path = absolute_path(&args.base_path)
        .with_context(|| t!("base_path_not_found", path = args.base_path.display()).to_string())?;
    let harness_config = absolute_path(&args.harness_config).with_context(|| {
        t!("harness_config_not_found", path = args.harness_config.display()).to_string()
    })?;
    let modules = config::load_module_list(&args.module_config, &settings.repo_base)
        .with_context(|| {
            t!("module_config_failed", path = args.module_config.display()).to_string()
        })?;

    let ctx = RunContext::new(PROGRAM, &base_path, &settings, timestamp_now());
    ctx.prepare()?;

    chirp(
        PROGRAM,
        &t!("loaded_modules", count = modules.len(), path = args.module_config.display()),
    );

    let (store, buffer) = open_report(&ctx, &args, &modules)?;
    chirp(
        PROGRAM,
        &t!("report_path", path = store.path().display().to_string().cyan()),
    );

    let buffer = run_modules(&ctx, &settings, harness_config, store, &modules, buffer, !args.quiet).await?;

    print_report(&buffer);
    Ok(())
}

/// Creates this run's report, or loads the one being resumed.
fn open_report(
    ctx: &RunContext,
    args: &RunArgs,
    modules: &[config::ModuleSpec],
) -> Result<(ReportStore, ReportBuffer)> {
    match &args.resume {
        Some(report) => {
            let store = ReportStore::new(report.clone());
            let buffer = store.open()?;
            chirp(
                PROGRAM,
                &t!(
                    "resuming_report",
                    pending = buffer.pending_count(),
                    total = buffer.rows().len()
                ),
            );
            Ok((store, buffer))
        }
        None => {
            let store = ReportStore::new(ctx.report_path());
            let buffer = store.create(modules)?;
            Ok((store, buffer))
        }
    }
}

async fn run_modules(
    ctx: &RunContext,
    settings: &RunSettings,
    harness_config: PathBuf,
    store: ReportStore,
    modules: &[config::ModuleSpec],
    buffer: ReportBuffer,
    echo: bool,
) -> Result<ReportBuffer> {
    let orchestrator = Orchestrator::new(ctx, settings, harness_config, store, echo);
    orchestrator.run_all(modules, buffer).await
}
