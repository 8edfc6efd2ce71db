//! # Module Execution Module / 模块执行模块
//!
//! Drives every configured module through its four stages, strictly one module
//! at a time: checkout, harness installation, test execution, and recording
//! the extracted score into the report.
//!
//! 严格逐个模块地驱动每个配置的模块完成四个阶段：
//! 检出、安装测试框架、执行测试，以及将提取的评分记录到报告中。

use anyhow::{bail, Context, Result};
use colored::*;
use std::path::PathBuf;

use crate::{
    core::{
        config::{ModuleSpec, RunSettings},
        harness::install_harness,
        models::{timestamp_now, RunContext, ScoreRecord, Verdict},
        report::{ReportBuffer, ReportStore},
        score::extract_score,
    },
    infra::{command, t},
    reporting::console::{chirp, print_alert, print_stage},
};

/// Sequential driver for one run.
///
/// The orchestrator owns the report store; the report buffer is threaded
/// through [`Orchestrator::run_module`] by value and replaced after every module.
///
/// 单次运行的顺序驱动器。
/// 编排器拥有报告存储；报告缓冲区按值传入 [`Orchestrator::run_module`]，
/// 并在每个模块完成后被替换。
#[derive(Debug)]
pub struct Orchestrator<'a> {
    ctx: &'a RunContext,
    settings: &'a RunSettings,
    harness_config: PathBuf,
    store: ReportStore,
    echo: bool,
}

impl<'a> Orchestrator<'a> {
    /// # Arguments
    /// * `ctx` - Paths and timestamp of this run
    /// * `settings` - Command templates and naming settings
    /// * `harness_config` - File installed into each harness as `test.cfg`
    /// * `store` - The report this run records into
    /// * `echo` - Whether child output is echoed to the console
    pub fn new(
        ctx: &'a RunContext,
        settings: &'a RunSettings,
        harness_config: PathBuf,
        store: ReportStore,
        echo: bool,
    ) -> Self {
        Self {
            ctx,
            settings,
            harness_config,
            store,
            echo,
        }
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Runs every module in configured order and returns the final report buffer.
    ///
    /// Modules whose row is already graded are skipped without being checked
    /// out, which is what makes a resumed run pick up where it stopped.
    /// A checkout failure aborts the whole run.
    ///
    /// 按配置顺序运行所有模块并返回最终的报告缓冲区。
    /// 已评分的模块会被跳过且不会被检出，这使得恢复的运行能够从中断处继续。
    /// 检出失败会中止整个运行。
    pub async fn run_all(&self, modules: &[ModuleSpec], mut buffer: ReportBuffer) -> Result<ReportBuffer> {
        for module in modules {
            if buffer.find(module).is_none() {
                print_alert(&t!("run.module_not_in_report", name = &module.name));
                continue;
            }
            if buffer.is_graded(module) {
                chirp(
                    &self.ctx.program,
                    &t!("run.already_graded", name = &module.name).dimmed().to_string(),
                );
                continue;
            }
            buffer = self.run_module(module, buffer).await?;
        }
        Ok(buffer)
    }

    /// Checks out, installs, tests and grades one module.
    ///
    /// # Errors
    /// Checkout failure, harness installation failure, a process that cannot
    /// be spawned, inconsistent test counts or a report write failure. A test
    /// command exiting non-zero is not an error.
    pub async fn run_module(&self, module: &ModuleSpec, buffer: ReportBuffer) -> Result<ReportBuffer> {
        let program = &self.ctx.program;
        let paths = self.ctx.module_paths(module, &timestamp_now())?;
        let substitutions = [
            ("module", module.name.as_str()),
            ("location", module.location.as_str()),
        ];

        print_stage(program, &t!("stage.clone"), module);
        let checkout_parts = command::parse_command_line(&self.settings.checkout_command, &substitutions)?;
        let checkout_cmd = command::prepare_command(&checkout_parts, &paths.checkout_dir)?;
        let checkout = command::run_and_capture(checkout_cmd, &paths.checkout_log, self.echo)
            .await
            .with_context(|| t!("run.checkout_spawn_failed", name = &module.name).to_string())?;
        if !checkout.status.success() {
            bail!(
                "{}",
                t!(
                    "run.checkout_failed",
                    command = checkout_parts.join(" "),
                    status = checkout.status,
                    log = paths.checkout_log.display()
                )
            );
        }

        print_stage(program, &t!("stage.copy_template"), module);
        install_harness(
            &self.ctx.template_path,
            &self.harness_config,
            &module.name,
            &paths.test_dir,
        )?;

        print_stage(program, &t!("stage.unit_tests"), module);
        let test_parts = command::parse_command_line(&self.settings.test_command, &substitutions)?;
        let test_cmd = command::prepare_command(&test_parts, &paths.test_dir)?;
        let test_run = command::run_and_capture(test_cmd, &paths.test_log, self.echo)
            .await
            .with_context(|| t!("run.test_spawn_failed", name = &module.name).to_string())?;
        if !test_run.status.success() {
            print_alert(&t!(
                "run.test_command_failed",
                command = test_parts.join(" "),
                status = test_run.status
            ));
        }

        print_stage(program, &t!("stage.parse_test_log"), module);
        let score = extract_score(&test_run.lines).with_context(|| {
            t!(
                "run.inconsistent_score",
                name = &module.name,
                log = paths.test_log.display()
            )
            .to_string()
        })?;

        print_stage(program, &t!("stage.update_report"), module);
        let buffer = self.store.apply_score(buffer, module, &score)?;
        print_verdict(program, module, &score);

        Ok(buffer)
    }
}

fn print_verdict(program: &str, module: &ModuleSpec, score: &ScoreRecord) {
    let verdict = match score.verdict {
        Verdict::Pass => score.verdict.to_string().green().bold(),
        Verdict::Fail => score.verdict.to_string().red().bold(),
    };
    chirp(
        program,
        &t!(
            "run.module_graded",
            name = &module.name,
            verdict = verdict,
            total = score.total,
            failed = score.failed,
            skipped = score.skipped,
            secs = score.elapsed_secs
        ),
    );
}
