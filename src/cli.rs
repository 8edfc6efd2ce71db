// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::{commands, infra::t};

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
fn pre_parse_language() -> Option<String> {
    language_from_args(env::args())
}

/// Finds the value of `--lang <VALUE>` or `--lang=<VALUE>` in `args`.
/// The first occurrence wins.
pub fn language_from_args<I, S>(args: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        if arg == "--lang" {
            return args.next().map(|value| value.as_ref().to_string());
        }
        if let Some(value) = arg.strip_prefix("--lang=") {
            return Some(value.to_string());
        }
    }
    None
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("module-batch-tester")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd_run_about", locale = locale).to_string())
                .arg(
                    Arg::new("module-config")
                        .help(t!("arg_module_config", locale = locale).to_string())
                        .value_name("MODULE_CONFIG")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("harness-config")
                        .help(t!("arg_harness_config", locale = locale).to_string())
                        .value_name("HARNESS_CONFIG")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("base-path")
                        .help(t!("arg_base_path", locale = locale).to_string())
                        .value_name("BASE_PATH")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("settings")
                        .short('s')
                        .long("settings")
                        .help(t!("arg_settings", locale = locale).to_string())
                        .value_name("SETTINGS")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("resume")
                        .long("resume")
                        .help(t!("arg_resume", locale = locale).to_string())
                        .value_name("REPORT")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .help(t!("arg_quiet", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("dir")
                        .help(t!("arg_init_dir", locale = locale).to_string())
                        .value_name("DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("arg_force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn run_args(matches: &ArgMatches, lang_overridden: bool) -> commands::run::RunArgs {
    let path = |id: &str| matches.get_one::<PathBuf>(id).cloned();
    commands::run::RunArgs {
        // Required or defaulted, so always present.
        module_config: path("module-config").unwrap_or_default(),
        harness_config: path("harness-config").unwrap_or_default(),
        base_path: path("base-path").unwrap_or_else(|| PathBuf::from(".")),
        settings: path("settings"),
        resume: path("resume"),
        quiet: matches.get_flag("quiet"),
        lang_overridden,
    }
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let explicit_language = pre_parse_language();
    let language = explicit_language.clone().unwrap_or_else(crate::detect_locale);
    rust_i18n::set_locale(&language);

    let matches = build_cli(&language).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            commands::run::execute(run_args(run_matches, explicit_language.is_some())).await?;
        }
        Some(("init", init_matches)) => {
            let dir = init_matches
                .get_one::<PathBuf>("dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("."));
            commands::init::execute(&dir, init_matches.get_flag("force"))?;
        }
        _ => {
            // subcommand_required makes clap print help and exit before this.
        }
    }
    Ok(())
}
