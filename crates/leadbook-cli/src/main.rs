// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod report;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use leadbook_app::{Console, LeadId, LeadStore};
use leadbook_testkit::MemoryStore;
use leadbook_tui::TuiOptions;
use runtime::Backend;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `leadbook --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    logging::init_logging(config.log_file().as_deref(), config.log_level())?;

    let backend = if options.demo {
        Backend::Demo(MemoryStore::demo())
    } else {
        let base_url = options
            .base_url
            .as_deref()
            .unwrap_or_else(|| config.base_url());
        let client = leadbook_api::Client::new(
            base_url,
            config.timeout()?,
            config.agent_timeout()?,
        )
        .with_context(|| {
            format!(
                "invalid [api] config in {}; fix base_url/timeout/agent_timeout values",
                options.config_path.display()
            )
        })?;
        Backend::Http(client)
    };
    info!(backend = %backend.label(), "starting");

    if options.check_only {
        let count = backend.list_leads()?.len();
        println!("ok: {} answered with {count} leads", backend.label());
        return Ok(());
    }

    if options.list {
        print!("{}", report::lead_table(&backend.list_leads()?));
        return Ok(());
    }

    if let Some(id) = options.show {
        let lead = backend
            .get_lead(id)
            .with_context(|| format!("fetch lead {id}"))?;
        print!("{}", report::lead_detail(&lead));
        return Ok(());
    }

    let tui_options = TuiOptions {
        backend_label: backend.label(),
        show_chat: config.show_chat(),
    };
    leadbook_tui::run_app(Console::default(), backend, tui_options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    base_url: Option<String>,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    list: bool,
    show: Option<LeadId>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        base_url: None,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        list: false,
        show: None,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--base-url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--base-url requires a URL"))?;
                options.base_url = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--list" => {
                options.list = true;
            }
            "--show" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--show requires a lead id"))?;
                let id = value.as_ref().trim().parse::<i64>().map_err(|_| {
                    anyhow!("--show expects a numeric lead id, got {:?}", value.as_ref())
                })?;
                options.show = Some(LeadId::new(id));
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("leadbook");
    println!("  --config <path>          Use a specific config path");
    println!("  --base-url <url>         Override [api].base_url");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Use seeded in-memory leads and a keyword agent");
    println!("  --check                  Validate config and reach the backend");
    println!("  --list                   Print all leads and exit");
    println!("  --show <id>              Print one lead and exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use leadbook_app::LeadId;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/leadbook-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                base_url: None,
                print_config_path: false,
                print_example: false,
                demo: false,
                check_only: false,
                list: false,
                show: None,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_and_base_url_overrides() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--config",
                "/custom/config.toml",
                "--base-url",
                "http://crm.internal:9000",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.base_url.as_deref(), Some("http://crm.internal:9000"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--base-url"], default_options_path())
            .expect_err("missing url should fail");
        assert!(error.to_string().contains("--base-url requires a URL"));

        let error = parse_cli_args(vec!["--show"], default_options_path())
            .expect_err("missing id should fail");
        assert!(error.to_string().contains("--show requires a lead id"));
    }

    #[test]
    fn parse_cli_args_rejects_non_numeric_show_id() {
        let error = parse_cli_args(vec!["--show", "acme"], default_options_path())
            .expect_err("non-numeric id should fail");
        assert!(error.to_string().contains("numeric lead id"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.demo);
        assert!(!options.list);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_demo_list_and_show() -> Result<()> {
        let options = parse_cli_args(
            vec!["--demo", "--list", "--show", "12"],
            default_options_path(),
        )?;
        assert!(options.demo);
        assert!(options.list);
        assert_eq!(options.show, Some(LeadId::new(12)));
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
