//! ls-mcp - list MCP servers configured on this machine.
//!
//! Scans the configuration files of known AI applications, reports each
//! declared server with its transport, version pinning and credential
//! exposure, and marks the ones currently running.

use clap::Parser;
use lsmcp_common::{OutputFormat, StructuredError};
use lsmcp_config::{load_settings, SettingsOptions};
use lsmcp_core::collect::{PsProvider, SnapshotOptions};
use lsmcp_core::exit_codes::ExitCode;
use lsmcp_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use lsmcp_core::output::render;
use lsmcp_core::scan::{run_scan, ScanEnv, ScanRequest};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tracing::{debug, error, info_span};

/// List MCP servers configured for AI applications on this machine
#[derive(Parser, Debug)]
#[command(name = "ls-mcp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scan only these files (repeatable or comma separated)
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    files: Vec<String>,

    /// Show applications without any configured server
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Search parent directories for project-local config files
    #[arg(long)]
    bubble: bool,

    /// Skip process correlation (status is reported as unknown)
    #[arg(long)]
    no_status: bool,

    /// Output format
    #[arg(long, short = 'f', default_value = "human")]
    format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long)]
    json: bool,

    /// Path to a settings.json file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Process listing timeout in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,

    /// Exit with code 2 when a high-risk credential is found
    #[arg(long)]
    strict: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log format on stderr
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }

    fn use_color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(LogLevel::from_verbosity(cli.verbose, cli.quiet), cli.log_format);
    init_logging(&log_config);

    let run_id = generate_run_id();
    let span = info_span!("ls_mcp", run_id = %run_id);
    let _guard = span.enter();

    let exit_code = run(&cli, &run_id);
    debug!(exit_code = %exit_code, "Exiting");
    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli, run_id: &str) -> ExitCode {
    let settings = match load_settings(&SettingsOptions {
        settings_path: cli.settings.clone(),
        config_dir: None,
    }) {
        Ok(settings) => settings,
        Err(e) => return fail(cli, run_id, &e.into()),
    };

    let env = match ScanEnv::detect() {
        Ok(env) => env,
        Err(e) => return fail(cli, run_id, &e),
    };

    let timeout_ms = cli.timeout_ms.unwrap_or(settings.settings.process_timeout_ms);
    let provider = PsProvider::new(SnapshotOptions::with_timeout_ms(timeout_ms));
    let request = ScanRequest {
        files: cli.files.clone(),
        show_all: cli.all,
        bubbling: cli.bubble,
        probe_status: !cli.no_status,
    };

    let report = match run_scan(&request, &settings, &env, &provider, run_id) {
        Ok(report) => report,
        Err(e) => return fail(cli, run_id, &e),
    };

    let text = match render(&report, cli.output_format(), cli.use_color()) {
        Ok(text) => text,
        Err(e) => return fail(cli, run_id, &e),
    };
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            return fail(cli, run_id, &e.into());
        }
    }

    if report.summary.files_found == 0 {
        ExitCode::NoConfigFound
    } else if cli.strict && report.summary.has_high_risk() {
        ExitCode::HighRiskFound
    } else {
        ExitCode::Clean
    }
}

/// Report a fatal error. JSON consumers get a structured error on stdout
/// in place of the report; the human explanation always goes to stderr.
fn fail(cli: &Cli, run_id: &str, err: &lsmcp_common::Error) -> ExitCode {
    error!(code = err.code(), error = %err, "Scan failed");
    if cli.output_format() == OutputFormat::Json {
        let structured = StructuredError::from(err).with_context("run_id", run_id);
        println!("{}", structured.to_json_pretty());
    }
    eprintln!("{}", err.to_human());
    ExitCode::for_error(err)
}
