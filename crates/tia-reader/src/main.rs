//! CLI entrypoint for the TIA Portal reader.

mod cli;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tia_portal::{ExportAutomation, ExportSettings};
use tia_reader::{BackendKind, McpAdapter, ReaderConfig, Session, ToolReply, Toolbox};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use cli::{Cli, Command};

fn main() {
    if let Err(err) = run() {
        eprintln!("tia-reader error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let (config, config_error) = match ReaderConfig::load(&cwd, cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) => (ReaderConfig::default(), Some(err)),
    };

    let log_file = cli.log_file.clone().or_else(|| config.logging.file.clone());
    init_tracing(&config, cli.verbose, log_file.as_deref())?;
    if let Some(err) = config_error {
        warn!("{err}; using default configuration");
    }

    let session = Session::new(automation(&config));
    let toolbox = Toolbox::from_config(&config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting TIA Portal Read-Only MCP Server");
            let mut adapter = McpAdapter::new(session, toolbox);
            adapter.run_stdio().context("MCP stdio loop failed")?;
        }
        Command::Inspect { project } => {
            let mut session = session;
            let path = project.to_string_lossy();
            let opened = ToolReply::from(toolbox.open_project(&mut session, &path));
            if opened.is_error {
                anyhow::bail!("{}", opened.text);
            }
            let structure = ToolReply::from(toolbox.project_structure(&session));
            println!("{}", structure.text);
            if structure.is_error {
                std::process::exit(2);
            }
        }
    }
    Ok(())
}

fn automation(config: &ReaderConfig) -> ExportAutomation {
    match config.backend.kind {
        BackendKind::Export => ExportAutomation::new(ExportSettings {
            latency: config.backend.latency,
        }),
    }
}

fn init_tracing(config: &ReaderConfig, verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let directives = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter()),
        )
        .with(file_layer)
        .init();
    Ok(())
}
