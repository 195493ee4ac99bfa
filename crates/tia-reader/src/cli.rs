//! CLI definitions for tia-reader.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "tia-reader",
    version,
    about = "Read-only MCP server for TIA Portal projects",
    after_help = "Examples:\n  tia-reader                               # serve MCP on stdio\n  tia-reader --verbose serve\n  tia-reader inspect --project ./Plant.ap17"
)]
pub struct Cli {
    /// Configuration file (defaults to ./tia-reader.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Also append log events to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve MCP requests on stdin/stdout (default).
    Serve,
    /// Open a project and print its structure.
    Inspect {
        /// Project file or snapshot path.
        #[arg(long)]
        project: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["tia-reader"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn inspect_takes_project_and_global_flags() {
        let cli = Cli::try_parse_from([
            "tia-reader",
            "inspect",
            "--project",
            "Plant.json",
            "--verbose",
            "--config",
            "alt.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        match cli.command {
            Some(Command::Inspect { project }) => assert_eq!(project, PathBuf::from("Plant.json")),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
