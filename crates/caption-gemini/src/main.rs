//! Caption Gemini CLI - run the Caption Gemini node locally.
//!
//! The binary stands in for the workflow host: it feeds a batch of items and
//! a parameter set to the node, applies the continue-on-failure setting, and
//! writes the resulting records.
//!
//! # Usage
//!
//! ```bash
//! # Caption every item, reading each item's media URL from its `url` field
//! caption-gemini run items.json --params params.json
//!
//! # Keep going past failures and stream JSON Lines to a file
//! caption-gemini run items.jsonl -P params.json --continue-on-fail -f jsonl -o out.jsonl
//!
//! # Print the node description the plugin registers
//! caption-gemini describe node
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Caption Gemini - caption media with the Gemini API, one item at a time.
#[derive(Parser, Debug)]
#[command(name = "caption-gemini")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the node over a batch of input items
    Run(cli::run::RunArgs),

    /// Print the node or credential description
    Describe(cli::describe::DescribeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config_path = cli.config.as_deref().map(cli::expand_path);
    let config = match &config_path {
        Some(path) => caption_gemini_core::Config::load_from(path)?,
        None => match caption_gemini_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `caption-gemini config path`."
                );
                caption_gemini_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Caption Gemini v{}", caption_gemini_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, &config).await,
        Commands::Describe(args) => cli::describe::execute(args).await,
        Commands::Config(args) => {
            cli::config::execute(args, &config, config_path.as_deref()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_flags() {
        let parsed = Cli::try_parse_from([
            "caption-gemini",
            "run",
            "items.json",
            "--params",
            "params.json",
            "--continue-on-fail",
            "-f",
            "jsonl",
        ])
        .unwrap();
        match parsed.command {
            Commands::Run(args) => {
                assert!(args.continue_on_fail);
                assert!(matches!(args.format, Some(cli::run::OutputFormat::Jsonl)));
                assert!(args.output.is_none());
                assert!(!args.pretty);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn run_requires_params() {
        assert!(Cli::try_parse_from(["caption-gemini", "run", "items.json"]).is_err());
    }

    #[test]
    fn describe_defaults_to_node() {
        let parsed = Cli::try_parse_from(["caption-gemini", "describe"]).unwrap();
        match parsed.command {
            Commands::Describe(args) => {
                assert!(matches!(args.target, cli::describe::DescribeTarget::Node))
            }
            other => panic!("expected describe, got {other:?}"),
        }
    }
}
