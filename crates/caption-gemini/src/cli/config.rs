//! The `caption-gemini config` command.
//!
//! Every subcommand acts on the file given with `--config` when there is one,
//! and on the platform default location otherwise.

use anyhow::Context;
use caption_gemini_core::Config;
use clap::{Args, Subcommand};
use std::path::Path;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the configuration the node runs with, defaults filled in
    Show,

    /// Print the config file location and whether it exists
    Path,

    /// Write a config file holding the defaults
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check that the config file parses and holds valid values
    Validate,
}

/// Execute the config command against `explicit` or the default location.
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    explicit: Option<&Path>,
) -> anyhow::Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);

    match args.command {
        ConfigCommand::Show => print!("{}", config.to_toml()?),
        ConfigCommand::Path => {
            let state = if path.exists() { "" } else { " (not created yet)" };
            println!("{}{state}", path.display());
        }
        ConfigCommand::Init { force } => {
            init_at(&path, force)?;
            println!("Configuration initialized at: {}", path.display());
        }
        ConfigCommand::Validate => {
            let checked = validate_at(&path)?;
            println!(
                "{} is valid (endpoint {}, output {})",
                path.display(),
                checked.gemini.endpoint,
                checked.output.format
            );
        }
    }
    Ok(())
}

/// Write the default configuration to `path`, creating parent directories.
fn init_at(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, Config::default().to_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Config file created at: {}", path.display());
    Ok(())
}

/// Load `path` strictly; a missing file is an error here, not a default.
fn validate_at(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        anyhow::bail!("No config file at {}", path.display());
    }
    Config::load_from(path).with_context(|| format!("{} is not a valid config", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_loadable_defaults_in_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_at(&path, false).unwrap();
        let loaded = validate_at(&path).unwrap();
        assert_eq!(loaded.gemini.endpoint, Config::default().gemini.endpoint);
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[execution]\ncontinue_on_fail = true\n").unwrap();

        let err = init_at(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert!(Config::load_from(&path).unwrap().execution.continue_on_fail);

        init_at(&path, true).unwrap();
        assert!(!Config::load_from(&path).unwrap().execution.continue_on_fail);
    }

    #[test]
    fn validate_reports_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(validate_at(&path).is_err());

        std::fs::write(&path, "[gemini]\nendpoint = \"ftp://example.com\"\n").unwrap();
        let err = validate_at(&path).unwrap_err();
        assert!(err.to_string().contains("not a valid config"));
    }
}
