//! The `caption-gemini describe` command: print what the plugin registers
//! with a host.

use caption_gemini_core::{caption_gemini_description, example_credentials_description};
use clap::{Args, ValueEnum};

/// Which descriptor to print.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum DescribeTarget {
    /// The Caption Gemini node
    #[default]
    Node,
    /// The example credential type
    Credential,
}

/// Arguments for the `describe` command.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Descriptor to print
    #[arg(value_enum, default_value = "node")]
    pub target: DescribeTarget,
}

/// Execute the describe command.
pub async fn execute(args: DescribeArgs) -> anyhow::Result<()> {
    let json = match args.target {
        DescribeTarget::Node => serde_json::to_string_pretty(&caption_gemini_description())?,
        DescribeTarget::Credential => {
            serde_json::to_string_pretty(&example_credentials_description())?
        }
    };
    println!("{json}");
    Ok(())
}
