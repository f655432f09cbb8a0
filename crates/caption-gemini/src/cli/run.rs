//! The `caption-gemini run` command: act as the host for one execution.
//!
//! Loads the input items and the node parameters, runs the node and writes
//! the output records. When the batch aborts, the records produced before the
//! failing item are still written before the error is reported. When a
//! streamed record cannot be written, the batch stops there.

use anyhow::Context;
use caption_gemini_core::{
    caption_gemini_description, BatchSummary, CaptionGeminiNode, Config, ExecuteOptions,
    InputItem, JsonParameters, OutputFormat as CoreOutputFormat, OutputWriter,
};
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use super::expand_path;

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// One JSON array of records
    Json,
    /// One JSON record per line, written as items complete
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input items: a JSON array of objects, or one JSON object per line
    #[arg(required = true)]
    pub input: PathBuf,

    /// JSON object of node parameters; string values may reference item
    /// fields with `={{ $json.field }}`
    #[arg(short = 'P', long)]
    pub params: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Record failing items as error records instead of aborting
    #[arg(long)]
    pub continue_on_fail: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: &Config) -> anyhow::Result<()> {
    let items = load_items(&expand_path(&args.input))?;
    let params = load_params(&expand_path(&args.params))?;

    let format = match args.format {
        Some(format) => format.into(),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json),
    };
    let options = ExecuteOptions {
        continue_on_fail: args.continue_on_fail || config.execution.continue_on_fail,
    };

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(expand_path(path))?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, format, args.pretty || config.output.pretty);

    tracing::info!(
        "Running Caption Gemini over {} item(s) (continue on fail: {})",
        items.len(),
        options.continue_on_fail
    );
    let node = CaptionGeminiNode::with_endpoint(&config.gemini.endpoint);
    let summary = write_records(&node, &items, &params, options, format, &mut writer).await?;

    if let Some(ref path) = args.output {
        tracing::info!("{} record(s) written to {:?}", writer.items_written(), path);
    }
    tracing::debug!(
        "Finished: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed
    );
    Ok(())
}

/// Run the node and write its records.
///
/// JSON Lines records are written as they arrive and the first failed write
/// stops the batch, so no further items are sent to the API. JSON records are
/// collected and written as one array once the node returns. Either way the
/// records produced before an aborting item are written before the error is
/// reported.
async fn write_records<W: Write>(
    node: &CaptionGeminiNode,
    items: &[InputItem],
    params: &JsonParameters,
    options: ExecuteOptions,
    format: CoreOutputFormat,
    writer: &mut OutputWriter<W>,
) -> anyhow::Result<BatchSummary> {
    let mut write_error: Option<std::io::Error> = None;
    let mut collected = Vec::new();
    let result = node
        .execute_with(items, params, options, |record| {
            if !format.is_streaming() {
                collected.push(record);
                return ControlFlow::Continue(());
            }
            match writer.write(&record) {
                Ok(()) => ControlFlow::Continue(()),
                Err(e) => {
                    write_error = Some(e);
                    ControlFlow::Break(())
                }
            }
        })
        .await;

    if let Some(e) = write_error {
        return Err(e).context("Failed to write output record");
    }
    if !format.is_streaming() {
        writer.write_all(&collected)?;
    }
    writer.flush()?;

    result.context("Caption Gemini execution aborted")
}

/// Read input items from a file.
fn load_items(path: &Path) -> anyhow::Result<Vec<InputItem>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input items from {path:?}"))?;
    parse_items(&text).with_context(|| format!("Invalid input items in {path:?}"))
}

/// Parse items from a JSON array or from JSON Lines.
fn parse_items(text: &str) -> anyhow::Result<Vec<InputItem>> {
    let values: Vec<serde_json::Value> = if text.trim_start().starts_with('[') {
        serde_json::from_str(text)?
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str::<serde_json::Value>(line)
                    .with_context(|| format!("line {}", n + 1))
            })
            .collect::<anyhow::Result<_>>()?
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, json)| {
            if json.is_object() {
                Ok(InputItem::new(json))
            } else {
                anyhow::bail!("item {index} is not a JSON object")
            }
        })
        .collect()
}

/// Read node parameters and warn about any that the node will ignore.
fn load_params(path: &Path) -> anyhow::Result<JsonParameters> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters from {path:?}"))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid parameters JSON in {path:?}"))?;

    if let Some(values) = value.as_object() {
        for name in caption_gemini_description().ignored_parameters(values) {
            tracing::warn!("Parameter '{name}' is not used with the current settings");
        }
    }
    Ok(JsonParameters::from_value(value)?)
}
