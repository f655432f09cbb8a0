//! Core data types for the Caption Gemini node.
//!
//! Items flow in as [`InputItem`]s and come out as [`OutputItem`]s, one per
//! processed input, tied back to their origin by the pairing index.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// One unit of work handed to the node by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
    /// The item's JSON payload
    pub json: Value,
}

impl InputItem {
    pub fn new(json: Value) -> Self {
        Self { json }
    }
}

/// Links an output record to the input item it was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// A failure recorded in place of a result when continue-on-failure is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub message: String,
    pub item_index: usize,
}

/// One record of the node's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    /// The caption result, or the input item's JSON for error records
    pub json: Value,

    pub paired_item: PairedItem,

    /// Set only on error records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemFailure>,
}

impl OutputItem {
    /// A successful record for the item at `index`.
    pub fn success(result: &CaptionResult, index: usize) -> Self {
        Self {
            json: result.to_json(),
            paired_item: PairedItem { item: index },
            error: None,
        }
    }

    /// An error record carrying the originating item's JSON.
    pub fn failure(input: &InputItem, index: usize, message: impl Into<String>) -> Self {
        Self {
            json: input.json.clone(),
            paired_item: PairedItem { item: index },
            error: Some(ItemFailure {
                message: message.into(),
                item_index: index,
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Gemini models the node can target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeminiModel {
    #[default]
    #[serde(rename = "gemini-1.5-flash-latest")]
    Flash15,
    #[serde(rename = "gemini-1.5-pro-latest")]
    Pro15,
    #[serde(rename = "gemini-1.0-pro-latest")]
    Pro10,
}

impl GeminiModel {
    pub const ALL: [GeminiModel; 3] = [Self::Flash15, Self::Pro15, Self::Pro10];

    /// Model identifier used in API paths.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Flash15 => "gemini-1.5-flash-latest",
            Self::Pro15 => "gemini-1.5-pro-latest",
            Self::Pro10 => "gemini-1.0-pro-latest",
        }
    }

    /// Human-readable label for the parameter's option list.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Flash15 => "Gemini 1.5 Flash",
            Self::Pro15 => "Gemini 1.5 Pro",
            Self::Pro10 => "Gemini 1.0 Pro",
        }
    }
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GeminiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| format!("unknown model '{s}'"))
    }
}

/// Whether the response is schema-constrained or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Structured,
    FreeText,
}

/// Remote media attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub url: String,
    /// MIME type, forwarded as given
    pub content_type: String,
}

/// Everything needed to dispatch one captioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionRequest {
    pub prompt: String,
    pub media: MediaReference,
    pub model: GeminiModel,
    pub mode: OutputMode,
}

/// One subtitle cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleCue {
    pub start_time: String,
    pub end_time: String,
    pub text: String,
}

/// The caption produced for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaptionResult {
    /// Schema-constrained subtitle track
    Subtitles { subtitles: Vec<SubtitleCue> },
    /// Free-text generation
    Text { text: String },
}

impl CaptionResult {
    /// JSON shape placed in the output record.
    pub fn to_json(&self) -> Value {
        match self {
            CaptionResult::Subtitles { subtitles } => {
                let cues: Vec<Value> = subtitles
                    .iter()
                    .map(|cue| {
                        json!({
                            "startTime": cue.start_time,
                            "endTime": cue.end_time,
                            "text": cue.text,
                        })
                    })
                    .collect();
                json!({ "subtitles": cues })
            }
            CaptionResult::Text { text } => json!({ "text": text }),
        }
    }
}
