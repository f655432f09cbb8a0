//! Gemini `generateContent` wire types.
//!
//! Request and response bodies mirror the REST API's camelCase JSON. The
//! helpers here are pure so that request construction and response decoding
//! can be tested without a network.

use crate::error::CaptionError;
use crate::types::{CaptionResult, OutputMode, SubtitleCue};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Media URLs the API can read directly instead of receiving inline bytes.
pub const FILES_API_PREFIX: &str = "https://generativelanguage.googleapis.com/v1beta/files/";

/// Whether the API can fetch this URL itself.
pub fn is_files_api_url(url: &str) -> bool {
    url.starts_with(FILES_API_PREFIX)
}

// --- Request types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

/// Base64-encoded media sent with the request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

impl GenerationConfig {
    /// JSON output constrained to the subtitle schema.
    pub fn subtitles() -> Self {
        Self {
            response_mime_type: "application/json".to_string(),
            response_schema: subtitle_schema(),
        }
    }
}

/// OpenAPI-style schema of `{ subtitles: [{ startTime, endTime, text }] }`.
pub fn subtitle_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "subtitles": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "startTime": { "type": "STRING" },
                        "endTime": { "type": "STRING" },
                        "text": { "type": "STRING" }
                    },
                    "required": ["startTime", "endTime", "text"]
                }
            }
        },
        "required": ["subtitles"]
    })
}

/// Assemble the request body: one user turn holding the prompt and the media.
pub fn build_request(prompt: &str, media: Part, mode: OutputMode) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                Part::Text {
                    text: prompt.to_string(),
                },
                media,
            ],
        }],
        generation_config: match mode {
            OutputMode::Structured => Some(GenerationConfig::subtitles()),
            OutputMode::FreeText => None,
        },
    }
}

// --- Response types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Human-readable message from an error response body.
///
/// Falls back to the raw body when it is not Google's error envelope.
pub fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Concatenated text of the first candidate.
pub fn candidate_text(response: GenerateContentResponse) -> Result<String, CaptionError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked ({r})"))
            .unwrap_or_else(|| "no candidates in response".to_string());
        return Err(CaptionError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!("finish reason {r}"))
            .unwrap_or_else(|| "candidate has no text".to_string());
        return Err(CaptionError::EmptyResponse(reason));
    }
    Ok(text)
}

#[derive(Deserialize)]
struct SubtitleTrack {
    subtitles: Vec<SubtitleCue>,
}

/// Turn the model's text into a result for the requested mode.
pub fn decode_result(text: String, mode: OutputMode) -> Result<CaptionResult, CaptionError> {
    match mode {
        OutputMode::Structured => serde_json::from_str::<SubtitleTrack>(&text)
            .map(|track| CaptionResult::Subtitles {
                subtitles: track.subtitles,
            })
            .map_err(|e| CaptionError::Schema(e.to_string())),
        OutputMode::FreeText => Ok(CaptionResult::Text { text }),
    }
}
