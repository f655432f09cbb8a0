//! Gemini provider using the `generateContent` REST API.
//!
//! Sends the prompt plus the media as a single user turn. Media hosted by the
//! Gemini Files API is referenced by URI; anything else is downloaded first
//! and sent inline as base64.

use super::provider::CaptionProvider;
use super::wire::{self, Blob, FileData, GenerateContentResponse, Part};
use crate::error::CaptionError;
use crate::types::{CaptionRequest, CaptionResult, MediaReference};
use async_trait::async_trait;
use base64::Engine;
use std::time::Instant;

/// Largest request the API accepts with inline media (20 MB).
const INLINE_DATA_LIMIT: usize = 20 * 1024 * 1024;

/// Gemini provider bound to one API key.
pub struct GeminiProvider {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.endpoint)
    }

    /// Turn the media reference into a request part.
    async fn media_part(&self, media: &MediaReference) -> Result<Part, CaptionError> {
        if wire::is_files_api_url(&media.url) {
            return Ok(Part::FileData {
                file_data: FileData {
                    mime_type: media.content_type.clone(),
                    file_uri: media.url.clone(),
                },
            });
        }

        let fetch_err = |message: String| CaptionError::MediaFetch {
            url: media.url.clone(),
            message,
        };

        let resp = self
            .client
            .get(&media.url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {status}")));
        }

        let bytes = resp.bytes().await.map_err(|e| fetch_err(e.to_string()))?;
        let data = base64::engine::general_purpose::STANDARD.encode(&bytes);
        if exceeds_inline_limit(data.len()) {
            tracing::warn!(
                "Inline media from {} is {} bytes after base64 encoding, over the {} byte \
                 inline limit; Gemini will likely reject the request",
                media.url,
                data.len(),
                INLINE_DATA_LIMIT
            );
        } else {
            tracing::debug!("Fetched {} bytes of media from {}", bytes.len(), media.url);
        }

        Ok(Part::InlineData {
            inline_data: Blob {
                mime_type: media.content_type.clone(),
                data,
            },
        })
    }
}

fn exceeds_inline_limit(encoded_len: usize) -> bool {
    encoded_len > INLINE_DATA_LIMIT
}

#[async_trait]
impl CaptionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &CaptionRequest) -> Result<CaptionResult, CaptionError> {
        let start = Instant::now();

        let media = self.media_part(&request.media).await?;
        let body = wire::build_request(&request.prompt, media, request.mode);

        let resp = self
            .client
            .post(self.generate_url(request.model.id()))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CaptionError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CaptionError::Api {
                status: status.as_u16(),
                message: wire::api_error_message(&text),
            });
        }

        let response: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| CaptionError::Request(format!("Failed to parse Gemini response: {e}")))?;

        let text = wire::candidate_text(response)?;
        tracing::debug!(
            model = request.model.id(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Gemini response received"
        );

        wire::decode_result(text, request.mode)
    }
}
