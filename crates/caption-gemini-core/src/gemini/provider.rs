//! Captioning provider trait and factory.
//!
//! The node builds a fresh provider for every item, bound to that item's API
//! key, through a [`ProviderFactory`]. Tests swap in mock factories; the real
//! one produces [`GeminiProvider`]s.

use super::client::GeminiProvider;
use crate::error::CaptionError;
use crate::types::{CaptionRequest, CaptionResult};
use async_trait::async_trait;

/// Gemini REST endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Trait that all captioning backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the node holds `Box<dyn CaptionProvider>`).
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Dispatch one request and return the decoded result.
    async fn generate(&self, request: &CaptionRequest) -> Result<CaptionResult, CaptionError>;
}

/// Builds a provider bound to one API key.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, api_key: &str) -> Box<dyn CaptionProvider>;
}

/// Factory for the Gemini REST provider.
#[derive(Debug, Clone)]
pub struct GeminiProviderFactory {
    endpoint: String,
}

impl GeminiProviderFactory {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for GeminiProviderFactory {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl ProviderFactory for GeminiProviderFactory {
    fn create(&self, api_key: &str) -> Box<dyn CaptionProvider> {
        Box::new(GeminiProvider::new(&self.endpoint, api_key))
    }
}
