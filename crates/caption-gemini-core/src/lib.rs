//! Caption Gemini Core - a workflow node that captions media with Gemini.
//!
//! The node takes a batch of input items, resolves its parameters for each
//! item, sends the item's media URL to the Gemini API with either the built-in
//! subtitle prompt or a custom one, and returns one output record per item.
//!
//! # Flow
//!
//! ```text
//! Item → Resolve parameters → Build request → Gemini generateContent → Output record
//! ```
//!
//! Items are processed one after another. A failing item either aborts the
//! batch or, with continue-on-failure, becomes an error record paired to its
//! index.
//!
//! # Usage
//!
//! ```rust,ignore
//! use caption_gemini_core::{CaptionGeminiNode, ExecuteOptions, InputItem, JsonParameters};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let node = CaptionGeminiNode::default();
//!     let params = JsonParameters::from_value(json!({
//!         "geminiApiKey": "…",
//!         "mediaUrl": "={{ $json.url }}",
//!     }))?;
//!     let items = vec![InputItem::new(json!({"url": "https://example.com/clip.mp4"}))];
//!
//!     let outputs = node.execute(&items, &params, ExecuteOptions::default()).await?;
//!     println!("{}", serde_json::to_string_pretty(&outputs)?);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod gemini;
pub mod node;
pub mod output;
pub mod params;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{CaptionError, ConfigError, NodeError, NodeErrorKind, NodeResult};
pub use gemini::{CaptionProvider, GeminiProvider, GeminiProviderFactory, ProviderFactory};
pub use node::{
    caption_gemini_description, example_credentials_description, BatchSummary, CaptionGeminiNode,
    CredentialDescription, ExecuteOptions, NodeDescription,
};
pub use output::{OutputFormat, OutputWriter};
pub use params::{JsonParameters, NodeParameters, ParameterSource, PromptMode};
pub use types::{CaptionRequest, CaptionResult, GeminiModel, InputItem, OutputItem, SubtitleCue};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
