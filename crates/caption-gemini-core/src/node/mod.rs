//! The Caption Gemini node: host-facing descriptors and the item processor.

pub mod description;
mod processor;

pub use description::{
    caption_gemini_description, example_credentials_description, CredentialDescription,
    NodeDescription,
};
pub use processor::{BatchSummary, CaptionGeminiNode, ExecuteOptions};
