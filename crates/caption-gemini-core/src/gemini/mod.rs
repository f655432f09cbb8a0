//! Gemini integration for media captioning.
//!
//! Provides the provider abstraction the node dispatches through, the REST
//! client that implements it, and the `generateContent` wire types.

pub(crate) mod client;
pub(crate) mod provider;
pub(crate) mod wire;

pub use client::GeminiProvider;
pub use provider::{CaptionProvider, GeminiProviderFactory, ProviderFactory, DEFAULT_ENDPOINT};
