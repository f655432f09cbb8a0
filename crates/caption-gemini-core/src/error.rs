//! Error types for the Caption Gemini node.
//!
//! Errors are organized by layer: the captioning provider reports
//! [`CaptionError`], the node wraps everything it raises in [`NodeError`]
//! (which carries the index of the item that failed once the batch aborts),
//! and configuration loading has its own [`ConfigError`].

use std::fmt;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures of a single captioning call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptionError {
    /// The API answered with a non-success HTTP status
    #[error("Gemini HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (DNS, connect, TLS, body read)
    #[error("Gemini request failed: {0}")]
    Request(String),

    /// The media could not be downloaded for inlining
    #[error("Failed to fetch media from {url}: {message}")]
    MediaFetch { url: String, message: String },

    /// The API answered but produced no content
    #[error("Gemini returned no content: {0}")]
    EmptyResponse(String),

    /// The structured response did not match the subtitle schema
    #[error("Response does not match the subtitle schema: {0}")]
    Schema(String),
}

/// What went wrong while the node handled an item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeErrorKind {
    /// The captioning call failed
    #[error(transparent)]
    Caption(#[from] CaptionError),

    /// A parameter resolved to a value of the wrong shape
    #[error("Invalid value for parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// The host could not evaluate a parameter expression
    #[error("Expression evaluation failed: {0}")]
    Expression(String),
}

/// Node operation error, optionally annotated with the failing item's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeError {
    pub kind: NodeErrorKind,
    pub item_index: Option<usize>,
}

impl NodeError {
    pub fn new(kind: impl Into<NodeErrorKind>) -> Self {
        Self {
            kind: kind.into(),
            item_index: None,
        }
    }

    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::InvalidParameter {
            name: name.into(),
            message: message.into(),
        })
    }

    pub fn expression(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Expression(message.into()))
    }

    /// Attach the failing item's index, replacing any index set by an
    /// earlier layer.
    pub fn with_item_index(mut self, index: usize) -> Self {
        self.item_index = Some(index);
        self
    }

    /// The message without the item context, as shown in error records.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item_index {
            Some(index) => write!(f, "{} [item {index}]", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for NodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            NodeErrorKind::Caption(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CaptionError> for NodeError {
    fn from(err: CaptionError) -> Self {
        Self::new(err)
    }
}

/// Convenience type alias for node-level results.
pub type NodeResult<T> = std::result::Result<T, NodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_index_is_set() {
        let err = NodeError::from(CaptionError::Request("connection refused".into()));
        let err = err.with_item_index(3);
        assert_eq!(err.item_index, Some(3));
        assert!(err.to_string().ends_with("[item 3]"));
    }

    #[test]
    fn test_item_index_replaces_existing_one() {
        let err = NodeError::expression("bad reference").with_item_index(1);
        let err = err.with_item_index(4);
        assert_eq!(err.item_index, Some(4));
        assert!(err.to_string().ends_with("[item 4]"));
    }

    #[test]
    fn test_message_omits_item_context() {
        let err = NodeError::from(CaptionError::Api {
            status: 400,
            message: "API key not valid".into(),
        })
        .with_item_index(0);
        assert_eq!(err.message(), "Gemini HTTP 400: API key not valid");
    }

    #[test]
    fn test_source_exposes_caption_error() {
        use std::error::Error as _;
        let err = NodeError::from(CaptionError::EmptyResponse("SAFETY".into()));
        assert!(err.source().is_some());
        assert!(NodeError::expression("x").source().is_none());
    }
}
