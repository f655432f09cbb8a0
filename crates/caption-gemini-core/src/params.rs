//! Node parameters and their per-item resolution.
//!
//! The host exposes parameters through a string-keyed accessor that may yield
//! a different value for every item. [`NodeParameters::resolve`] reads them
//! once at the start of an item and turns them into a typed struct, so the
//! rest of the node never looks anything up by name.

use crate::error::{NodeError, NodeResult};
use crate::types::{CaptionRequest, GeminiModel, InputItem, MediaReference, OutputMode};
use serde_json::{Map, Value};

/// Parameter names as declared in the node description.
pub mod names {
    pub const GEMINI_API_KEY: &str = "geminiApiKey";
    pub const MEDIA_URL: &str = "mediaUrl";
    pub const MODEL: &str = "model";
    pub const CONTENT_TYPE: &str = "contentType";
    pub const USE_CUSTOM_PROMPT: &str = "useCustomPrompt";
    pub const CUSTOM_PROMPT: &str = "customPrompt";
    pub const USE_STRUCTURED_OUTPUT: &str = "useStructuredOutput";
}

/// Content type assumed when none is configured.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// Built-in prompt: SRT-style subtitles in the video's original language,
/// faithful to the spoken words.
pub const DEFAULT_PROMPT: &str = "Gere o subtitle para esse video, escreva o subtitle em formato de SRT, retorna isso no idioma original do video. seja fiel nas palavras do video.";

/// Host-provided parameter accessor.
///
/// Returns `Ok(None)` when the parameter is not set for this item, letting
/// the caller fall back to its default.
pub trait ParameterSource {
    fn get(&self, name: &str, item_index: usize, item: &InputItem) -> NodeResult<Option<Value>>;
}

/// Prompt settings. Custom text and the structured toggle only exist when a
/// custom prompt is in use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PromptMode {
    #[default]
    Default,
    Custom { text: String, structured: bool },
}

impl PromptMode {
    pub fn prompt(&self) -> &str {
        match self {
            PromptMode::Default => DEFAULT_PROMPT,
            PromptMode::Custom { text, .. } => text,
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        match self {
            PromptMode::Default => OutputMode::Structured,
            PromptMode::Custom {
                structured: true, ..
            } => OutputMode::Structured,
            PromptMode::Custom {
                structured: false, ..
            } => OutputMode::FreeText,
        }
    }
}

/// Typed parameters for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeParameters {
    pub api_key: String,
    pub media_url: String,
    pub model: GeminiModel,
    pub content_type: String,
    pub prompt: PromptMode,
}

impl Default for NodeParameters {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            media_url: String::new(),
            model: GeminiModel::default(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            prompt: PromptMode::Default,
        }
    }
}

impl NodeParameters {
    /// Resolve all parameters for the item at `item_index`.
    ///
    /// Missing values take their defaults; an absent API key or URL becomes
    /// an empty string and is left for the API to reject.
    pub fn resolve(
        source: &dyn ParameterSource,
        item_index: usize,
        item: &InputItem,
    ) -> NodeResult<Self> {
        let media_url = string_param(source, names::MEDIA_URL, item_index, item, "")?;
        let api_key = string_param(source, names::GEMINI_API_KEY, item_index, item, "")?;

        let model = match source.get(names::MODEL, item_index, item)? {
            None | Some(Value::Null) => GeminiModel::default(),
            Some(Value::String(s)) => s
                .parse()
                .map_err(|e: String| NodeError::invalid_parameter(names::MODEL, e))?,
            Some(other) => {
                return Err(NodeError::invalid_parameter(
                    names::MODEL,
                    format!("expected a string, got {other}"),
                ))
            }
        };
        let content_type = string_param(
            source,
            names::CONTENT_TYPE,
            item_index,
            item,
            DEFAULT_CONTENT_TYPE,
        )?;

        let prompt = if bool_param(source, names::USE_CUSTOM_PROMPT, item_index, item, false)? {
            PromptMode::Custom {
                text: string_param(source, names::CUSTOM_PROMPT, item_index, item, "")?,
                structured: bool_param(
                    source,
                    names::USE_STRUCTURED_OUTPUT,
                    item_index,
                    item,
                    true,
                )?,
            }
        } else {
            PromptMode::Default
        };

        Ok(Self {
            api_key,
            media_url,
            model,
            content_type,
            prompt,
        })
    }

    /// Build the request dispatched for these parameters.
    pub fn to_request(&self) -> CaptionRequest {
        CaptionRequest {
            prompt: self.prompt.prompt().to_string(),
            media: MediaReference {
                url: self.media_url.clone(),
                content_type: self.content_type.clone(),
            },
            model: self.model,
            mode: self.prompt.output_mode(),
        }
    }
}

fn string_param(
    source: &dyn ParameterSource,
    name: &str,
    item_index: usize,
    item: &InputItem,
    default: &str,
) -> NodeResult<String> {
    match source.get(name, item_index, item)? {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s),
        // Expressions frequently resolve to numbers; the host stringifies them.
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(NodeError::invalid_parameter(
            name,
            format!("expected a string, got {other}"),
        )),
    }
}

fn bool_param(
    source: &dyn ParameterSource,
    name: &str,
    item_index: usize,
    item: &InputItem,
    default: bool,
) -> NodeResult<bool> {
    match source.get(name, item_index, item)? {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(b),
        Some(other) => Err(NodeError::invalid_parameter(
            name,
            format!("expected a boolean, got {other}"),
        )),
    }
}

/// Static parameter map with `$json` field references.
///
/// A string value of the form `={{ $json.field }}` (dotted paths allowed)
/// resolves to that field of the current item's JSON; every other value is
/// returned as is. Any other `={{ … }}` expression is rejected.
#[derive(Debug, Clone, Default)]
pub struct JsonParameters {
    values: Map<String, Value>,
}

impl JsonParameters {
    /// Build from a JSON object.
    pub fn from_value(value: Value) -> NodeResult<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(NodeError::invalid_parameter(
                "parameters",
                format!("expected a JSON object, got {other}"),
            )),
        }
    }
}

impl ParameterSource for JsonParameters {
    fn get(&self, name: &str, item_index: usize, item: &InputItem) -> NodeResult<Option<Value>> {
        let Some(value) = self.values.get(name) else {
            return Ok(None);
        };
        let Some(expr) = value.as_str().and_then(expression_body) else {
            return Ok(Some(value.clone()));
        };
        let Some(path) = expr.strip_prefix("$json.") else {
            return Err(NodeError::expression(format!(
                "unsupported expression '{expr}' in parameter '{name}'"
            ))
            .with_item_index(item_index));
        };

        let field = path
            .split('.')
            .try_fold(&item.json, |current, key| current.get(key));
        Ok(field.filter(|v| !v.is_null()).cloned())
    }
}

/// Inner text of a `={{ … }}` expression, trimmed.
fn expression_body(raw: &str) -> Option<&str> {
    raw.strip_prefix("={{")?
        .strip_suffix("}}")
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> JsonParameters {
        JsonParameters::from_value(value).unwrap()
    }

    fn empty_item() -> InputItem {
        InputItem::new(json!({}))
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let resolved = NodeParameters::resolve(&params(json!({})), 0, &empty_item()).unwrap();
        assert_eq!(resolved, NodeParameters::default());
        assert_eq!(resolved.content_type, "video/mp4");
        assert_eq!(resolved.model, GeminiModel::Flash15);
    }

    #[test]
    fn test_default_prompt_forces_structured_output() {
        let source = params(json!({
            "mediaUrl": "https://x/a.mp4",
            "geminiApiKey": "k",
            "useCustomPrompt": false,
            "customPrompt": "ignored",
            "useStructuredOutput": false,
        }));
        let resolved = NodeParameters::resolve(&source, 0, &empty_item()).unwrap();
        assert_eq!(resolved.prompt, PromptMode::Default);

        let request = resolved.to_request();
        assert_eq!(request.prompt, DEFAULT_PROMPT);
        assert_eq!(request.mode, OutputMode::Structured);
        assert_eq!(request.media.url, "https://x/a.mp4");
        assert_eq!(request.model, GeminiModel::Flash15);
    }

    #[test]
    fn test_custom_prompt_free_text() {
        let source = params(json!({
            "useCustomPrompt": true,
            "customPrompt": "Describe the scene",
            "useStructuredOutput": false,
            "model": "gemini-1.5-pro-latest",
            "contentType": "video/webm",
        }));
        let request = NodeParameters::resolve(&source, 0, &empty_item())
            .unwrap()
            .to_request();
        assert_eq!(request.prompt, "Describe the scene");
        assert_eq!(request.mode, OutputMode::FreeText);
        assert_eq!(request.model, GeminiModel::Pro15);
        assert_eq!(request.media.content_type, "video/webm");
    }

    #[test]
    fn test_custom_prompt_defaults_to_structured() {
        let source = params(json!({"useCustomPrompt": true, "customPrompt": "Transcribe"}));
        let resolved = NodeParameters::resolve(&source, 0, &empty_item()).unwrap();
        assert_eq!(
            resolved.prompt,
            PromptMode::Custom {
                text: "Transcribe".into(),
                structured: true
            }
        );
        assert_eq!(resolved.prompt.output_mode(), OutputMode::Structured);
    }

    #[test]
    fn test_unknown_model_is_rejected_without_item_index() {
        let source = params(json!({"model": "gemini-ultra"}));
        let err = NodeParameters::resolve(&source, 2, &empty_item()).unwrap_err();
        assert!(err.to_string().contains("model"));
        assert_eq!(err.item_index, None);
    }

    #[test]
    fn test_wrong_type_for_bool_is_rejected() {
        let source = params(json!({"useCustomPrompt": "yes"}));
        let err = NodeParameters::resolve(&source, 0, &empty_item()).unwrap_err();
        assert!(err.to_string().contains("useCustomPrompt"));
    }

    #[test]
    fn test_json_reference_resolves_per_item() {
        let source = params(json!({"mediaUrl": "={{ $json.video.url }}"}));
        let first = InputItem::new(json!({"video": {"url": "https://x/1.mp4"}}));
        let second = InputItem::new(json!({"video": {"url": "https://x/2.mp4"}}));

        let a = NodeParameters::resolve(&source, 0, &first).unwrap();
        let b = NodeParameters::resolve(&source, 1, &second).unwrap();
        assert_eq!(a.media_url, "https://x/1.mp4");
        assert_eq!(b.media_url, "https://x/2.mp4");
    }

    #[test]
    fn test_missing_json_reference_falls_back_to_default() {
        let source = params(json!({"contentType": "={{$json.mime}}"}));
        let resolved = NodeParameters::resolve(&source, 0, &empty_item()).unwrap();
        assert_eq!(resolved.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_unsupported_expression_carries_item_index() {
        let source = params(json!({"geminiApiKey": "={{ $env.KEY }}"}));
        let err = NodeParameters::resolve(&source, 5, &empty_item()).unwrap_err();
        assert_eq!(err.item_index, Some(5));
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(JsonParameters::from_value(json!([1, 2])).is_err());
    }
}
