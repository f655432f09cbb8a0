//! Node and credential descriptors registered with the host.
//!
//! These serialize to the host's camelCase description format: display
//! metadata, connections, and the declared parameters with their types,
//! defaults and visibility conditions.

use crate::params::{names, DEFAULT_CONTENT_TYPE};
use crate::types::GeminiModel;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Connection kinds a node can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Main,
}

/// Parameter widget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Boolean,
    Options,
}

/// One entry of an `options` parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyOption {
    pub name: String,
    pub value: Value,
}

/// Conditions under which a parameter is shown: every listed parameter must
/// currently hold one of the listed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub show: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeOptions {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub password: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    pub default: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PropertyOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
}

impl NodeProperty {
    fn new(display_name: &str, name: &str, kind: PropertyType, default: Value) -> Self {
        Self {
            display_name: display_name.to_string(),
            name: name.to_string(),
            kind,
            required: false,
            default,
            placeholder: None,
            description: None,
            options: Vec::new(),
            type_options: None,
            display_options: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    fn type_options(mut self, options: TypeOptions) -> Self {
        self.type_options = Some(options);
        self
    }

    fn shown_when(mut self, parameter: &str, value: Value) -> Self {
        self.display_options
            .get_or_insert_with(DisplayOptions::default)
            .show
            .insert(parameter.to_string(), vec![value]);
        self
    }

    /// Whether the parameter is visible given the current parameter values.
    ///
    /// Parameters that are not set count as holding their declared default.
    pub fn is_shown(&self, description: &NodeDescription, values: &Map<String, Value>) -> bool {
        let Some(display) = &self.display_options else {
            return true;
        };
        display.show.iter().all(|(name, allowed)| {
            let current = values
                .get(name)
                .cloned()
                .or_else(|| description.property(name).map(|p| p.default.clone()));
            current.is_some_and(|v| allowed.contains(&v))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefaults {
    pub name: String,
}

/// Description of a node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub display_name: String,
    pub name: String,
    pub icon: String,
    pub group: Vec<String>,
    pub version: u32,
    /// Expression the host renders under the node's title on the canvas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub description: String,
    pub defaults: NodeDefaults,
    pub inputs: Vec<ConnectionType>,
    pub outputs: Vec<ConnectionType>,
    pub properties: Vec<NodeProperty>,
}

impl NodeDescription {
    pub fn property(&self, name: &str) -> Option<&NodeProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Names in `values` that are either undeclared or hidden by their
    /// display conditions, and would therefore be ignored.
    pub fn ignored_parameters(&self, values: &Map<String, Value>) -> Vec<String> {
        values
            .keys()
            .filter(|name| match self.property(name) {
                Some(property) => !property.is_shown(self, values),
                None => true,
            })
            .cloned()
            .collect()
    }
}

/// Description of a credential type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescription {
    pub name: String,
    pub display_name: String,
    pub properties: Vec<NodeProperty>,
}

/// The Caption Gemini node's description.
pub fn caption_gemini_description() -> NodeDescription {
    let model_options = GeminiModel::ALL
        .iter()
        .map(|m| PropertyOption {
            name: m.display_name().to_string(),
            value: json!(m.id()),
        })
        .collect();

    let mut model = NodeProperty::new(
        "Model",
        names::MODEL,
        PropertyType::Options,
        json!(GeminiModel::default().id()),
    );
    model.options = model_options;

    NodeDescription {
        display_name: "Caption Gemini".to_string(),
        name: "CaptionGemini".to_string(),
        icon: "file:captionGemini.svg".to_string(),
        group: vec!["transform".to_string()],
        version: 1,
        subtitle: Some(
            r#"={{$parameter["operation"] + ": " + $parameter["resource"]}}"#.to_string(),
        ),
        description: "Get video caption using GEMINI AI API".to_string(),
        defaults: NodeDefaults {
            name: "Caption Gemini".to_string(),
        },
        inputs: vec![ConnectionType::Main],
        outputs: vec![ConnectionType::Main],
        properties: vec![
            NodeProperty::new(
                "Gemini API Key",
                names::GEMINI_API_KEY,
                PropertyType::String,
                json!(""),
            )
            .required()
            .placeholder("api_key for gemini")
            .type_options(TypeOptions {
                password: true,
                rows: None,
            }),
            NodeProperty::new("Media URL", names::MEDIA_URL, PropertyType::String, json!(""))
                .required()
                .placeholder("https://example-video.com/videoUrl.mp4"),
            model,
            NodeProperty::new(
                "Content Type",
                names::CONTENT_TYPE,
                PropertyType::String,
                json!(DEFAULT_CONTENT_TYPE),
            )
            .description("MIME type of the media, e.g. video/mp4 or image/png"),
            NodeProperty::new(
                "Use Custom Prompt",
                names::USE_CUSTOM_PROMPT,
                PropertyType::Boolean,
                json!(false),
            )
            .description("Replace the built-in subtitle prompt with your own"),
            NodeProperty::new(
                "Custom Prompt",
                names::CUSTOM_PROMPT,
                PropertyType::String,
                json!(""),
            )
            .type_options(TypeOptions {
                password: false,
                rows: Some(4),
            })
            .shown_when(names::USE_CUSTOM_PROMPT, json!(true)),
            NodeProperty::new(
                "Use Structured Output",
                names::USE_STRUCTURED_OUTPUT,
                PropertyType::Boolean,
                json!(true),
            )
            .description("Return subtitles as a list of cues instead of free text")
            .shown_when(names::USE_CUSTOM_PROMPT, json!(true)),
        ],
    }
}

/// The credential type shipped alongside the node. It declares no fields;
/// storage and testing are left to the host.
pub fn example_credentials_description() -> CredentialDescription {
    CredentialDescription {
        name: "exampleCredentialsApi".to_string(),
        display_name: "Example Credentials API".to_string(),
        properties: Vec::new(),
    }
}
