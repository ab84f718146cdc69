//! Raw page-object definitions, deserialized as authored

use crate::error::{InspectorError, Result};
use crate::pageobject::types::{ArgDescriptor, ArgType, TypeRef};
use serde::{Deserialize, Serialize};

/// One page-object JSON document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageObjectDefinition {
    /// Whether the page object can be loaded directly from the document
    #[serde(default)]
    pub root: bool,

    /// Root selector
    #[serde(default)]
    pub selector: Option<SelectorDef>,

    /// Capabilities of the root element
    #[serde(default, rename = "type")]
    pub root_type: Option<DeclaredType>,

    /// Whether the root element is public
    #[serde(default)]
    pub expose_root_element: bool,

    #[serde(default)]
    pub description: Option<DescriptionDef>,

    #[serde(default)]
    pub elements: Vec<ElementDef>,

    #[serde(default)]
    pub shadow: Option<ShadowDef>,

    #[serde(default)]
    pub methods: Vec<MethodDef>,

    /// Original JSON text
    #[serde(skip)]
    pub source: String,
}

impl PageObjectDefinition {
    /// Parse a definition, keeping its JSON text
    pub fn from_json(uri: &str, text: &str) -> Result<Self> {
        let mut definition: Self = serde_json::from_str(text).map_err(|e| InspectorError::DefinitionParseFailed {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        definition.source = text.to_string();
        Ok(definition)
    }

    /// CSS of the root selector, if declared
    pub fn root_css(&self) -> Option<&str> {
        self.selector.as_ref().and_then(|selector| selector.css.as_deref())
    }
}

/// `type` field: absent, an array of capability names, or a single name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclaredType {
    Capabilities(Vec<String>),
    Named(String),
}

impl DeclaredType {
    pub fn type_ref(&self) -> TypeRef {
        match self {
            DeclaredType::Capabilities(_) => TypeRef::Basic,
            DeclaredType::Named(name) => TypeRef::parse(name),
        }
    }

    pub fn capabilities(&self) -> Vec<String> {
        match self {
            DeclaredType::Capabilities(capabilities) => capabilities.clone(),
            DeclaredType::Named(_) => Vec::new(),
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            DeclaredType::Named(name) => Some(name),
            DeclaredType::Capabilities(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorDef {
    #[serde(default)]
    pub css: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgDef>,
    #[serde(default)]
    pub return_all: bool,
}

/// Argument as it appears in selectors, matchers, method signatures and steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArgDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub arg_type: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    /// Nested compose steps of a `waitFor` predicate
    #[serde(default)]
    pub predicate: Option<Vec<StepDef>>,
}

impl ArgDef {
    pub fn descriptor(&self) -> ArgDescriptor {
        ArgDescriptor::new(
            self.name.clone().unwrap_or_default(),
            ArgType::from(self.arg_type.as_deref().unwrap_or("string")),
        )
    }

    /// Page-object URI when this is a `{type: "pageObject", value: uri}` literal
    pub fn page_object_literal(&self) -> Option<&str> {
        let is_page_object = self
            .arg_type
            .as_deref()
            .is_some_and(|t| ArgType::from(t) == ArgType::PageObject);
        if is_page_object {
            self.value.as_ref().and_then(|value| value.as_str())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShadowDef {
    #[serde(default)]
    pub elements: Vec<ElementDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementDef {
    pub name: String,
    #[serde(default, rename = "type")]
    pub element_type: Option<DeclaredType>,
    #[serde(default)]
    pub selector: Option<SelectorDef>,
    #[serde(default)]
    pub filter: Option<FilterDef>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub description: Option<DescriptionDef>,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
    #[serde(default)]
    pub shadow: Option<ShadowDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDef {
    #[serde(default)]
    pub apply: Option<String>,
    #[serde(default)]
    pub apply_args: Vec<ArgDef>,
    #[serde(default)]
    pub matcher: Option<MatcherDef>,
    #[serde(default)]
    pub find_first: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatcherDef {
    #[serde(rename = "type")]
    pub matcher_type: String,
    #[serde(default)]
    pub args: Vec<ArgDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgDef>,
    /// Explicit return type; when present the compose steps are not inspected
    #[serde(default)]
    pub return_type: Option<DeclaredType>,
    /// Return type used for `applyExternal` steps
    #[serde(default, rename = "return")]
    pub return_value: Option<DeclaredType>,
    #[serde(default)]
    pub compose: Vec<StepDef>,
    #[serde(default)]
    pub description: Option<DescriptionDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDef {
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub apply: Option<String>,
    #[serde(default)]
    pub apply_external: Option<serde_json::Value>,
    #[serde(default)]
    pub chain: bool,
    #[serde(default)]
    pub return_type: Option<DeclaredType>,
    #[serde(default)]
    pub args: Vec<ArgDef>,
}

/// Description: a string, a list of lines, or `{author?, text}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptionDef {
    Detailed {
        #[serde(default)]
        author: Option<String>,
        text: DescriptionText,
    },
    Text(DescriptionText),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptionText {
    Line(String),
    Lines(Vec<String>),
}

impl DescriptionDef {
    pub fn author(&self) -> Option<&str> {
        match self {
            DescriptionDef::Detailed { author, .. } => author.as_deref(),
            DescriptionDef::Text(_) => None,
        }
    }

    pub fn text(&self) -> String {
        let text = match self {
            DescriptionDef::Detailed { text, .. } => text,
            DescriptionDef::Text(text) => text,
        };
        match text {
            DescriptionText::Line(line) => line.clone(),
            DescriptionText::Lines(lines) => lines.join(" "),
        }
    }
}
