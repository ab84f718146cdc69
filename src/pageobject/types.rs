//! Type and category vocabulary shared by definitions and resolved members

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive value types a method can return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
    Void,
}

/// Semantic type of a member: what calling it produces
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeRef {
    Primitive(PrimitiveType),
    /// A plain element exposing intrinsic capabilities
    Basic,
    /// An element whose content page object is chosen later
    Container,
    Document,
    Navigation,
    /// Reference to another page object by URI
    PageObject(String),
}

impl TypeRef {
    pub const VOID: TypeRef = TypeRef::Primitive(PrimitiveType::Void);

    /// Parse a declared type name
    ///
    /// Any name containing `/` is a page-object URI; unknown bare names are basic elements.
    pub fn parse(name: &str) -> Self {
        match name {
            "string" => TypeRef::Primitive(PrimitiveType::String),
            "number" => TypeRef::Primitive(PrimitiveType::Number),
            "boolean" => TypeRef::Primitive(PrimitiveType::Boolean),
            "void" => TypeRef::VOID,
            "container" => TypeRef::Container,
            "document" => TypeRef::Document,
            "navigation" => TypeRef::Navigation,
            uri if uri.contains('/') => TypeRef::PageObject(uri.to_string()),
            _ => TypeRef::Basic,
        }
    }

    /// URI of the referenced page object, if this is a page-object type
    pub fn as_page_object(&self) -> Option<&str> {
        match self {
            TypeRef::PageObject(uri) => Some(uri),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        *self == TypeRef::VOID
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeRef::Primitive(PrimitiveType::String) => "string",
            TypeRef::Primitive(PrimitiveType::Number) => "number",
            TypeRef::Primitive(PrimitiveType::Boolean) => "boolean",
            TypeRef::Primitive(PrimitiveType::Void) => "void",
            TypeRef::Basic => "basic",
            TypeRef::Container => "container",
            TypeRef::Document => "document",
            TypeRef::Navigation => "navigation",
            TypeRef::PageObject(uri) => uri,
        };
        f.write_str(name)
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::parse(&name)
    }
}

impl From<TypeRef> for String {
    fn from(type_ref: TypeRef) -> Self {
        type_ref.to_string()
    }
}

/// Member category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Basic,
    PageObject,
    Container,
    Method,
    Intrinsic,
}

/// Declared type of an argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArgType {
    String,
    Number,
    Boolean,
    Locator,
    Function,
    PageObject,
    Other(String),
}

impl From<&str> for ArgType {
    fn from(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "string" => ArgType::String,
            "number" => ArgType::Number,
            "boolean" => ArgType::Boolean,
            "locator" => ArgType::Locator,
            "function" => ArgType::Function,
            "pageobject" => ArgType::PageObject,
            _ => ArgType::Other(name.to_string()),
        }
    }
}

impl From<String> for ArgType {
    fn from(name: String) -> Self {
        ArgType::from(name.as_str())
    }
}

impl From<ArgType> for String {
    fn from(arg_type: ArgType) -> Self {
        match arg_type {
            ArgType::String => "string".to_string(),
            ArgType::Number => "number".to_string(),
            ArgType::Boolean => "boolean".to_string(),
            ArgType::Locator => "locator".to_string(),
            ArgType::Function => "function".to_string(),
            ArgType::PageObject => "pageObject".to_string(),
            ArgType::Other(name) => name,
        }
    }
}

/// A declared parameter: name and type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: ArgType,
}

impl ArgDescriptor {
    pub fn new(name: impl Into<String>, arg_type: ArgType) -> Self {
        Self {
            name: name.into(),
            arg_type,
        }
    }
}

/// An argument value supplied by a caller, bound by position
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ArgValue {
    /// Parameter name, for display only
    #[serde(default)]
    pub name: String,

    /// Supplied value; `None` leaves the parameter unbound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl ArgValue {
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Value rendered as plain text, as it would be substituted into a selector
    pub fn as_text(&self) -> Option<String> {
        match self.value.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
