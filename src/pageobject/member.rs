//! Resolved member model of a page object

use crate::pageobject::intrinsic::IntrinsicMethod;
use crate::pageobject::types::{ArgDescriptor, Category, TypeRef};
use indexmap::IndexMap;
use serde::Serialize;

/// CSS selector template of an element
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorDescriptor {
    /// CSS with `%s` / `%d` placeholders
    pub css: Option<String>,
    pub return_all: bool,
    pub args: Vec<ArgDescriptor>,
}

/// How a filter compares the value it reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatcherType {
    StringEquals,
    StringContains,
    IsTrue,
    IsFalse,
    Unsupported(String),
}

impl MatcherType {
    pub fn parse(name: &str) -> Self {
        match name {
            "stringEquals" => MatcherType::StringEquals,
            "stringContains" => MatcherType::StringContains,
            "isTrue" => MatcherType::IsTrue,
            "isFalse" => MatcherType::IsFalse,
            other => MatcherType::Unsupported(other.to_string()),
        }
    }

    /// Whether the matcher compares against a bound argument
    pub fn needs_argument(&self) -> bool {
        matches!(self, MatcherType::StringEquals | MatcherType::StringContains)
    }
}

/// Filter narrowing a `returnAll` element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    /// Intrinsic or method producing the compared value
    pub apply: Option<String>,
    pub apply_args: Vec<String>,
    pub matcher: MatcherType,
    pub matcher_args: Vec<ArgDescriptor>,
    pub find_first: bool,
}

/// How far resolution of a method got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionState {
    Complete,
    /// Reached through a reference cycle; type and elements may be incomplete
    Cyclic,
    /// A referenced page object, element, method or intrinsic was missing
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// URI of the page object declaring this element
    pub owner: String,
    /// Ancestors' selector args, then own selector and filter args
    pub effective_args: Vec<ArgDescriptor>,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Declared capability names, for intrinsic lookup
    pub capabilities: Vec<String>,
    pub category: Category,
    pub selector: SelectorDescriptor,
    pub returns_list: bool,
    pub filter: Option<FilterDescriptor>,
    /// Name of the enclosing element
    pub parent: Option<String>,
    pub public: bool,
    pub is_in_shadow_root: bool,
    /// The synthetic element bound to the root selector
    pub is_root: bool,
}

impl ElementDescriptor {
    /// Number of args this element consumes itself: selector args, then filter args
    pub fn own_arg_count(&self) -> usize {
        self.selector.args.len() + self.filter.as_ref().map_or(0, |filter| filter.matcher_args.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub owner: String,
    /// Declared args, then the args of every referenced element in order
    pub effective_args: Vec<ArgDescriptor>,
    pub category: Category,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub last_step_apply: Option<String>,
    /// Elements referenced by the compose steps, without duplicates
    pub elements: Vec<ElementDescriptor>,
    pub public: bool,
    pub state: ResolutionState,
}

impl MethodDescriptor {
    pub fn new(owner: &str, name: &str, description: String, declared_args: Vec<ArgDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            description,
            owner: owner.to_string(),
            effective_args: declared_args,
            category: Category::Method,
            type_ref: TypeRef::VOID,
            last_step_apply: None,
            elements: Vec::new(),
            public: true,
            state: ResolutionState::Complete,
        }
    }
}

/// Any member a page object or element exposes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Member {
    Element(ElementDescriptor),
    Method(MethodDescriptor),
    Intrinsic(IntrinsicMethod),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Element(element) => &element.name,
            Member::Method(method) => &method.name,
            Member::Intrinsic(intrinsic) => &intrinsic.name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Member::Element(element) => &element.display_name,
            Member::Method(method) => &method.display_name,
            Member::Intrinsic(intrinsic) => &intrinsic.display_name,
        }
    }

    pub fn effective_args(&self) -> &[ArgDescriptor] {
        match self {
            Member::Element(element) => &element.effective_args,
            Member::Method(method) => &method.effective_args,
            Member::Intrinsic(intrinsic) => &intrinsic.effective_args,
        }
    }

    pub fn type_ref(&self) -> &TypeRef {
        match self {
            Member::Element(element) => &element.type_ref,
            Member::Method(method) => &method.type_ref,
            Member::Intrinsic(intrinsic) => &intrinsic.type_ref,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Member::Element(element) => element.category,
            Member::Method(method) => method.category,
            Member::Intrinsic(intrinsic) => intrinsic.category,
        }
    }

    pub fn is_public(&self) -> bool {
        match self {
            Member::Element(element) => element.public,
            Member::Method(method) => method.public,
            Member::Intrinsic(intrinsic) => intrinsic.public,
        }
    }
}

/// A fully resolved page object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedPageObject {
    pub uri: String,
    pub source: String,
    pub author: Option<String>,
    pub description: String,
    /// Includes the synthetic `root` element when a root selector exists
    pub elements: IndexMap<String, ElementDescriptor>,
    pub methods: IndexMap<String, MethodDescriptor>,
}

impl ParsedPageObject {
    /// Element or method by name; elements shadow same-named methods
    pub fn member(&self, name: &str) -> Option<Member> {
        self.elements
            .get(name)
            .cloned()
            .map(Member::Element)
            .or_else(|| self.methods.get(name).cloned().map(Member::Method))
    }

    /// Public elements followed by public methods
    pub fn public_members(&self) -> Vec<Member> {
        let elements = self.elements.values().cloned().map(Member::Element);
        let methods = self.methods.values().cloned().map(Member::Method);
        elements.chain(methods).filter(Member::is_public).collect()
    }
}

/// `get<Name>` accessor name for an element
pub fn accessor_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("get{}{}", first.to_uppercase(), chars.as_str()),
        None => "get".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_name() {
        assert_eq!(accessor_name("submitButton"), "getSubmitButton");
        assert_eq!(accessor_name("root"), "getRoot");
        assert_eq!(accessor_name(""), "get");
    }

    #[test]
    fn test_matcher_parse() {
        assert_eq!(MatcherType::parse("stringEquals"), MatcherType::StringEquals);
        assert!(MatcherType::parse("stringContains").needs_argument());
        assert!(!MatcherType::parse("isTrue").needs_argument());
        assert_eq!(MatcherType::parse("regex"), MatcherType::Unsupported("regex".into()));
    }

    #[test]
    fn test_method_member_accessors() {
        let method = MethodDescriptor::new("a/b", "open", String::new(), Vec::new());
        let member = Member::Method(method);

        assert_eq!(member.name(), "open");
        assert_eq!(member.category(), Category::Method);
        assert!(member.type_ref().is_void());
        assert!(member.is_public());
    }
}
