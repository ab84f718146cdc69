//! Catalog of intrinsic operations, grouped by element capability

use crate::pageobject::types::{ArgDescriptor, ArgType, Category, TypeRef};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::OnceLock;

/// An operation every element with the right capability exposes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrinsicMethod {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub effective_args: Vec<ArgDescriptor>,
    pub category: Category,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub public: bool,
}

/// Capability group that is always available
pub const BASIC: &str = "basic";

type Entry = (&'static str, &'static str, &'static [(&'static str, &'static str)], &'static str, &'static str);

// (group, name, args, return type, description)
const ENTRIES: &[Entry] = &[
    ("basic", "getAttribute", &[("attribute", "string")], "string", "Value of the named attribute"),
    ("basic", "getClassAttribute", &[], "string", "Value of the class attribute"),
    ("basic", "getCssPropertyValue", &[("propertyName", "string")], "string", "Computed value of a CSS property"),
    ("basic", "getText", &[], "string", "Visible text of the element"),
    ("basic", "getTitle", &[], "string", "Value of the title attribute"),
    ("basic", "getValue", &[], "string", "Value of the value attribute"),
    ("basic", "isEnabled", &[], "boolean", "Whether the element is enabled"),
    ("basic", "isFocused", &[], "boolean", "Whether the element has focus"),
    ("basic", "isVisible", &[], "boolean", "Whether the element is displayed"),
    ("basic", "isPresent", &[], "boolean", "Whether the element is attached to the document"),
    ("basic", "containsElement", &[("locator", "locator"), ("expandShadowRoot", "boolean")], "boolean", "Whether a descendant matches the locator"),
    ("basic", "waitForAbsence", &[], "void", "Wait until the element is detached"),
    ("basic", "waitForVisible", &[], "void", "Wait until the element is displayed"),
    ("basic", "waitForInvisible", &[], "void", "Wait until the element is hidden"),
    ("actionable", "blur", &[], "void", "Remove focus from the element"),
    ("actionable", "focus", &[], "void", "Give focus to the element"),
    ("actionable", "moveTo", &[], "void", "Move the pointer over the element"),
    ("actionable", "scrollToCenter", &[], "void", "Scroll the element to the viewport center"),
    ("actionable", "scrollToTop", &[], "void", "Scroll the element to the viewport top"),
    ("clickable", "click", &[], "void", "Click the element"),
    ("clickable", "doubleClick", &[], "void", "Double-click the element"),
    ("clickable", "rightClick", &[], "void", "Right-click the element"),
    ("clickable", "clickAndHold", &[("holdDurationSec", "number")], "void", "Press and hold on the element"),
    ("editable", "clear", &[], "void", "Clear the element's value"),
    ("editable", "clearAndType", &[("text", "string")], "void", "Clear the element and type text"),
    ("editable", "press", &[("key", "string")], "void", "Press a key while the element has focus"),
    ("editable", "setText", &[("text", "string")], "void", "Type text into the element"),
    ("draggable", "dragAndDrop", &[("target", "locator"), ("holdDurationSec", "number")], "void", "Drag the element onto a target"),
    ("draggable", "dragAndDropByOffset", &[("xOffset", "number"), ("yOffset", "number")], "void", "Drag the element by an offset"),
    ("list", "size", &[], "number", "Number of matched elements"),
    ("element", "isPresent", &[], "boolean", "Whether the element is attached to the document"),
    ("element", "waitForAbsence", &[], "void", "Wait until the element is detached"),
    ("document", "getUrl", &[], "string", "URL of the current document"),
    ("document", "containsElement", &[("locator", "locator")], "boolean", "Whether the document contains a match for the locator"),
    ("document", "waitForDocumentReady", &[], "void", "Wait until the document finished loading"),
    ("navigation", "back", &[], "void", "Go back in history"),
    ("navigation", "forward", &[], "void", "Go forward in history"),
    ("navigation", "getWindowCount", &[], "number", "Number of open windows"),
    ("navigation", "switchToWindow", &[("url", "string")], "void", "Switch to the window showing the URL"),
    ("navigation", "closeWindow", &[("url", "string")], "void", "Close the window showing the URL"),
];

/// Intrinsic methods keyed by capability group, then by name
#[derive(Debug)]
pub struct IntrinsicCatalog {
    groups: IndexMap<&'static str, IndexMap<String, IntrinsicMethod>>,
}

impl IntrinsicCatalog {
    fn build() -> Self {
        let mut groups: IndexMap<&'static str, IndexMap<String, IntrinsicMethod>> = IndexMap::new();
        for &(group, name, args, return_type, description) in ENTRIES {
            let method = IntrinsicMethod {
                name: name.to_string(),
                display_name: name.to_string(),
                description: description.to_string(),
                effective_args: args
                    .iter()
                    .map(|&(arg, arg_type)| ArgDescriptor::new(arg, ArgType::from(arg_type)))
                    .collect(),
                category: Category::Intrinsic,
                type_ref: TypeRef::parse(return_type),
                public: true,
            };
            groups.entry(group).or_default().insert(name.to_string(), method);
        }
        Self { groups }
    }

    /// Capability group by name
    pub fn group(&self, name: &str) -> Option<&IndexMap<String, IntrinsicMethod>> {
        self.groups.get(name)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().copied()
    }

    /// First intrinsic with this name, scanning groups in catalog order
    pub fn find(&self, name: &str) -> Option<&IntrinsicMethod> {
        self.groups.values().find_map(|group| group.get(name))
    }

    /// Intrinsics available to an element declaring `capabilities`
    ///
    /// Always starts from the basic group; later groups overwrite same-named entries.
    pub fn members_for<S: AsRef<str>>(&self, capabilities: &[S]) -> IndexMap<String, IntrinsicMethod> {
        let mut members = self.groups.get(BASIC).cloned().unwrap_or_default();
        for capability in capabilities {
            if let Some(group) = self.groups.get(capability.as_ref()) {
                for (name, method) in group {
                    members.insert(name.clone(), method.clone());
                }
            }
        }
        members
    }
}

/// The process-wide intrinsic catalog
pub fn catalog() -> &'static IntrinsicCatalog {
    static CATALOG: OnceLock<IntrinsicCatalog> = OnceLock::new();
    CATALOG.get_or_init(IntrinsicCatalog::build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pageobject::types::PrimitiveType;

    #[test]
    fn test_groups_present() {
        let names: Vec<&str> = catalog().group_names().collect();
        assert_eq!(
            names,
            vec!["basic", "actionable", "clickable", "editable", "draggable", "list", "element", "document", "navigation"]
        );
    }

    #[test]
    fn test_find_scans_in_order() {
        let contains = catalog().find("containsElement").unwrap();
        // the basic variant comes first and takes two arguments
        assert_eq!(contains.effective_args.len(), 2);
        assert_eq!(contains.type_ref, TypeRef::Primitive(PrimitiveType::Boolean));
        assert!(catalog().find("fly").is_none());
    }

    #[test]
    fn test_members_for_unions_groups() {
        let members = catalog().members_for(&["clickable", "editable"]);
        let basic = catalog().group("basic").unwrap().len();
        let clickable = catalog().group("clickable").unwrap().len();
        let editable = catalog().group("editable").unwrap().len();

        assert_eq!(members.len(), basic + clickable + editable);
        assert!(members.contains_key("getText"));
        assert!(members.contains_key("click"));
        assert!(members.contains_key("setText"));
    }

    #[test]
    fn test_members_for_last_write_wins() {
        let members = catalog().members_for(&["document"]);
        let contains = &members["containsElement"];
        assert_eq!(contains.effective_args.len(), 1);
        assert_eq!(contains.description, "Whether the document contains a match for the locator");
    }

    #[test]
    fn test_unknown_capabilities_ignored() {
        let members = catalog().members_for(&["flying"]);
        assert_eq!(members.len(), catalog().group(BASIC).unwrap().len());
    }
}
