use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Serialized DOM element, as captured from a page by `extract_dom.js`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "button", "input")
    pub tag_name: String,

    /// Element attributes (e.g., id, class, href, etc.)
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Text content of the element, including descendants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Light DOM children
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,

    /// Children of an attached open shadow root, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_root: Option<Vec<ElementNode>>,

    /// Whether the element is rendered
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

const INERT_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

fn default_visible() -> bool {
    true
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            is_visible: true,
            ..Default::default()
        }
    }

    /// Builder method: set a single attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: set the id attribute
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attribute("id", id)
    }

    /// Builder method: set the class attribute
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attribute("class", class)
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: attach a shadow root holding the given children
    pub fn with_shadow_root(mut self, children: Vec<ElementNode>) -> Self {
        self.shadow_root = Some(children);
        self
    }

    /// Builder method: set visibility
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Whether the element is script or markup the page never renders
    pub fn is_inert(&self) -> bool {
        INERT_TAGS.iter().any(|tag| self.is_tag(tag))
    }

    /// Empty script, style, noscript and template elements, including inside shadow roots
    ///
    /// The emptied elements stay in place so sibling positions match the page.
    pub fn simplify(&mut self) {
        if self.is_inert() {
            self.text_content = None;
            self.children.clear();
            self.shadow_root = None;
            return;
        }

        for child in &mut self.children {
            child.simplify();
        }
        if let Some(shadow) = &mut self.shadow_root {
            for child in shadow.iter_mut() {
                child.simplify();
            }
        }
    }
}
