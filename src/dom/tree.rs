use crate::dom::element::ElementNode;
use crate::dom::selector::SelectorList;
use crate::error::{InspectorError, Result};
use headless_chrome::Tab;
use std::collections::HashMap;
use std::sync::Arc;

/// Index of a node inside a [`DomTree`]
pub type NodeId = usize;

/// What a node in the arena stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    ShadowRoot,
    /// Script, style and similar elements; never matched, but counted as siblings
    Inert,
}

/// A node of the snapshot arena
#[derive(Debug, Clone)]
pub struct DomNode {
    pub kind: NodeKind,
    pub tag_name: String,
    pub attributes: HashMap<String, String>,
    pub text_content: Option<String>,
    pub is_visible: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub shadow_root: Option<NodeId>,
}

impl DomNode {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            tag_name: String::new(),
            attributes: HashMap::new(),
            text_content: None,
            is_visible: true,
            parent,
            children: Vec::new(),
            shadow_root: None,
        }
    }
}

/// Snapshot of a loaded document, with shadow roots kept as separate subtrees
///
/// Node `0` is always the document node; the captured root element is its only child.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
}

impl DomTree {
    /// Build a tree from a captured root element
    pub fn new(root: ElementNode) -> Self {
        let mut tree = Self {
            nodes: vec![DomNode::new(NodeKind::Document, None)],
        };
        let root_id = tree.insert(root, 0);
        tree.nodes[0].children.push(root_id);
        tree
    }

    /// Capture the DOM of a browser tab
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        let js_code = include_str!("extract_dom.js");

        let result = tab
            .evaluate(js_code, false)
            .map_err(|e| InspectorError::EvaluationFailed(format!("Failed to execute DOM extraction script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| InspectorError::DomParseFailed("No value returned from DOM extraction".to_string()))?;

        // The script returns a JSON string
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| InspectorError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

        Self::from_json(&json_str)
    }

    /// Build a tree from the JSON produced by `extract_dom.js`
    pub fn from_json(json: &str) -> Result<Self> {
        let mut root: ElementNode = serde_json::from_str(json)
            .map_err(|e| InspectorError::DomParseFailed(format!("Failed to parse DOM JSON: {}", e)))?;
        root.simplify();
        Ok(Self::new(root))
    }

    fn insert(&mut self, element: ElementNode, parent: NodeId) -> NodeId {
        let id = self.nodes.len();
        if element.is_inert() {
            let mut node = DomNode::new(NodeKind::Inert, Some(parent));
            node.tag_name = element.tag_name.to_ascii_lowercase();
            node.is_visible = false;
            self.nodes.push(node);
            return id;
        }

        let mut node = DomNode::new(NodeKind::Element, Some(parent));
        node.tag_name = element.tag_name.to_ascii_lowercase();
        node.attributes = element.attributes;
        node.text_content = element.text_content;
        node.is_visible = element.is_visible;
        self.nodes.push(node);

        let children: Vec<NodeId> = element
            .children
            .into_iter()
            .map(|child| self.insert(child, id))
            .collect();
        self.nodes[id].children = children;

        if let Some(shadow_children) = element.shadow_root {
            let shadow_id = self.nodes.len();
            self.nodes.push(DomNode::new(NodeKind::ShadowRoot, Some(id)));
            let children: Vec<NodeId> = shadow_children
                .into_iter()
                .map(|child| self.insert(child, shadow_id))
                .collect();
            self.nodes[shadow_id].children = children;
            self.nodes[id].shadow_root = Some(shadow_id);
        }

        id
    }

    /// The document node
    pub fn document(&self) -> NodeId {
        0
    }

    /// Get any node by id
    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id)
    }

    /// Get a node by id, only if it is an element
    pub fn element(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id).filter(|node| node.kind == NodeKind::Element)
    }

    /// Shadow root attached to an element
    pub fn shadow_root(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.shadow_root)
    }

    /// Parent element, stopping at shadow roots and the document
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(id)?.parent?;
        self.element(parent).map(|_| parent)
    }

    /// Element sibling immediately before this one
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(id)?.parent?;
        let siblings = &self.nodes[parent].children;
        let position = siblings.iter().position(|&sibling| sibling == id)?;
        position.checked_sub(1).map(|before| siblings[before])
    }

    /// 1-based position among siblings, together with the sibling count
    pub fn sibling_position(&self, id: NodeId) -> Option<(usize, usize)> {
        let parent = self.nodes.get(id)?.parent?;
        let siblings = &self.nodes[parent].children;
        let position = siblings.iter().position(|&sibling| sibling == id)?;
        Some((position + 1, siblings.len()))
    }

    /// 1-based position among siblings with the same tag, together with their count
    pub fn type_position(&self, id: NodeId) -> Option<(usize, usize)> {
        let node = self.nodes.get(id)?;
        let same_type: Vec<NodeId> = self.nodes[node.parent?]
            .children
            .iter()
            .copied()
            .filter(|&sibling| self.nodes[sibling].tag_name == node.tag_name)
            .collect();
        let position = same_type.iter().position(|&sibling| sibling == id)?;
        Some((position + 1, same_type.len()))
    }

    /// Attribute value of an element
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attributes.get(name).map(String::as_str)
    }

    /// Trimmed text of an element; falls back to its light descendants' text
    pub fn text(&self, id: NodeId) -> Option<String> {
        let node = self.element(id)?;
        if let Some(text) = &node.text_content {
            return Some(text.trim().to_string());
        }
        let parts: Vec<String> = node
            .children
            .iter()
            .filter_map(|&child| self.text(child))
            .filter(|text| !text.is_empty())
            .collect();
        Some(parts.join(" "))
    }

    /// Light descendants of a node in document order, not entering shadow roots
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(scope) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return result,
        };
        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        result
    }

    /// All light descendants of `scope` matching `selector`
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let selector = SelectorList::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect())
    }

    /// First light descendant of `scope` matching `selector`
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let selector = SelectorList::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .find(|&id| selector.matches(self, id)))
    }

    /// Count element nodes, including those inside shadow roots
    pub fn count_elements(&self) -> usize {
        self.nodes.iter().filter(|node| node.kind == NodeKind::Element).count()
    }
}
