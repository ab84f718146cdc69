use crate::dom::NodeId;
use crate::pageobject::types::{ArgValue, TypeRef};
use indexmap::IndexMap;
use serde::Serialize;

/// A member the user expanded in the current session, bound to a document node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberNode {
    pub id: usize,

    /// Node this member was expanded from; `None` for a page-object root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,

    /// Member name, `None` for a page-object root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,

    /// Page object declaring the member (or the root's own URI)
    pub uri: String,

    /// What the member produces; rebound when a container gets a content type
    #[serde(rename = "type")]
    pub type_ref: TypeRef,

    /// Whether this node was declared as a container
    pub is_container: bool,

    /// Document node the member resolved to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<NodeId>,

    /// Argument values supplied when expanding
    pub args: Vec<ArgValue>,

    /// Accessor name shown to the user
    pub display_name: String,
}

impl MemberNode {
    /// A node for a page object loaded from the document
    pub fn root(uri: impl Into<String>, element: Option<NodeId>) -> Self {
        let uri = uri.into();
        Self {
            id: 0,
            parent: None,
            member_name: None,
            display_name: uri.clone(),
            type_ref: TypeRef::PageObject(uri.clone()),
            uri,
            is_container: false,
            element,
            args: Vec::new(),
        }
    }

    /// Page object whose members this node exposes, if any
    pub fn page_object(&self) -> Option<&str> {
        self.type_ref.as_page_object()
    }
}

/// Member nodes of the session, keyed by monotonically assigned ids
/// Uses IndexMap to preserve insertion order
#[derive(Debug, Clone, Default)]
pub struct MemberNodeMap {
    map: IndexMap<usize, MemberNode>,

    /// Next available id
    next_id: usize,
}

impl MemberNodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node and return its assigned id
    pub fn register(&mut self, mut node: MemberNode) -> usize {
        let id = self.next_id;
        node.id = id;
        self.map.insert(id, node);
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: usize) -> Option<&MemberNode> {
        self.map.get(&id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut MemberNode> {
        self.map.get_mut(&id)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.map.contains_key(&id)
    }

    /// Remove a node; its children stay registered
    pub fn remove(&mut self, id: usize) -> Option<MemberNode> {
        self.map.shift_remove(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drop every node; ids start over
    pub fn clear(&mut self) {
        self.map.clear();
        self.next_id = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&usize, &MemberNode)> {
        self.map.iter()
    }

    /// Nodes expanded directly from `id`
    pub fn children_of(&self, id: usize) -> impl Iterator<Item = &MemberNode> {
        self.map.values().filter(move |node| node.parent == Some(id))
    }

    /// Nodes from the page-object root down to `id`
    pub fn path_to(&self, id: usize) -> Vec<&MemberNode> {
        let mut path = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            let Some(node) = self.map.get(&current) else {
                break;
            };
            // ids only ever point to older nodes
            if path.len() > self.map.len() {
                break;
            }
            path.push(node);
            next = node.parent;
        }
        path.reverse();
        path
    }
}
