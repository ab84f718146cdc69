//! Inspection session
//!
//! Combines the page-object database with the captured document and keeps
//! the member nodes a user expanded. Loading new definitions or a new
//! document resets the expanded nodes.

pub mod node_map;
pub mod snippet;

pub use node_map::{MemberNode, MemberNodeMap};

use crate::dom::{DomTree, NodeId};
use crate::error::{InspectorError, Result};
use crate::finder::ElementFinder;
use crate::pageobject::database::{DefinitionSource, PageObjectDatabase};
use crate::pageobject::definition::PageObjectDefinition;
use crate::pageobject::intrinsic::catalog;
use crate::pageobject::member::Member;
use crate::pageobject::types::{ArgValue, TypeRef};
use indexmap::IndexMap;
use serde::Serialize;

const TEXT_PREVIEW_LEN: usize = 80;

/// Short description of a document node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSummary {
    pub node: NodeId,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Default)]
pub struct Inspector {
    database: PageObjectDatabase,
    document: Option<DomTree>,
    nodes: MemberNodeMap,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database(&self) -> &PageObjectDatabase {
        &self.database
    }

    /// Reload definitions from a source
    pub async fn reload(&mut self, source: &dyn DefinitionSource) -> Result<usize> {
        self.nodes.clear();
        self.database.reload(source).await
    }

    /// Install definitions loaded elsewhere
    pub fn install_definitions(&mut self, definitions: &IndexMap<String, PageObjectDefinition>) -> usize {
        self.nodes.clear();
        self.database.install(definitions)
    }

    /// Forget the loaded definitions after a failed load
    pub fn clear_definitions(&mut self) {
        self.nodes.clear();
        self.database.clear();
    }

    /// Replace the current document snapshot
    pub fn load_document(&mut self, document: DomTree) {
        log::debug!("Loaded document with {} elements", document.count_elements());
        self.nodes.clear();
        self.document = Some(document);
    }

    pub fn document(&self) -> Option<&DomTree> {
        self.document.as_ref()
    }

    pub fn nodes(&self) -> &MemberNodeMap {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> Result<&MemberNode> {
        self.nodes.get(id).ok_or(InspectorError::UnknownNode(id))
    }

    /// Forget every expanded node
    pub fn reset_session(&mut self) {
        self.nodes.clear();
    }

    fn require_document(&self) -> Result<&DomTree> {
        self.document.as_ref().ok_or(InspectorError::NoDocumentLoaded)
    }

    /// Load a page object from the document by its root selector
    pub fn expand_root(&mut self, uri: &str) -> Result<MemberNode> {
        let snapshot = self.database.snapshot()?;
        if !snapshot.is_known_uri(uri) {
            return Err(InspectorError::UnknownPageObject(uri.to_string()));
        }
        let document = self.require_document()?;

        let element = ElementFinder::new(document, &snapshot)
            .locate_page_object(uri)
            .ok_or_else(|| InspectorError::ElementNotFound(format!("root of {}", uri)))?;

        let id = self.nodes.register(MemberNode::root(uri, Some(element)));
        self.node(id).cloned()
    }

    /// Expand a member of an already expanded node
    ///
    /// The node is registered even when the member is not present in the
    /// document, with no element bound.
    pub fn expand_member(&mut self, parent_id: usize, member_name: &str, args: Vec<ArgValue>) -> Result<MemberNode> {
        let snapshot = self.database.snapshot()?;
        let parent = self.node(parent_id)?.clone();
        let document = self.require_document()?;

        let member = match parent.page_object() {
            Some(uri) => snapshot.member(uri, member_name)?,
            None => catalog()
                .find(member_name)
                .cloned()
                .map(Member::Intrinsic)
                .ok_or_else(|| InspectorError::UnknownMember {
                    uri: parent.uri.clone(),
                    member: member_name.to_string(),
                })?,
        };

        let expected = member.effective_args().len();
        if args.len() > expected {
            return Err(InspectorError::InvalidParams(format!(
                "'{}' takes {} arguments, got {}",
                member_name,
                expected,
                args.len()
            )));
        }

        let finder = ElementFinder::new(document, &snapshot);
        let element = parent.element.and_then(|node| finder.find(node, &member, &args));

        let (uri, is_container) = match &member {
            Member::Element(element) => (element.owner.clone(), element.type_ref == TypeRef::Container),
            Member::Method(method) => (method.owner.clone(), false),
            Member::Intrinsic(_) => (parent.uri.clone(), false),
        };

        let id = self.nodes.register(MemberNode {
            id: 0,
            parent: Some(parent_id),
            member_name: Some(member_name.to_string()),
            uri,
            type_ref: member.type_ref().clone(),
            is_container,
            element,
            args,
            display_name: member.display_name().to_string(),
        });
        log::debug!("Expanded {} on node {} as node {}", member_name, parent_id, id);
        self.node(id).cloned()
    }

    /// Choose the page object filling a container node
    pub fn set_container_type(&mut self, node_id: usize, uri: &str) -> Result<MemberNode> {
        if !self.database.is_known_uri(uri) {
            return Err(InspectorError::UnknownPageObject(uri.to_string()));
        }
        let node = self.nodes.get_mut(node_id).ok_or(InspectorError::UnknownNode(node_id))?;
        if !node.is_container {
            return Err(InspectorError::InvalidParams(format!("node {} is not a container", node_id)));
        }
        node.type_ref = TypeRef::PageObject(uri.to_string());
        Ok(node.clone())
    }

    /// Page objects likely to fill a container node, best first
    pub fn rank_container_candidates(&self, node_id: usize) -> Result<Vec<(String, usize)>> {
        let node = self.node(node_id)?;
        if !node.is_container {
            return Err(InspectorError::InvalidParams(format!("node {} is not a container", node_id)));
        }
        let element = node
            .element
            .ok_or_else(|| InspectorError::ElementNotFound(format!("container node {}", node_id)))?;

        let snapshot = self.database.snapshot()?;
        let document = self.require_document()?;
        Ok(ElementFinder::new(document, &snapshot).rank_candidates(element))
    }

    /// JavaScript reproducing the member chain up to a node
    pub fn snippet(&self, node_id: usize) -> Result<String> {
        let path = self.nodes.path_to(node_id);
        snippet::render(&path).ok_or(InspectorError::UnknownNode(node_id))
    }

    /// Summary of a document node
    pub fn element_summary(&self, node: NodeId) -> Option<ElementSummary> {
        let document = self.document.as_ref()?;
        let element = document.element(node)?;
        let text = document
            .text(node)
            .filter(|text| !text.is_empty())
            .map(|text| text.chars().take(TEXT_PREVIEW_LEN).collect());

        Some(ElementSummary {
            node,
            tag: element.tag_name.clone(),
            id: element.attributes.get("id").cloned(),
            class: element.attributes.get("class").cloned(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementNode;
    use serde_json::json;

    fn inspector() -> Inspector {
        let definitions: IndexMap<String, PageObjectDefinition> = [
            (
                "a/shop",
                json!({
                    "root": true,
                    "selector": {"css": "main"},
                    "elements": [
                        {"name": "fruits", "public": true, "type": "container", "selector": {"css": ".fruits"}},
                        {"name": "buy", "public": true, "type": ["clickable"], "selector": {"css": "button"}}
                    ]
                }),
            ),
            ("a/fruitList", json!({"selector": {"css": "ul"}, "elements": [{"name": "item", "selector": {"css": "li"}}]})),
        ]
        .into_iter()
        .map(|(uri, value)| (uri.to_string(), PageObjectDefinition::from_json(uri, &value.to_string()).unwrap()))
        .collect();

        let mut inspector = Inspector::new();
        inspector.install_definitions(&definitions);
        inspector.load_document(DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("main").with_children(vec![
                ElementNode::new("div").with_class("fruits").with_children(vec![
                    ElementNode::new("ul").with_children(vec![ElementNode::new("li").with_text("Apple")]),
                ]),
                ElementNode::new("button").with_text("Buy"),
            ]),
        ])));
        inspector
    }

    #[test]
    fn test_expand_root_and_member() {
        let mut inspector = inspector();
        let root = inspector.expand_root("a/shop").unwrap();
        assert_eq!(inspector.element_summary(root.element.unwrap()).unwrap().tag, "main");

        let buy = inspector.expand_member(root.id, "buy", Vec::new()).unwrap();
        assert_eq!(buy.display_name, "getBuy");
        let summary = inspector.element_summary(buy.element.unwrap()).unwrap();
        assert_eq!(summary.text.as_deref(), Some("Buy"));

        let click = inspector.expand_member(buy.id, "click", Vec::new()).unwrap();
        assert_eq!(click.element, buy.element);
        assert_eq!(
            inspector.snippet(click.id).unwrap().lines().last(),
            Some("await (await root.getBuy()).click();")
        );
    }

    #[test]
    fn test_container_flow() {
        let mut inspector = inspector();
        let root = inspector.expand_root("a/shop").unwrap();
        let fruits = inspector.expand_member(root.id, "fruits", Vec::new()).unwrap();
        assert!(fruits.is_container);

        let ranked = inspector.rank_container_candidates(fruits.id).unwrap();
        assert_eq!(ranked, vec![("a/fruitList".to_string(), 1)]);

        let typed = inspector.set_container_type(fruits.id, "a/fruitList").unwrap();
        assert_eq!(typed.page_object(), Some("a/fruitList"));

        let item = inspector.expand_member(fruits.id, "item", Vec::new()).unwrap();
        assert!(item.element.is_some());
    }

    #[test]
    fn test_errors() {
        let mut inspector = inspector();
        assert!(matches!(inspector.expand_root("a/none"), Err(InspectorError::UnknownPageObject(_))));
        assert!(matches!(inspector.expand_member(7, "x", Vec::new()), Err(InspectorError::UnknownNode(7))));

        let root = inspector.expand_root("a/shop").unwrap();
        assert!(matches!(
            inspector.expand_member(root.id, "missing", Vec::new()),
            Err(InspectorError::UnknownMember { .. })
        ));
        assert!(matches!(
            inspector.set_container_type(root.id, "a/fruitList"),
            Err(InspectorError::InvalidParams(_))
        ));
        assert!(matches!(
            inspector.expand_member(root.id, "buy", vec![ArgValue::new("x", 1)]),
            Err(InspectorError::InvalidParams(_))
        ));

        inspector.reset_session();
        assert!(inspector.nodes().is_empty());
    }

    #[test]
    fn test_requires_document() {
        let mut inspector = Inspector::new();
        inspector.install_definitions(&IndexMap::new());
        assert!(matches!(inspector.expand_root("a/shop"), Err(InspectorError::UnknownPageObject(_))));

        let mut inspector = self::inspector();
        inspector.document = None;
        assert!(matches!(inspector.expand_root("a/shop"), Err(InspectorError::NoDocumentLoaded)));
    }
}
