//! Live element walker
//!
//! Replays the resolved member model against a captured document: binds
//! positional arguments into selector templates, follows ancestor chains and
//! shadow roots, evaluates filters, and scores container candidates.
//! Lookups never fail hard; anything that cannot be located is `None`.

pub mod filter;

pub use filter::{FilterPlan, FilterValue};

use crate::dom::{DomTree, NodeId};
use crate::pageobject::database::DatabaseSnapshot;
use crate::pageobject::member::{ElementDescriptor, FilterDescriptor, Member, MethodDescriptor};
use crate::pageobject::types::ArgValue;
use indexmap::IndexMap;
use std::collections::HashSet;

const ROOT_ELEMENT: &str = "root";

/// Locates page-object members in a document snapshot
pub struct ElementFinder<'a> {
    dom: &'a DomTree,
    database: &'a DatabaseSnapshot,
}

impl<'a> ElementFinder<'a> {
    pub fn new(dom: &'a DomTree, database: &'a DatabaseSnapshot) -> Self {
        Self { dom, database }
    }

    /// First element of the document matching a CSS selector
    pub fn locate(&self, css: &str) -> Option<NodeId> {
        match self.dom.query_selector(self.dom.document(), css) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }

    /// Root element of a page object, searched from the document
    pub fn locate_page_object(&self, uri: &str) -> Option<NodeId> {
        let root = self.database.element(uri, ROOT_ELEMENT)?;
        self.get_elements(self.dom.document(), root, &[], true).first().copied()
    }

    /// Resolve a member relative to a concrete parent node
    ///
    /// `siblings` is the element map of the page object declaring an element member,
    /// used to reconstruct its ancestor chain.
    pub fn walk(
        &self,
        parent: NodeId,
        member: &Member,
        args: &[ArgValue],
        siblings: &IndexMap<String, ElementDescriptor>,
    ) -> Option<NodeId> {
        match member {
            Member::Element(element) => self.walk_element(parent, element, args, siblings),
            Member::Method(method) => self.walk_method(parent, method, args),
            // intrinsics act on the element they are called on
            Member::Intrinsic(_) => self.dom.node(parent).map(|_| parent),
        }
    }

    /// Like [`walk`](Self::walk), taking siblings from the database
    pub fn find(&self, parent: NodeId, member: &Member, args: &[ArgValue]) -> Option<NodeId> {
        match member {
            Member::Element(element) => {
                let siblings = &self.database.get(&element.owner)?.elements;
                self.walk_element(parent, element, args, siblings)
            }
            _ => self.walk(parent, member, args, &IndexMap::new()),
        }
    }

    /// First node an element resolves to
    pub fn walk_element(
        &self,
        parent: NodeId,
        element: &ElementDescriptor,
        args: &[ArgValue],
        siblings: &IndexMap<String, ElementDescriptor>,
    ) -> Option<NodeId> {
        self.walk_element_all(parent, element, args, siblings).first().copied()
    }

    /// Every node an element resolves to, after filtering
    pub fn walk_element_all(
        &self,
        parent: NodeId,
        element: &ElementDescriptor,
        args: &[ArgValue],
        siblings: &IndexMap<String, ElementDescriptor>,
    ) -> Vec<NodeId> {
        if element.is_root {
            return if parent == self.dom.document() {
                self.get_elements(parent, element, args, true)
            } else {
                self.dom.node(parent).map(|_| vec![parent]).unwrap_or_default()
            };
        }

        let mut scope = parent;
        let mut offset = 0;
        for ancestor in ancestors(element, siblings) {
            let count = ancestor.selector.args.len();
            let found = self.get_elements(scope, ancestor, take_args(args, offset, count), false);
            offset += count;
            match found.first() {
                Some(&node) => scope = node,
                None => return Vec::new(),
            }
        }

        self.get_elements(scope, element, take_args(args, offset, element.own_arg_count()), true)
    }

    /// Walk a method's referenced elements, returning the last one reached
    pub fn walk_method(&self, parent: NodeId, method: &MethodDescriptor, args: &[ArgValue]) -> Option<NodeId> {
        let element_args: usize = method.elements.iter().map(|e| e.effective_args.len()).sum();
        let declared = method.effective_args.len().saturating_sub(element_args);
        let args = take_args(args, declared, element_args);
        self.walk_chain(parent, &method.owner, &method.elements, args)
    }

    /// Resolve elements one after another
    ///
    /// Elements of `owner` resolve from `parent`; once an element belongs to
    /// another page object, the scope moves to the node resolved just before it.
    fn walk_chain(
        &self,
        parent: NodeId,
        owner: &str,
        elements: &[ElementDescriptor],
        args: &[ArgValue],
    ) -> Option<NodeId> {
        let mut scope = parent;
        let mut scope_owner = owner;
        let mut current = parent;
        let mut offset = 0;

        for element in elements {
            if element.owner != scope_owner {
                scope = current;
                scope_owner = &element.owner;
            }
            let count = element.effective_args.len();
            let siblings = &self.database.get(&element.owner)?.elements;
            current = self.walk_element(scope, element, take_args(args, offset, count), siblings)?;
            offset += count;
        }

        Some(current)
    }

    /// Query one element against a parent node
    ///
    /// `args` holds the element's own selector args followed by its filter args.
    pub fn get_elements(
        &self,
        parent: NodeId,
        element: &ElementDescriptor,
        args: &[ArgValue],
        apply_filter: bool,
    ) -> Vec<NodeId> {
        let Some(template) = &element.selector.css else {
            return Vec::new();
        };
        if self.dom.node(parent).is_none() {
            return Vec::new();
        }

        let selector_count = element.selector.args.len().min(args.len());
        let css = substitute(template, &args[..selector_count]);

        let scope = match self.dom.shadow_root(parent) {
            Some(shadow) if element.is_in_shadow_root => shadow,
            _ => parent,
        };

        let found = match self.dom.query_selector_all(scope, &css) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("Element '{}' of {}: {}", element.name, element.owner, e);
                return Vec::new();
            }
        };

        if !element.selector.return_all {
            return found.into_iter().take(1).collect();
        }
        match &element.filter {
            Some(filter) if apply_filter => self.apply_filter(element, filter, found, &args[selector_count..]),
            _ => found,
        }
    }

    fn apply_filter(
        &self,
        element: &ElementDescriptor,
        filter: &FilterDescriptor,
        candidates: Vec<NodeId>,
        filter_args: &[ArgValue],
    ) -> Vec<NodeId> {
        let expected = filter_args.first().and_then(ArgValue::as_text);
        if filter.matcher.needs_argument() && expected.is_none() {
            return Vec::new();
        }

        let plan = FilterPlan::build(self.database, element, filter);
        let mut passed = Vec::new();
        for candidate in candidates {
            let Some(target) = self.descend(candidate, &plan.elements) else {
                continue;
            };
            let Some(value) = filter::read_value(self.dom, target, &plan.intrinsic, &filter.apply_args) else {
                continue;
            };
            if filter::matches(&filter.matcher, &value, expected.as_deref()) {
                passed.push(candidate);
                if filter.find_first {
                    break;
                }
            }
        }
        passed
    }

    /// Follow each element's own selector down from a filter candidate
    fn descend(&self, candidate: NodeId, elements: &[ElementDescriptor]) -> Option<NodeId> {
        let mut current = candidate;
        for element in elements {
            if element.is_root || element.selector.css.is_none() {
                continue;
            }
            current = self.get_elements(current, element, &[], false).first().copied()?;
        }
        Some(current)
    }

    /// How many argument-free elements of a page object are present under a node
    pub fn score(&self, container: NodeId, uri: &str) -> usize {
        let Some(page_object) = self.database.get(uri) else {
            return 0;
        };
        page_object
            .elements
            .values()
            .filter(|element| !element.is_root && element.effective_args.is_empty())
            .filter(|element| {
                self.walk_element(container, element, &[], &page_object.elements)
                    .is_some()
            })
            .count()
    }

    /// Page objects that could fill a container, best match first
    pub fn rank_candidates(&self, container: NodeId) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .database
            .uris()
            .map(|uri| (uri.to_string(), self.score(container, uri)))
            .filter(|(_, score)| *score > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

/// Ancestors of an element, outermost first
fn ancestors<'s>(element: &ElementDescriptor, siblings: &'s IndexMap<String, ElementDescriptor>) -> Vec<&'s ElementDescriptor> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut next = element.parent.as_deref();

    while let Some(name) = next {
        if !seen.insert(name) {
            log::warn!("Element '{}' has a cyclic parent chain", element.name);
            break;
        }
        let Some(ancestor) = siblings.get(name) else {
            log::warn!("Parent '{}' of element '{}' is not declared", name, element.name);
            break;
        };
        chain.push(ancestor);
        next = ancestor.parent.as_deref();
    }

    chain.reverse();
    chain
}

fn take_args(args: &[ArgValue], offset: usize, count: usize) -> &[ArgValue] {
    let start = offset.min(args.len());
    let end = offset.saturating_add(count).min(args.len());
    &args[start..end]
}

/// Substitute `%s` / `%d` placeholders with argument values, in order
///
/// An unbound `%d` becomes `n`, matching every index of `:nth-child(%d)`;
/// an unbound `%s` becomes the empty string.
pub fn substitute(template: &str, args: &[ArgValue]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut values = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('%', Some(&kind @ ('s' | 'd'))) => {
                chars.next();
                match values.next().and_then(ArgValue::as_text) {
                    Some(value) => result.push_str(&value),
                    None if kind == 'd' => result.push('n'),
                    None => {}
                }
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementNode;
    use crate::pageobject::definition::PageObjectDefinition;
    use serde_json::{Value, json};

    fn snapshot(entries: Vec<(&str, Value)>) -> DatabaseSnapshot {
        let definitions = entries
            .into_iter()
            .map(|(uri, value)| (uri.to_string(), PageObjectDefinition::from_json(uri, &value.to_string()).unwrap()))
            .collect();
        DatabaseSnapshot::build(&definitions)
    }

    fn fruit_page() -> DomTree {
        DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("ul").with_class("list").with_children(vec![
                ElementNode::new("li").with_text("Apple"),
                ElementNode::new("li").with_text("Banana"),
                ElementNode::new("li").with_text("Cherry"),
            ]),
        ]))
    }

    #[test]
    fn test_substitute_placeholders() {
        let args = [ArgValue::new("i", 2), ArgValue::new("s", "x")];
        assert_eq!(substitute("li:nth-child(%d) [name='%s']", &args), "li:nth-child(2) [name='x']");
        assert_eq!(substitute("li:nth-child(%d)", &[]), "li:nth-child(n)");
        assert_eq!(substitute("[name='%s']", &[ArgValue::unbound("s")]), "[name='']");
        assert_eq!(substitute("div%", &[]), "div%");
    }

    #[test]
    fn test_filter_with_unbound_index() {
        let database = snapshot(vec![(
            "a/list",
            json!({
                "root": true,
                "selector": {"css": ".list"},
                "elements": [{
                    "name": "items",
                    "selector": {"css": "li:nth-child(%d)", "args": [{"name": "idx", "type": "number"}], "returnAll": true},
                    "filter": {"apply": "getText", "matcher": {"type": "stringEquals", "args": [{"name": "label"}]}, "findFirst": true}
                }]
            }),
        )]);
        let dom = fruit_page();
        let finder = ElementFinder::new(&dom, &database);

        let root = finder.locate_page_object("a/list").unwrap();
        let items = database.member("a/list", "items").unwrap();
        let args = [ArgValue::unbound("idx"), ArgValue::new("label", "Banana")];

        let found = finder.find(root, &items, &args).unwrap();
        assert_eq!(dom.text(found).as_deref(), Some("Banana"));

        // no bound filter argument means nothing passes
        assert_eq!(finder.find(root, &items, &[ArgValue::unbound("idx")]), None);
    }

    fn labelled_rows() -> DomTree {
        DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("ul").with_class("list").with_children(vec![
                ElementNode::new("li").with_children(vec![ElementNode::new("span").with_text("A")]),
                ElementNode::new("li").with_children(vec![ElementNode::new("span").with_text("B")]),
            ]),
        ]))
    }

    #[test]
    fn test_filter_applies_method_of_element_page_object() {
        let database = snapshot(vec![
            (
                "a/list",
                json!({
                    "root": true,
                    "selector": {"css": ".list"},
                    "elements": [{
                        "name": "rows",
                        "type": "a/row",
                        "selector": {"css": "li", "returnAll": true},
                        "filter": {"apply": "getLabel", "matcher": {"type": "stringEquals", "args": [{"name": "l"}]}}
                    }]
                }),
            ),
            (
                "a/row",
                json!({
                    "elements": [{"name": "label", "selector": {"css": "span"}}],
                    "methods": [{"name": "getLabel", "compose": [{"element": "label", "apply": "getText"}]}]
                }),
            ),
        ]);
        let dom = labelled_rows();
        let finder = ElementFinder::new(&dom, &database);
        let root = finder.locate_page_object("a/list").unwrap();
        let rows = database.member("a/list", "rows").unwrap();

        let found = finder.find(root, &rows, &[ArgValue::new("l", "B")]).unwrap();
        assert_eq!(dom.text(found).as_deref(), Some("B"));
        assert_eq!(finder.find(root, &rows, &[ArgValue::new("l", "C")]), None);
    }

    #[test]
    fn test_filter_applies_method_of_owner_through_child_element() {
        let database = snapshot(vec![(
            "a/list",
            json!({
                "root": true,
                "selector": {"css": ".list"},
                "elements": [{
                    "name": "rows",
                    "selector": {"css": "li", "returnAll": true},
                    "filter": {"apply": "rowLabel", "matcher": {"type": "stringContains", "args": [{"name": "l"}]}, "findFirst": true},
                    "elements": [{"name": "label", "selector": {"css": "span"}}]
                }],
                "methods": [{"name": "rowLabel", "compose": [{"element": "label", "apply": "getText"}]}]
            }),
        )]);
        let dom = labelled_rows();
        let finder = ElementFinder::new(&dom, &database);
        let root = finder.locate_page_object("a/list").unwrap();
        let rows = database.member("a/list", "rows").unwrap();

        let found = finder.find(root, &rows, &[ArgValue::new("l", "A")]).unwrap();
        assert_eq!(dom.text(found).as_deref(), Some("A"));
    }

    #[test]
    fn test_ancestor_args_and_shadow_lookup() {
        let database = snapshot(vec![(
            "a/host",
            json!({
                "root": true,
                "selector": {"css": "x-host"},
                "elements": [{
                    "name": "panel",
                    "selector": {"css": ".panel[data-id='%s']", "args": [{"name": "id"}]},
                    "shadow": {"elements": [{"name": "label", "selector": {"css": "span"}}]}
                }]
            }),
        )]);
        let dom = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("x-host").with_children(vec![
                ElementNode::new("div").with_class("panel").with_attribute("data-id", "a")
                    .with_shadow_root(vec![ElementNode::new("span").with_text("Panel A")]),
                ElementNode::new("div").with_class("panel").with_attribute("data-id", "b")
                    .with_shadow_root(vec![ElementNode::new("span").with_text("Panel B")]),
            ]),
        ]));
        let finder = ElementFinder::new(&dom, &database);
        let root = finder.locate_page_object("a/host").unwrap();
        let label = database.member("a/host", "label").unwrap();

        let found = finder.find(root, &label, &[ArgValue::new("id", "b")]).unwrap();
        assert_eq!(dom.text(found).as_deref(), Some("Panel B"));

        // the span lives only in the shadow root, so a light-DOM query misses it
        assert_eq!(dom.query_selector(root, "span").unwrap(), None);
    }

    #[test]
    fn test_method_walk_follows_chain() {
        let database = snapshot(vec![
            (
                "a/menu",
                json!({
                    "root": true,
                    "selector": {"css": "nav"},
                    "elements": [{
                        "name": "entry",
                        "type": "a/entry",
                        "selector": {"css": ".entry:nth-child(%d)", "args": [{"name": "index", "type": "number"}]}
                    }],
                    "methods": [{
                        "name": "entryIcon",
                        "args": [{"name": "unused", "type": "string"}],
                        "compose": [{"element": "entry"}, {"chain": true, "element": "icon"}]
                    }]
                }),
            ),
            ("a/entry", json!({"selector": {"css": ".entry"}, "elements": [{"name": "icon", "selector": {"css": "i"}}]})),
        ]);
        let dom = DomTree::new(ElementNode::new("body").with_children(vec![ElementNode::new("nav").with_children(vec![
            ElementNode::new("div").with_class("entry").with_children(vec![ElementNode::new("i").with_id("first")]),
            ElementNode::new("div").with_class("entry").with_children(vec![ElementNode::new("i").with_id("second")]),
        ])]));
        let finder = ElementFinder::new(&dom, &database);
        let root = finder.locate_page_object("a/menu").unwrap();
        let method = database.member("a/menu", "entryIcon").unwrap();

        let args = [ArgValue::new("unused", "x"), ArgValue::new("index", 2)];
        let icon = finder.find(root, &method, &args).unwrap();
        assert_eq!(dom.attribute(icon, "id"), Some("second"));
    }

    #[test]
    fn test_missing_selector_and_bad_css() {
        let database = snapshot(vec![(
            "a/page",
            json!({
                "elements": [
                    {"name": "nothing"},
                    {"name": "broken", "selector": {"css": "div[["}}
                ]
            }),
        )]);
        let dom = fruit_page();
        let finder = ElementFinder::new(&dom, &database);

        assert_eq!(finder.find(0, &database.member("a/page", "nothing").unwrap(), &[]), None);
        assert_eq!(finder.find(0, &database.member("a/page", "broken").unwrap(), &[]), None);
        assert_eq!(finder.locate("li:oops("), None);
        assert!(finder.locate("ul.list > li").is_some());
    }

    #[test]
    fn test_rank_container_candidates() {
        let database = snapshot(vec![
            ("a/fruits", json!({"selector": {"css": ".list"}, "elements": [
                {"name": "item", "selector": {"css": "li"}},
                {"name": "list", "selector": {"css": "ul"}}
            ]})),
            ("a/other", json!({"elements": [{"name": "item", "selector": {"css": "li"}}]})),
            ("a/none", json!({"elements": [{"name": "table", "selector": {"css": "table"}}]})),
            ("a/args", json!({"elements": [{"name": "item", "selector": {"css": "li.%s", "args": [{"name": "c"}]}}]})),
        ]);
        let dom = fruit_page();
        let finder = ElementFinder::new(&dom, &database);
        let body = dom.query_selector(0, "body").unwrap().unwrap();

        assert_eq!(
            finder.rank_candidates(body),
            vec![("a/fruits".to_string(), 2), ("a/other".to_string(), 1)]
        );
    }
}
