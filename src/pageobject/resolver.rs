//! Static resolution of page-object definitions into the member model
//!
//! Elements are resolved per page object in one pass. Methods are resolved on
//! demand and memoized per `(uri, method)`, because a method may call other
//! methods of its own page object or, through `chain` steps, of any page object
//! in the definition set. An explicit in-progress set turns reference cycles
//! into [`ResolutionState::Cyclic`] placeholders instead of unbounded recursion.

use crate::pageobject::definition::{DescriptionDef, ElementDef, MethodDef, PageObjectDefinition, StepDef};
use crate::pageobject::intrinsic::catalog;
use crate::pageobject::member::{
    ElementDescriptor, FilterDescriptor, MatcherType, MethodDescriptor, ParsedPageObject, ResolutionState,
    SelectorDescriptor, accessor_name,
};
use crate::pageobject::types::{ArgDescriptor, Category, TypeRef};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

const ROOT_ELEMENT: &str = "root";
const APPLY_WAIT_FOR: &str = "waitFor";
const APPLY_RETURN_SELF: &str = "returnSelf";
const ELEMENT_DOCUMENT: &str = "document";
const ELEMENT_NAVIGATION: &str = "navigation";

type Elements = IndexMap<String, ElementDescriptor>;

/// Resolves page objects out of a complete set of raw definitions
pub struct Resolver<'a> {
    definitions: &'a IndexMap<String, PageObjectDefinition>,
    elements: HashMap<String, Elements>,
    methods: HashMap<(String, String), MethodDescriptor>,
    in_progress: HashSet<(String, String)>,
    parsed: HashMap<String, ParsedPageObject>,
}

/// Contribution of one compose step
struct StepOutcome {
    type_ref: TypeRef,
    elements: Vec<ElementDescriptor>,
    apply: Option<String>,
    provisional: bool,
}

/// Why a method stopped resolving
#[derive(Debug)]
enum MissingReference {
    PageObject(String),
    Element(String),
    Operation(String),
}

impl<'a> Resolver<'a> {
    pub fn new(definitions: &'a IndexMap<String, PageObjectDefinition>) -> Self {
        Self {
            definitions,
            elements: HashMap::new(),
            methods: HashMap::new(),
            in_progress: HashSet::new(),
            parsed: HashMap::new(),
        }
    }

    /// Resolve every definition, in URI order
    pub fn resolve_all(mut self) -> IndexMap<String, ParsedPageObject> {
        let mut uris: Vec<&String> = self.definitions.keys().collect();
        uris.sort();

        let mut resolved = IndexMap::new();
        for uri in uris {
            if let Some(page_object) = self.resolve(uri) {
                resolved.insert(uri.clone(), page_object.clone());
            }
        }
        resolved
    }

    /// Resolve one page object; memoized by URI
    pub fn resolve(&mut self, uri: &str) -> Option<&ParsedPageObject> {
        if !self.parsed.contains_key(uri) {
            let definitions = self.definitions;
            let definition = definitions.get(uri)?;
            let elements = self.elements_of(uri)?.clone();

            let mut methods = IndexMap::new();
            for method in &definition.methods {
                if let Some(descriptor) = self.method(uri, &method.name) {
                    methods.insert(method.name.clone(), descriptor);
                }
            }

            let (author, description) = describe(definition.description.as_ref());
            log::debug!("Resolved page object {} ({} elements, {} methods)", uri, elements.len(), methods.len());
            self.parsed.insert(
                uri.to_string(),
                ParsedPageObject {
                    uri: uri.to_string(),
                    source: definition.source.clone(),
                    author,
                    description,
                    elements,
                    methods,
                },
            );
        }
        self.parsed.get(uri)
    }

    fn elements_of(&mut self, uri: &str) -> Option<&Elements> {
        if !self.elements.contains_key(uri) {
            let definition = self.definitions.get(uri)?;
            let elements = self.build_elements(uri, definition);
            self.elements.insert(uri.to_string(), elements);
        }
        self.elements.get(uri)
    }

    fn build_elements(&self, uri: &str, definition: &PageObjectDefinition) -> Elements {
        let mut elements = IndexMap::new();

        if let Some(selector) = &definition.selector {
            let type_ref = definition.root_type.as_ref().map_or(TypeRef::Basic, |t| t.type_ref());
            let selector = SelectorDescriptor {
                css: selector.css.clone(),
                return_all: selector.return_all,
                args: selector.args.iter().map(|arg| arg.descriptor()).collect(),
            };
            let (_, description) = describe(definition.description.as_ref());
            elements.insert(
                ROOT_ELEMENT.to_string(),
                ElementDescriptor {
                    name: ROOT_ELEMENT.to_string(),
                    display_name: accessor_name(ROOT_ELEMENT),
                    description,
                    owner: uri.to_string(),
                    effective_args: selector.args.clone(),
                    category: self.category_of(&type_ref),
                    capabilities: definition.root_type.as_ref().map(|t| t.capabilities()).unwrap_or_default(),
                    type_ref,
                    returns_list: selector.return_all,
                    selector,
                    filter: None,
                    parent: None,
                    public: definition.expose_root_element,
                    is_in_shadow_root: false,
                    is_root: true,
                },
            );
        }

        self.collect_elements(uri, &definition.elements, None, &[], false, &mut elements);
        if let Some(shadow) = &definition.shadow {
            self.collect_elements(uri, &shadow.elements, None, &[], true, &mut elements);
        }
        elements
    }

    /// Depth-first walk; `inherited` is copied per subtree so siblings never share args
    fn collect_elements(
        &self,
        uri: &str,
        definitions: &[ElementDef],
        parent: Option<&str>,
        inherited: &[ArgDescriptor],
        in_shadow: bool,
        out: &mut Elements,
    ) {
        for definition in definitions {
            let descriptor = self.element_descriptor(uri, definition, parent, inherited, in_shadow);

            let mut child_args = inherited.to_vec();
            child_args.extend(descriptor.selector.args.iter().cloned());

            if out.contains_key(&definition.name) {
                log::warn!("Duplicate element '{}' in {}; keeping the last declaration", definition.name, uri);
            }
            out.insert(definition.name.clone(), descriptor);

            self.collect_elements(uri, &definition.elements, Some(&definition.name), &child_args, false, out);
            if let Some(shadow) = &definition.shadow {
                self.collect_elements(uri, &shadow.elements, Some(&definition.name), &child_args, true, out);
            }
        }
    }

    fn element_descriptor(
        &self,
        uri: &str,
        definition: &ElementDef,
        parent: Option<&str>,
        inherited: &[ArgDescriptor],
        in_shadow: bool,
    ) -> ElementDescriptor {
        let selector = definition
            .selector
            .as_ref()
            .map(|selector| SelectorDescriptor {
                css: selector.css.clone(),
                return_all: selector.return_all,
                args: selector.args.iter().map(|arg| arg.descriptor()).collect(),
            })
            .unwrap_or_default();

        let filter = definition.filter.as_ref().map(|filter| {
            let matcher = filter.matcher.as_ref();
            FilterDescriptor {
                apply: filter.apply.clone(),
                apply_args: filter
                    .apply_args
                    .iter()
                    .filter_map(|arg| arg.value.as_ref())
                    .map(|value| value.as_str().map_or_else(|| value.to_string(), str::to_string))
                    .collect(),
                matcher: matcher.map_or(MatcherType::StringEquals, |m| MatcherType::parse(&m.matcher_type)),
                matcher_args: matcher
                    .map(|m| m.args.iter().map(|arg| arg.descriptor()).collect())
                    .unwrap_or_default(),
                find_first: filter.find_first,
            }
        });

        let mut effective_args = inherited.to_vec();
        effective_args.extend(selector.args.iter().cloned());
        if let Some(filter) = &filter {
            effective_args.extend(filter.matcher_args.iter().cloned());
        }

        let type_ref = definition.element_type.as_ref().map_or(TypeRef::Basic, |t| t.type_ref());

        ElementDescriptor {
            name: definition.name.clone(),
            display_name: accessor_name(&definition.name),
            description: definition.description.as_ref().map(|d| d.text()).unwrap_or_default(),
            owner: uri.to_string(),
            effective_args,
            category: self.category_of(&type_ref),
            capabilities: definition.element_type.as_ref().map(|t| t.capabilities()).unwrap_or_default(),
            type_ref,
            // findFirst still reports a list when the selector returns all
            returns_list: selector.return_all || filter.as_ref().is_some_and(|f| f.find_first),
            selector,
            filter,
            parent: parent.map(str::to_string),
            public: definition.public,
            is_in_shadow_root: in_shadow,
            is_root: false,
        }
    }

    fn category_of(&self, type_ref: &TypeRef) -> Category {
        match type_ref {
            TypeRef::Container => Category::Container,
            TypeRef::PageObject(uri) if self.definitions.contains_key(uri) => Category::PageObject,
            _ => Category::Basic,
        }
    }

    fn element(&mut self, uri: &str, name: &str) -> Option<ElementDescriptor> {
        self.elements_of(uri)?.get(name).cloned()
    }

    fn has_method(&self, uri: &str, name: &str) -> bool {
        self.definitions
            .get(uri)
            .is_some_and(|definition| definition.methods.iter().any(|method| method.name == name))
    }

    /// Resolve a method of a page object; memoized, cycle-safe
    fn method(&mut self, uri: &str, name: &str) -> Option<MethodDescriptor> {
        let key = (uri.to_string(), name.to_string());
        if let Some(resolved) = self.methods.get(&key) {
            return Some(resolved.clone());
        }

        let definitions = self.definitions;
        let definition = definitions.get(uri)?.methods.iter().find(|method| method.name == name)?;

        if self.in_progress.contains(&key) {
            log::warn!("Method {}::{} is part of a reference cycle", uri, name);
            let mut placeholder = MethodDescriptor::new(
                uri,
                name,
                describe(definition.description.as_ref()).1,
                definition.args.iter().map(|arg| arg.descriptor()).collect(),
            );
            placeholder.state = ResolutionState::Cyclic;
            return Some(placeholder);
        }

        self.in_progress.insert(key.clone());
        let resolved = self.resolve_method(uri, definition);
        self.in_progress.remove(&key);

        self.methods.insert(key, resolved.clone());
        Some(resolved)
    }

    fn resolve_method(&mut self, uri: &str, definition: &MethodDef) -> MethodDescriptor {
        let mut descriptor = MethodDescriptor::new(
            uri,
            &definition.name,
            describe(definition.description.as_ref()).1,
            definition.args.iter().map(|arg| arg.descriptor()).collect(),
        );

        if let Some(return_type) = &definition.return_type {
            descriptor.type_ref = return_type.type_ref();
            return descriptor;
        }

        let mut current_uri = uri.to_string();
        let mut previous_type: Option<TypeRef> = None;

        for step in &definition.compose {
            if step.chain {
                if let Some(TypeRef::PageObject(target)) = &previous_type {
                    if self.elements_of(target).is_none() {
                        log::warn!(
                            "Method {}::{} chains to unknown page object {}",
                            uri,
                            definition.name,
                            target
                        );
                        descriptor.state = ResolutionState::Aborted;
                        break;
                    }
                    current_uri = target.clone();
                }
            }

            match self.process_step(&current_uri, step, definition) {
                Ok(outcome) => {
                    for element in outcome.elements {
                        let seen = descriptor
                            .elements
                            .iter()
                            .any(|e| e.owner == element.owner && e.name == element.name);
                        if !seen {
                            descriptor.elements.push(element);
                        }
                    }
                    if outcome.apply.is_some() {
                        descriptor.last_step_apply = outcome.apply;
                    }
                    if outcome.provisional {
                        descriptor.state = ResolutionState::Cyclic;
                    }
                    descriptor.type_ref = outcome.type_ref.clone();
                    previous_type = Some(outcome.type_ref);
                }
                Err(missing) => {
                    log::warn!(
                        "Method {}::{} references missing {:?} in {}",
                        uri,
                        definition.name,
                        missing,
                        current_uri
                    );
                    descriptor.state = ResolutionState::Aborted;
                    break;
                }
            }
        }

        let element_args: Vec<ArgDescriptor> = descriptor
            .elements
            .iter()
            .flat_map(|element| element.effective_args.iter().cloned())
            .collect();
        descriptor.effective_args.extend(element_args);
        descriptor
    }

    fn process_step(&mut self, uri: &str, step: &StepDef, method: &MethodDef) -> Result<StepOutcome, MissingReference> {
        if step.apply_external.is_some() {
            let type_ref = step
                .return_type
                .as_ref()
                .or(method.return_value.as_ref())
                .map_or(TypeRef::VOID, |t| t.type_ref());
            return Ok(StepOutcome {
                type_ref,
                elements: Vec::new(),
                apply: None,
                provisional: false,
            });
        }

        let mut elements = Vec::new();
        let mut element_type = None;
        if let Some(name) = &step.element {
            match name.as_str() {
                ELEMENT_DOCUMENT => element_type = Some(TypeRef::Document),
                ELEMENT_NAVIGATION => element_type = Some(TypeRef::Navigation),
                _ => {
                    let mut element = self
                        .element(uri, name)
                        .ok_or_else(|| MissingReference::Element(name.clone()))?;
                    if element.type_ref == TypeRef::Container {
                        if let Some(content) = step.args.first().and_then(|arg| arg.page_object_literal()) {
                            element.type_ref = TypeRef::PageObject(content.to_string());
                        }
                    }
                    element_type = Some(element.type_ref.clone());
                    elements.push(element);
                }
            }
        }

        let Some(apply) = &step.apply else {
            return Ok(StepOutcome {
                type_ref: element_type.unwrap_or(TypeRef::Basic),
                elements,
                apply: None,
                provisional: false,
            });
        };

        let mut outcome = StepOutcome {
            type_ref: TypeRef::VOID,
            elements,
            apply: Some(apply.clone()),
            provisional: false,
        };

        match apply.as_str() {
            APPLY_WAIT_FOR => {
                let predicate = MethodDef {
                    name: format!("{}.{}", method.name, APPLY_WAIT_FOR),
                    compose: step
                        .args
                        .first()
                        .and_then(|arg| arg.predicate.clone())
                        .unwrap_or_default(),
                    return_value: method.return_value.clone(),
                    ..Default::default()
                };
                let resolved = self.resolve_method(uri, &predicate);
                outcome.type_ref = resolved.type_ref;
                outcome.elements.extend(resolved.elements);
                outcome.provisional = resolved.state == ResolutionState::Cyclic;
                if resolved.state == ResolutionState::Aborted {
                    return Err(MissingReference::Operation(predicate.name));
                }
            }
            APPLY_RETURN_SELF => {}
            _ => {
                // A page-object element applies its own page object's methods
                let target = match &element_type {
                    Some(TypeRef::PageObject(target)) if self.has_method(target, apply) => target.clone(),
                    _ => uri.to_string(),
                };

                if self.has_method(&target, apply) {
                    let resolved = self
                        .method(&target, apply)
                        .ok_or_else(|| MissingReference::Operation(apply.clone()))?;
                    outcome.type_ref = resolved.type_ref;
                    outcome.elements.extend(resolved.elements);
                    outcome.provisional = resolved.state == ResolutionState::Cyclic;
                } else if let Some(intrinsic) = catalog().find(apply) {
                    outcome.type_ref = intrinsic.type_ref.clone();
                } else if !self.definitions.contains_key(&target) {
                    return Err(MissingReference::PageObject(target));
                } else {
                    return Err(MissingReference::Operation(apply.clone()));
                }
            }
        }

        Ok(outcome)
    }
}

fn describe(description: Option<&DescriptionDef>) -> (Option<String>, String) {
    match description {
        Some(description) => (description.author().map(str::to_string), description.text()),
        None => (None, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn definitions(entries: Vec<(&str, Value)>) -> IndexMap<String, PageObjectDefinition> {
        entries
            .into_iter()
            .map(|(uri, value)| {
                let definition = PageObjectDefinition::from_json(uri, &value.to_string()).unwrap();
                (uri.to_string(), definition)
            })
            .collect()
    }

    fn resolve(entries: Vec<(&str, Value)>) -> IndexMap<String, ParsedPageObject> {
        let definitions = definitions(entries);
        Resolver::new(&definitions).resolve_all()
    }

    fn arg_names(args: &[ArgDescriptor]) -> Vec<&str> {
        args.iter().map(|arg| arg.name.as_str()).collect()
    }

    #[test]
    fn test_simple_click_method() {
        let parsed = resolve(vec![(
            "a/button",
            json!({
                "selector": {"css": ".a-root"},
                "elements": [{"name": "btn", "type": ["clickable"], "selector": {"css": ".btn"}}],
                "methods": [{"name": "clickIt", "compose": [{"element": "btn", "apply": "click"}]}]
            }),
        )]);

        let page = &parsed["a/button"];
        assert_eq!(page.elements.keys().collect::<Vec<_>>(), vec!["root", "btn"]);
        assert!(page.elements["root"].is_root);
        assert_eq!(page.elements["btn"].capabilities, vec!["clickable"]);

        let click = &page.methods["clickIt"];
        assert!(click.type_ref.is_void());
        assert_eq!(click.elements.len(), 1);
        assert_eq!(click.elements[0].name, "btn");
        assert!(click.effective_args.is_empty());
        assert_eq!(click.last_step_apply.as_deref(), Some("click"));
        assert_eq!(click.state, ResolutionState::Complete);
    }

    #[test]
    fn test_effective_args_accumulate_down_the_tree() {
        let parsed = resolve(vec![(
            "a/table",
            json!({
                "elements": [{
                    "name": "row",
                    "selector": {"css": "tr:nth-child(%d)", "args": [{"name": "rowIndex", "type": "number"}]},
                    "elements": [{
                        "name": "cell",
                        "selector": {"css": "td[data-col='%s']", "args": [{"name": "column"}]},
                        "filter": {"apply": "getText", "matcher": {"type": "stringContains", "args": [{"name": "text"}]}}
                    }],
                    "shadow": {"elements": [{"name": "badge", "selector": {"css": ".badge"}}]}
                }, {
                    "name": "footer",
                    "selector": {"css": "tfoot"}
                }]
            }),
        )]);

        let page = &parsed["a/table"];
        assert!(!page.elements.contains_key("root"));
        assert_eq!(arg_names(&page.elements["row"].effective_args), vec!["rowIndex"]);
        assert_eq!(arg_names(&page.elements["cell"].effective_args), vec!["rowIndex", "column", "text"]);
        assert_eq!(arg_names(&page.elements["badge"].effective_args), vec!["rowIndex"]);
        assert!(page.elements["footer"].effective_args.is_empty());

        assert_eq!(page.elements["cell"].parent.as_deref(), Some("row"));
        assert!(page.elements["badge"].is_in_shadow_root);
        assert!(!page.elements["cell"].is_in_shadow_root);
        assert_eq!(page.elements["cell"].own_arg_count(), 2);
    }

    #[test]
    fn test_returns_list_from_selector_or_find_first() {
        let parsed = resolve(vec![(
            "a/rows",
            json!({
                "elements": [
                    {"name": "all", "selector": {"css": "li", "returnAll": true}},
                    {
                        "name": "first",
                        "selector": {"css": "li"},
                        "filter": {"apply": "getText", "matcher": {"type": "stringEquals", "args": [{"name": "label"}]}, "findFirst": true}
                    },
                    {"name": "single", "selector": {"css": "li"}}
                ]
            }),
        )]);

        let page = &parsed["a/rows"];
        assert!(page.elements["all"].returns_list);
        assert!(page.elements["first"].returns_list);
        assert!(!page.elements["single"].returns_list);
    }

    #[test]
    fn test_explicit_return_type_skips_steps() {
        let parsed = resolve(vec![(
            "a/form",
            json!({
                "elements": [{"name": "input", "selector": {"css": "input", "args": [{"name": "id"}]}}],
                "methods": [{
                    "name": "read",
                    "args": [{"name": "field", "type": "string"}],
                    "returnType": "string",
                    "compose": [{"element": "input", "apply": "notAThing"}, {"chain": true}]
                }]
            }),
        )]);

        let read = &parsed["a/form"].methods["read"];
        assert_eq!(read.type_ref, TypeRef::parse("string"));
        assert!(read.elements.is_empty());
        assert_eq!(arg_names(&read.effective_args), vec!["field"]);
        assert_eq!(read.state, ResolutionState::Complete);
    }

    #[test]
    fn test_method_args_follow_declared_args() {
        let parsed = resolve(vec![(
            "a/grid",
            json!({
                "elements": [
                    {"name": "row", "selector": {"css": "tr:nth-child(%d)", "args": [{"name": "row", "type": "number"}]},
                     "elements": [{"name": "input", "type": ["editable"], "selector": {"css": "input[name='%s']", "args": [{"name": "field"}]}}]},
                    {"name": "save", "selector": {"css": ".save"}}
                ],
                "methods": [{
                    "name": "fill",
                    "args": [{"name": "text", "type": "string"}],
                    "compose": [
                        {"element": "input", "apply": "setText", "args": [{"name": "text"}]},
                        {"element": "save", "apply": "click"},
                        {"element": "input", "apply": "getValue"}
                    ]
                }]
            }),
        )]);

        let fill = &parsed["a/grid"].methods["fill"];
        assert_eq!(arg_names(&fill.effective_args), vec!["text", "row", "field"]);
        assert_eq!(fill.elements.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(), vec!["input", "save"]);
        assert_eq!(fill.type_ref, TypeRef::parse("string"));
        assert_eq!(fill.last_step_apply.as_deref(), Some("getValue"));
    }

    #[test]
    fn test_chain_pivots_to_target_page_object() {
        let parsed = resolve(vec![
            (
                "a/list",
                json!({
                    "elements": [{"name": "item", "type": "a/item", "selector": {"css": ".item"}}],
                    "methods": [{
                        "name": "itemLabel",
                        "compose": [
                            {"element": "item"},
                            {"chain": true, "element": "label", "apply": "getText"}
                        ]
                    }, {
                        "name": "notChained",
                        "compose": [
                            {"element": "item", "apply": "getText"},
                            {"chain": true, "element": "label"}
                        ]
                    }]
                }),
            ),
            (
                "a/item",
                json!({
                    "selector": {"css": "li"},
                    "elements": [{"name": "label", "selector": {"css": ".label"}}]
                }),
            ),
        ]);

        let list = &parsed["a/list"];
        assert_eq!(list.elements["item"].category, Category::PageObject);

        let label = &list.methods["itemLabel"];
        assert_eq!(label.type_ref, TypeRef::parse("string"));
        assert_eq!(label.elements.len(), 2);
        assert_eq!(label.elements[1].owner, "a/item");
        assert_eq!(label.state, ResolutionState::Complete);

        // getText returns a string, so the chain stays on a/list where "label" does not exist
        let not_chained = &list.methods["notChained"];
        assert_eq!(not_chained.state, ResolutionState::Aborted);
        assert_eq!(not_chained.elements.len(), 1);
    }

    #[test]
    fn test_chain_to_unknown_page_object_aborts_only_that_method() {
        let parsed = resolve(vec![(
            "a/page",
            json!({
                "elements": [
                    {"name": "ghost", "type": "a/missing", "selector": {"css": ".ghost"}},
                    {"name": "btn", "selector": {"css": "button"}}
                ],
                "methods": [
                    {"name": "broken", "compose": [{"element": "ghost"}, {"chain": true, "apply": "open"}]},
                    {"name": "fine", "compose": [{"element": "btn", "apply": "click"}]}
                ]
            }),
        )]);

        let page = &parsed["a/page"];
        assert_eq!(page.elements["ghost"].category, Category::Basic);
        assert_eq!(page.methods["broken"].state, ResolutionState::Aborted);
        assert_eq!(page.methods["broken"].type_ref, TypeRef::PageObject("a/missing".into()));
        assert_eq!(page.methods["fine"].state, ResolutionState::Complete);
    }

    #[test]
    fn test_return_self_is_void_and_methods_compose() {
        let parsed = resolve(vec![(
            "a/dialog",
            json!({
                "elements": [
                    {"name": "title", "selector": {"css": "h2"}},
                    {"name": "close", "selector": {"css": ".close"}}
                ],
                "methods": [
                    {"name": "getHeading", "compose": [{"element": "title", "apply": "getText"}]},
                    {"name": "heading", "compose": [{"element": "close", "apply": "focus"}, {"apply": "getHeading"}]},
                    {"name": "self", "compose": [{"element": "title", "apply": "getText"}, {"apply": "returnSelf"}]}
                ]
            }),
        )]);

        let page = &parsed["a/dialog"];
        let heading = &page.methods["heading"];
        assert_eq!(heading.type_ref, TypeRef::parse("string"));
        assert_eq!(heading.elements.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(), vec!["close", "title"]);
        assert_eq!(heading.last_step_apply.as_deref(), Some("getHeading"));

        assert!(page.methods["self"].type_ref.is_void());
    }

    #[test]
    fn test_wait_for_predicate_types_the_step() {
        let parsed = resolve(vec![(
            "a/spinner",
            json!({
                "elements": [{"name": "spinner", "selector": {"css": ".spinner"}}],
                "methods": [{
                    "name": "waitForSpinner",
                    "compose": [{
                        "apply": "waitFor",
                        "args": [{"type": "function", "predicate": [{"element": "spinner", "apply": "isVisible"}]}]
                    }]
                }]
            }),
        )]);

        let wait = &parsed["a/spinner"].methods["waitForSpinner"];
        assert_eq!(wait.type_ref, TypeRef::parse("boolean"));
        assert_eq!(wait.elements[0].name, "spinner");
        assert_eq!(wait.last_step_apply.as_deref(), Some("waitFor"));
    }

    #[test]
    fn test_container_typed_by_page_object_argument() {
        let parsed = resolve(vec![
            (
                "a/host",
                json!({
                    "elements": [{"name": "content", "type": "container", "selector": {"css": ".slot"}}],
                    "methods": [{
                        "name": "getContent",
                        "compose": [{"element": "content", "args": [{"type": "pageObject", "value": "a/card"}]}]
                    }, {
                        "name": "getRaw",
                        "compose": [{"element": "content"}]
                    }]
                }),
            ),
            ("a/card", json!({"selector": {"css": ".card"}})),
        ]);

        let host = &parsed["a/host"];
        assert_eq!(host.elements["content"].category, Category::Container);
        assert_eq!(host.methods["getContent"].type_ref, TypeRef::PageObject("a/card".into()));
        assert_eq!(host.methods["getContent"].elements[0].type_ref, TypeRef::PageObject("a/card".into()));
        assert_eq!(host.methods["getRaw"].type_ref, TypeRef::Container);
        // the stored element keeps its container type
        assert_eq!(host.elements["content"].type_ref, TypeRef::Container);
    }

    #[test]
    fn test_apply_external_uses_declared_return() {
        let parsed = resolve(vec![(
            "a/utility",
            json!({
                "methods": [
                    {"name": "compute", "return": "number", "compose": [{"applyExternal": {"type": "utils/x", "invoke": "run"}}]},
                    {"name": "fireAndForget", "compose": [{"applyExternal": {"type": "utils/x", "invoke": "run"}}]}
                ]
            }),
        )]);

        let page = &parsed["a/utility"];
        assert_eq!(page.methods["compute"].type_ref, TypeRef::parse("number"));
        assert!(page.methods["fireAndForget"].type_ref.is_void());
        assert!(page.methods["compute"].last_step_apply.is_none());
    }

    #[test]
    fn test_method_cycle_terminates() {
        let parsed = resolve(vec![(
            "a/loop",
            json!({
                "elements": [{"name": "btn", "selector": {"css": "button"}}],
                "methods": [
                    {"name": "ping", "compose": [{"element": "btn", "apply": "click"}, {"apply": "pong"}]},
                    {"name": "pong", "compose": [{"apply": "ping"}]},
                    {"name": "me", "compose": [{"apply": "me"}]}
                ]
            }),
        )]);

        let page = &parsed["a/loop"];
        assert_eq!(page.methods["ping"].state, ResolutionState::Cyclic);
        assert_eq!(page.methods["pong"].state, ResolutionState::Cyclic);
        assert_eq!(page.methods["me"].state, ResolutionState::Cyclic);
        assert!(page.methods["me"].type_ref.is_void());
    }

    #[test]
    fn test_cross_page_object_cycle_terminates() {
        let parsed = resolve(vec![
            (
                "a/left",
                json!({
                    "elements": [{"name": "right", "type": "a/right", "selector": {"css": ".right"}}],
                    "methods": [{"name": "go", "compose": [{"element": "right", "apply": "back"}]}]
                }),
            ),
            (
                "a/right",
                json!({
                    "elements": [{"name": "left", "type": "a/left", "selector": {"css": ".left"}}],
                    "methods": [{"name": "back", "compose": [{"element": "left", "apply": "go"}]}]
                }),
            ),
        ]);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["a/left"].methods["go"].state, ResolutionState::Cyclic);
    }

    #[test]
    fn test_missing_intrinsic_aborts_method() {
        let parsed = resolve(vec![(
            "a/page",
            json!({
                "elements": [{"name": "btn", "selector": {"css": "button"}}],
                "methods": [{"name": "fly", "compose": [{"element": "btn", "apply": "fly"}, {"element": "btn", "apply": "click"}]}]
            }),
        )]);

        let fly = &parsed["a/page"].methods["fly"];
        assert_eq!(fly.state, ResolutionState::Aborted);
        assert!(fly.elements.is_empty());
    }

    #[test]
    fn test_document_and_navigation_are_not_looked_up() {
        let parsed = resolve(vec![(
            "a/page",
            json!({
                "methods": [
                    {"name": "url", "compose": [{"element": "document", "apply": "getUrl"}]},
                    {"name": "goBack", "compose": [{"element": "navigation", "apply": "back"}]}
                ]
            }),
        )]);

        let page = &parsed["a/page"];
        assert_eq!(page.methods["url"].type_ref, TypeRef::parse("string"));
        assert!(page.methods["url"].elements.is_empty());
        assert!(page.methods["goBack"].type_ref.is_void());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let entries = || {
            vec![
                ("a/b", json!({"elements": [{"name": "x", "type": "a/c", "selector": {"css": ".x"}}],
                               "methods": [{"name": "m", "compose": [{"element": "x"}, {"chain": true, "element": "y"}]}]})),
                ("a/c", json!({"selector": {"css": ".c"}, "elements": [{"name": "y", "selector": {"css": ".y", "args": [{"name": "n"}]}}]})),
            ]
        };

        let definitions = definitions(entries());
        let first = Resolver::new(&definitions).resolve_all();
        let second = Resolver::new(&definitions).resolve_all();
        assert_eq!(first, second);
        assert_eq!(arg_names(&first["a/b"].methods["m"].effective_args), vec!["n"]);
    }

    #[test]
    fn test_description_and_author() {
        let parsed = resolve(vec![(
            "a/page",
            json!({"description": {"author": "QA", "text": ["Line one", "line two"]}, "selector": {"css": "main"}, "exposeRootElement": true}),
        )]);

        let page = &parsed["a/page"];
        assert_eq!(page.author.as_deref(), Some("QA"));
        assert_eq!(page.description, "Line one line two");
        assert!(page.elements["root"].public);
        assert_eq!(page.elements["root"].display_name, "getRoot");
    }
}
