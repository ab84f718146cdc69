//! Filter evaluation for `returnAll` elements

use crate::dom::{DomTree, NodeId};
use crate::pageobject::database::DatabaseSnapshot;
use crate::pageobject::member::{ElementDescriptor, FilterDescriptor, MatcherType};
use crate::pageobject::types::TypeRef;
use std::collections::HashSet;

const DEFAULT_APPLY: &str = "getText";

/// Terminal operation of a filter and the child elements leading to it
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPlan {
    pub intrinsic: String,
    pub elements: Vec<ElementDescriptor>,
}

impl FilterPlan {
    /// Follow a filter's `apply` through page-object methods down to an intrinsic
    ///
    /// An element typed as a page object applies that page object's methods first,
    /// then falls back to methods of the page object declaring the element.
    pub fn build(database: &DatabaseSnapshot, element: &ElementDescriptor, filter: &FilterDescriptor) -> Self {
        let mut intrinsic = filter.apply.clone().unwrap_or_else(|| DEFAULT_APPLY.to_string());
        let mut uri = match &element.type_ref {
            TypeRef::PageObject(target) if database.method(target, &intrinsic).is_some() => target.clone(),
            _ => element.owner.clone(),
        };
        let mut elements = Vec::new();
        let mut visited = HashSet::new();

        while visited.insert((uri.clone(), intrinsic.clone())) {
            let Some(method) = database.method(&uri, &intrinsic) else {
                break;
            };
            elements.extend(method.elements.iter().cloned());

            let next = method.last_step_apply.clone().unwrap_or_else(|| DEFAULT_APPLY.to_string());
            if let Some(last) = method.elements.last() {
                uri = match &last.type_ref {
                    TypeRef::PageObject(target) if database.method(target, &next).is_some() => target.clone(),
                    _ => last.owner.clone(),
                };
            }
            intrinsic = next;
        }

        Self { intrinsic, elements }
    }
}

/// Value read from a node by a filter's terminal operation
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Flag(bool),
}

/// Read the value an intrinsic would return for a node
pub fn read_value(dom: &DomTree, node: NodeId, intrinsic: &str, apply_args: &[String]) -> Option<FilterValue> {
    let element = dom.element(node)?;
    let attribute = |name: &str| element.attributes.get(name).cloned();

    let value = match intrinsic {
        "getText" => FilterValue::Text(dom.text(node).unwrap_or_default()),
        "getTitle" => FilterValue::Text(attribute("title")?),
        "getValue" => FilterValue::Text(attribute("value")?),
        "getClassAttribute" => FilterValue::Text(attribute("class")?),
        "getAttribute" => FilterValue::Text(attribute(apply_args.first()?.as_str())?),
        "isVisible" => FilterValue::Flag(element.is_visible),
        "isPresent" => FilterValue::Flag(true),
        "isEnabled" => FilterValue::Flag(!element.attributes.contains_key("disabled")),
        other => {
            log::debug!("Filter apply '{}' cannot be evaluated on a snapshot", other);
            return None;
        }
    };
    Some(value)
}

/// Compare a read value against the matcher
pub fn matches(matcher: &MatcherType, value: &FilterValue, expected: Option<&str>) -> bool {
    match (matcher, value) {
        (MatcherType::StringEquals, FilterValue::Text(text)) => expected.is_some_and(|e| text == e),
        (MatcherType::StringContains, FilterValue::Text(text)) => expected.is_some_and(|e| text.contains(e)),
        (MatcherType::IsTrue, FilterValue::Flag(flag)) => *flag,
        (MatcherType::IsFalse, FilterValue::Flag(flag)) => !*flag,
        _ => false,
    }
}
