//! DOM snapshot module
//!
//! This module captures the structure of a loaded page so page-object
//! elements can be located in it. It includes:
//! - ElementNode: serialized element as captured from the page
//! - DomTree: arena of the captured document, with shadow roots
//! - SelectorList: CSS selector engine used for `querySelectorAll`

pub mod element;
pub mod selector;
pub mod tree;

pub use element::ElementNode;
pub use selector::SelectorList;
pub use tree::{DomNode, DomTree, NodeId, NodeKind};

use crate::error::Result;
use headless_chrome::Tab;
use std::sync::Arc;

/// Capture the DOM of a browser tab
pub fn capture_dom(tab: &Arc<Tab>) -> Result<DomTree> {
    DomTree::from_tab(tab)
}
