//! CSS selector parsing and matching against a [`DomTree`] snapshot
//!
//! Supports the subset of selectors page-object definitions use in practice:
//! selector lists, the four combinators, type/universal/id/class selectors,
//! attribute selectors (`[a]`, `=`, `~=`, `^=`, `$=`, `*=`, `|=`), the
//! structural pseudo-classes (`:nth-child()`, `:nth-last-child()`, `:nth-of-type()`,
//! `:nth-last-of-type()`, `:first-child`, `:last-child`, `:only-child`, the
//! matching `-of-type` forms and `:empty`) and `:not()`.
//! Matching never crosses a shadow boundary.

use crate::dom::tree::{DomTree, NodeId};
use crate::error::{InspectorError, Result};
use std::str::FromStr;

/// A parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    /// Left to right; `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    /// Lowercased tag name; `None` for `*` or an implied universal selector
    tag: Option<String>,
    simple: Vec<Simple>,
}

#[derive(Debug, Clone, PartialEq)]
enum Simple {
    Id(String),
    Class(String),
    Attribute { name: String, test: Option<(AttrOp, String)> },
    /// `An+B` position, counted among same-tag siblings and/or from the end
    Nth { a: i64, b: i64, of_type: bool, from_end: bool },
    Only { of_type: bool },
    Empty,
    Not(Box<Compound>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self> {
        Parser::new(input).parse_list()
    }

    /// Check whether the element matches any selector in the list
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.matches_at(tree, node, selector.compounds.len() - 1))
    }
}

impl FromStr for SelectorList {
    type Err = InspectorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl ComplexSelector {
    fn matches_at(&self, tree: &DomTree, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent_element(node)
                .is_some_and(|parent| self.matches_at(tree, parent, index - 1)),
            Combinator::Descendant => {
                let mut current = tree.parent_element(node);
                while let Some(ancestor) = current {
                    if self.matches_at(tree, ancestor, index - 1) {
                        return true;
                    }
                    current = tree.parent_element(ancestor);
                }
                false
            }
            Combinator::NextSibling => tree
                .previous_sibling(node)
                .is_some_and(|sibling| self.matches_at(tree, sibling, index - 1)),
            Combinator::SubsequentSibling => {
                let mut current = tree.previous_sibling(node);
                while let Some(sibling) = current {
                    if self.matches_at(tree, sibling, index - 1) {
                        return true;
                    }
                    current = tree.previous_sibling(sibling);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(node) = tree.element(id) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !node.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.simple.iter().all(|simple| simple.matches(tree, id))
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.simple.is_empty()
    }
}

impl Simple {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        match self {
            Simple::Id(expected) => tree.attribute(id, "id") == Some(expected.as_str()),
            Simple::Class(class) => tree
                .attribute(id, "class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            Simple::Attribute { name, test } => {
                let Some(actual) = tree.attribute(id, name) else {
                    return false;
                };
                match test {
                    None => true,
                    Some((op, expected)) => op.test(actual, expected),
                }
            }
            Simple::Nth { a, b, of_type, from_end } => position(tree, id, *of_type).is_some_and(|(position, count)| {
                let index = if *from_end { count + 1 - position } else { position };
                nth_matches(*a, *b, index as i64)
            }),
            Simple::Only { of_type } => position(tree, id, *of_type).is_some_and(|(_, count)| count == 1),
            Simple::Empty => tree
                .node(id)
                .is_some_and(|node| node.children.is_empty() && node.text_content.as_deref().is_none_or(str::is_empty)),
            Simple::Not(inner) => !inner.matches(tree, id),
        }
    }
}

impl AttrOp {
    fn test(self, actual: &str, expected: &str) -> bool {
        match self {
            AttrOp::Equals => actual == expected,
            AttrOp::Includes => actual.split_whitespace().any(|word| word == expected),
            AttrOp::DashMatch => actual == expected || actual.starts_with(&format!("{}-", expected)),
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
            AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}

fn position(tree: &DomTree, id: NodeId, of_type: bool) -> Option<(usize, usize)> {
    if of_type {
        tree.type_position(id)
    } else {
        tree.sibling_position(id)
    }
}

/// `An+B` test for a 1-based sibling position
fn nth_matches(a: i64, b: i64, position: i64) -> bool {
    if a == 0 {
        return position == b;
    }
    let offset = position - b;
    offset % a == 0 && offset / a >= 0
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> InspectorError {
        InspectorError::InvalidSelector {
            selector: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(mut self) -> Result<SelectorList> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector { compounds, combinators })
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut universal = false;

        if self.eat('*') {
            universal = true;
        } else if self.peek().is_some_and(is_ident_start) {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.simple.push(Simple::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.simple.push(Simple::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.simple.push(self.parse_attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.simple.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if compound.is_empty() && !universal {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                let escaped = self.peek().ok_or_else(|| self.error("dangling escape"))?;
                ident.push(escaped);
                self.pos += 1;
            } else if is_ident_char(c) {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(ident)
    }

    fn parse_attribute(&mut self) -> Result<Simple> {
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();

        if self.eat(']') {
            return Ok(Simple::Attribute { name, test: None });
        }

        let op = match self.peek() {
            Some('=') => AttrOp::Equals,
            Some('~') => AttrOp::Includes,
            Some('|') => AttrOp::DashMatch,
            Some('^') => AttrOp::Prefix,
            Some('$') => AttrOp::Suffix,
            Some('*') => AttrOp::Substring,
            _ => return Err(self.error("expected an attribute operator")),
        };
        self.pos += 1;
        if op != AttrOp::Equals && !self.eat('=') {
            return Err(self.error("expected '=' in attribute operator"));
        }

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let mut value = String::new();
                loop {
                    match self.peek() {
                        None => return Err(self.error("unterminated string")),
                        Some(c) if c == quote => {
                            self.pos += 1;
                            break;
                        }
                        Some('\\') => {
                            self.pos += 1;
                            if let Some(c) = self.peek() {
                                value.push(c);
                                self.pos += 1;
                            }
                        }
                        Some(c) => {
                            value.push(c);
                            self.pos += 1;
                        }
                    }
                }
                value
            }
            _ => self.parse_ident()?,
        };

        self.skip_whitespace();
        // case-sensitivity flags are accepted and ignored
        if self.peek().is_some_and(|c| c == 'i' || c == 's') {
            self.pos += 1;
            self.skip_whitespace();
        }
        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }

        Ok(Simple::Attribute {
            name,
            test: Some((op, value)),
        })
    }

    fn parse_pseudo(&mut self) -> Result<Simple> {
        if self.peek() == Some(':') {
            return Err(self.error("pseudo-elements are not supported"));
        }
        let name = self.parse_ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => Ok(first(false, false)),
            "last-child" => Ok(first(false, true)),
            "first-of-type" => Ok(first(true, false)),
            "last-of-type" => Ok(first(true, true)),
            "only-child" => Ok(Simple::Only { of_type: false }),
            "only-of-type" => Ok(Simple::Only { of_type: true }),
            "empty" => Ok(Simple::Empty),
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                let argument = self.parse_parenthesized()?;
                let (a, b) = parse_nth(&argument)
                    .ok_or_else(|| self.error(format!("invalid {} argument '{}'", name, argument)))?;
                Ok(Simple::Nth {
                    a,
                    b,
                    of_type: name.ends_with("of-type"),
                    from_end: name.starts_with("nth-last"),
                })
            }
            "not" => {
                if !self.eat('(') {
                    return Err(self.error("expected '(' after :not"));
                }
                self.skip_whitespace();
                let inner = self.parse_compound()?;
                self.skip_whitespace();
                if !self.eat(')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(Simple::Not(Box::new(inner)))
            }
            other => Err(self.error(format!("unsupported pseudo-class ':{}'", other))),
        }
    }

    fn parse_parenthesized(&mut self) -> Result<String> {
        if !self.eat('(') {
            return Err(self.error("expected '('"));
        }
        let mut argument = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("expected ')'")),
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    argument.push(c);
                    self.pos += 1;
                }
            }
        }
        Ok(argument)
    }
}

fn first(of_type: bool, from_end: bool) -> Simple {
    Simple::Nth { a: 0, b: 1, of_type, from_end }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

/// Parse an `An+B` expression
fn parse_nth(argument: &str) -> Option<(i64, i64)> {
    let compact: String = argument
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        _ => {}
    }

    match compact.split_once('n') {
        None => compact.parse().ok().map(|b| (0, b)),
        Some((a, b)) => {
            let a = match a {
                "" | "+" => 1,
                "-" => -1,
                other => other.parse().ok()?,
            };
            let b = match b {
                "" => 0,
                other => other.strip_prefix('+').unwrap_or(other).parse().ok()?,
            };
            Some((a, b))
        }
    }
}
