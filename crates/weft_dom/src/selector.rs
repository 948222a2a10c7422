//! CSS-subset selector parsing and matching
//!
//! Supported grammar: type selectors, `*`, `#id`, `.class`, `[attr]`,
//! `[attr=value]` (value optionally quoted), compounds of those, and
//! the descendant combinator (whitespace). Parsed once into a
//! [`Selector`]; matching and querying operate on the structured form.
//!
//! Queries are snapshots: mutating the arena after a query does not
//! change an already returned result set.

use crate::node::{Dom, NodeId};
use thiserror::Error;

/// Selector parse failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("empty {0} name in selector")]
    EmptyName(&'static str),

    #[error("unclosed attribute selector")]
    UnclosedAttribute,

    #[error("unexpected character {0:?} in selector")]
    UnexpectedChar(char),
}

/// One simple-selector within a compound
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Tag(String),
    Universal,
    Id(String),
    Class(String),
    AttrPresent(String),
    AttrEquals(String, String),
}

/// A compound selector: all parts must match one node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    parts: Vec<Part>,
}

impl Compound {
    fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        self.parts.iter().all(|part| match part {
            Part::Tag(tag) => dom.tag(node) == tag,
            Part::Universal => true,
            Part::Id(id) => dom.id(node) == id,
            Part::Class(class) => dom.has_class(node, class),
            Part::AttrPresent(name) => dom.attr(node, name).is_some(),
            Part::AttrEquals(name, value) => dom.attr(node, name) == Some(value.as_str()),
        })
    }
}

/// A parsed selector: compounds joined by the descendant combinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a selector string
    pub fn parse(input: &str) -> Result<Selector, SelectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut compounds = Vec::new();
        for chunk in trimmed.split_whitespace() {
            compounds.push(parse_compound(chunk)?);
        }
        Ok(Selector { compounds })
    }

    /// Whether `node` matches this selector, considering ancestor
    /// compounds through the descendant combinator
    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        let (last, rest) = match self.compounds.split_last() {
            Some(split) => split,
            None => return false,
        };
        if !last.matches(dom, node) {
            return false;
        }

        // Walk ancestors right-to-left over the remaining compounds.
        let mut cur = dom.parent(node);
        for compound in rest.iter().rev() {
            loop {
                let Some(n) = cur else {
                    return false;
                };
                cur = dom.parent(n);
                if compound.matches(dom, n) {
                    break;
                }
            }
        }
        true
    }
}

fn parse_compound(input: &str) -> Result<Compound, SelectorError> {
    let mut parts = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(i, c)) = chars.peek() {
        match c {
            '*' => {
                chars.next();
                parts.push(Part::Universal);
            }
            '#' => {
                chars.next();
                let name = take_ident(&mut chars, input);
                if name.is_empty() {
                    return Err(SelectorError::EmptyName("id"));
                }
                parts.push(Part::Id(name));
            }
            '.' => {
                chars.next();
                let name = take_ident(&mut chars, input);
                if name.is_empty() {
                    return Err(SelectorError::EmptyName("class"));
                }
                parts.push(Part::Class(name));
            }
            '[' => {
                chars.next();
                let close = input[i..]
                    .find(']')
                    .ok_or(SelectorError::UnclosedAttribute)?;
                let body = &input[i + 1..i + close];
                // Consume up to and including ']'.
                while let Some((j, _)) = chars.next() {
                    if j == i + close {
                        break;
                    }
                }
                parts.push(parse_attr(body)?);
            }
            c if is_ident_char(c) => {
                let name = take_ident(&mut chars, input);
                parts.push(Part::Tag(name.to_ascii_lowercase()));
            }
            c => return Err(SelectorError::UnexpectedChar(c)),
        }
    }

    if parts.is_empty() {
        return Err(SelectorError::Empty);
    }
    Ok(Compound { parts })
}

fn parse_attr(body: &str) -> Result<Part, SelectorError> {
    match body.split_once('=') {
        None => {
            let name = body.trim();
            if name.is_empty() {
                return Err(SelectorError::EmptyName("attribute"));
            }
            Ok(Part::AttrPresent(name.to_string()))
        }
        Some((name, value)) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(SelectorError::EmptyName("attribute"));
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Ok(Part::AttrEquals(name.to_string(), value.to_string()))
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    input: &str,
) -> String {
    let start = match chars.peek() {
        Some(&(i, _)) => i,
        None => return String::new(),
    };
    let mut end = start;
    while let Some(&(i, c)) = chars.peek() {
        if is_ident_char(c) {
            end = i + c.len_utf8();
            chars.next();
        } else {
            break;
        }
    }
    input[start..end].to_string()
}

impl Dom {
    /// First descendant of `scope` matching `selector`, in document
    /// order. The scope node itself is not a candidate.
    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    /// All descendants of `scope` matching `selector`, in document
    /// order. Snapshot at call time.
    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    /// First node in the whole document matching `selector`. Roots are
    /// candidates, unlike scoped queries.
    pub fn query_document(&self, selector: &Selector) -> Option<NodeId> {
        self.query_document_all(selector).into_iter().next()
    }

    /// All nodes in the whole document matching `selector`, tree by
    /// tree in creation order
    pub fn query_document_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut out = Vec::new();
        for root in self.roots() {
            if selector.matches(self, root) {
                out.push(root);
            }
            out.extend(self.query_all(root, selector));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Dom, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let child = dom.create_element("div");
        let grandchild = dom.create_element("span");
        dom.set_id(child, "child");
        dom.add_class(grandchild, "grandchild");
        dom.set_attr(grandchild, "attr", "foo");
        dom.append_child(root, child);
        dom.append_child(child, grandchild);
        (dom, root, child, grandchild)
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Selector::parse(""), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("#"), Err(SelectorError::EmptyName("id")));
        assert_eq!(Selector::parse("."), Err(SelectorError::EmptyName("class")));
        assert_eq!(
            Selector::parse("[attr"),
            Err(SelectorError::UnclosedAttribute)
        );
        assert!(matches!(
            Selector::parse("a>b"),
            Err(SelectorError::UnexpectedChar('>'))
        ));
    }

    #[test]
    fn test_tag_id_class_attr() {
        let (dom, _root, child, grandchild) = fixture();

        let by_tag = Selector::parse("span").unwrap();
        assert!(by_tag.matches(&dom, grandchild));
        assert!(!by_tag.matches(&dom, child));

        let by_id = Selector::parse("#child").unwrap();
        assert!(by_id.matches(&dom, child));

        let by_class = Selector::parse(".grandchild").unwrap();
        assert!(by_class.matches(&dom, grandchild));

        let by_attr = Selector::parse("[attr=foo]").unwrap();
        assert!(by_attr.matches(&dom, grandchild));
        let by_attr_quoted = Selector::parse("[attr=\"foo\"]").unwrap();
        assert!(by_attr_quoted.matches(&dom, grandchild));
        let by_presence = Selector::parse("[attr]").unwrap();
        assert!(by_presence.matches(&dom, grandchild));
        assert!(!by_presence.matches(&dom, child));
    }

    #[test]
    fn test_compound() {
        let (dom, _root, child, grandchild) = fixture();
        let sel = Selector::parse("span.grandchild[attr=foo]").unwrap();
        assert!(sel.matches(&dom, grandchild));
        assert!(!sel.matches(&dom, child));

        let wrong = Selector::parse("span.other").unwrap();
        assert!(!wrong.matches(&dom, grandchild));
    }

    #[test]
    fn test_descendant_combinator() {
        let (dom, _root, _child, grandchild) = fixture();
        assert!(Selector::parse("div span").unwrap().matches(&dom, grandchild));
        assert!(Selector::parse("#child span")
            .unwrap()
            .matches(&dom, grandchild));
        assert!(!Selector::parse("p span").unwrap().matches(&dom, grandchild));
    }

    #[test]
    fn test_query_scoped() {
        let (dom, root, child, grandchild) = fixture();

        let spans = Selector::parse("span").unwrap();
        assert_eq!(dom.query(root, &spans), Some(grandchild));
        assert_eq!(dom.query_all(root, &spans), vec![grandchild]);

        // Scope root itself is not a candidate.
        let divs = Selector::parse("div").unwrap();
        assert_eq!(dom.query(root, &divs), Some(child));

        let tables = Selector::parse("table").unwrap();
        assert_eq!(dom.query(root, &tables), None);
        assert!(dom.query_all(root, &tables).is_empty());
    }

    #[test]
    fn test_query_document_order() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let a = dom.create_element("span");
        let b = dom.create_element("span");
        let inner = dom.create_element("span");
        dom.append_child(root, a);
        dom.append_child(a, inner);
        dom.append_child(root, b);

        let spans = Selector::parse("span").unwrap();
        assert_eq!(dom.query_all(root, &spans), vec![a, inner, b]);
    }
}
