//! Scoped node selection
//!
//! Selectors passed to bind targets and [`Runtime::select`] understand
//! two scope prefixes on top of the plain grammar:
//!
//! ```text
//! :sandbox .btn      descendants of the object's sandbox
//! :bound(key) li     descendants of the nodes bound to `key`
//! ```
//!
//! A bare prefix (`":sandbox"`, `":bound(key)"`) selects the scope
//! nodes themselves. An unprefixed selector is implicitly scoped to the
//! sandbox when one is bound, and searches the whole document
//! otherwise. A named scope with nothing bound selects nothing rather
//! than erroring.

use weft_dom::{NodeId, Selector};

use crate::error::Result;
use crate::registry::ObjectId;
use crate::runtime::Runtime;

enum Scope<'a> {
    Implicit,
    Sandbox,
    Bound(&'a str),
}

/// Split an optional `:sandbox` / `:bound(key)` prefix off a selector
fn split_scope(sel: &str) -> (Scope<'_>, &str) {
    let sel = sel.trim();
    if let Some(rest) = sel.strip_prefix(":sandbox") {
        return (Scope::Sandbox, rest.trim_start());
    }
    if let Some(rest) = sel.strip_prefix(":bound(") {
        if let Some(close) = rest.find(')') {
            return (Scope::Bound(&rest[..close]), rest[close + 1..].trim_start());
        }
    }
    (Scope::Implicit, sel)
}

impl Runtime {
    /// First node the scoped selector resolves to, in document order
    pub fn select(&self, obj: ObjectId, sel: &str) -> Result<Option<NodeId>> {
        Ok(self.select_all(obj, sel)?.into_iter().next())
    }

    /// All nodes the scoped selector resolves to, in document order
    pub fn select_all(&self, obj: ObjectId, sel: &str) -> Result<Vec<NodeId>> {
        self.def(obj)?;
        self.select_nodes(obj, sel)
    }

    pub(crate) fn select_nodes(&self, obj: ObjectId, sel: &str) -> Result<Vec<NodeId>> {
        let (scope, rest) = split_scope(sel);
        // Scope root is the first node bound to the key
        let roots: Vec<NodeId> = match scope {
            Scope::Sandbox => self.sandbox(obj).into_iter().collect(),
            Scope::Bound(key) => self.bound_node(obj, key).into_iter().collect(),
            Scope::Implicit => match self.sandbox(obj) {
                Some(root) => vec![root],
                None => {
                    let selector = Selector::parse(rest)?;
                    return Ok(self.dom.query_document_all(&selector));
                }
            },
        };
        if rest.is_empty() {
            // Bare prefix selects the scope nodes themselves
            return Ok(roots);
        }
        let selector = Selector::parse(rest)?;
        let mut out = Vec::new();
        for root in roots {
            out.extend(self.dom.query_all(root, &selector));
        }
        Ok(out)
    }
}
