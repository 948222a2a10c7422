//! Event expression grammar
//!
//! An expression names what a subscription listens to:
//!
//! ```text
//! [path@]name[:key]                      object event
//! [path@]domevent::[key][(selector)]     DOM event on bound nodes
//! ```
//!
//! The optional delegation path (`"a.b@"`) retargets the listener at
//! whatever object the path resolves to at dispatch time; `"*@"`
//! targets every member of a list or keyed collection. The DOM form is
//! recognised by the `::` separator: `"click::editor"` listens on the
//! nodes bound to `editor`, `"click::(.btn)"` on nodes matching the
//! selector inside the sandbox, and `"click::"` on the sandbox itself.
//!
//! Parsing is infallible. Whatever does not parse as delegation or a
//! DOM form is an object event name verbatim, so misspellings register
//! listeners that never fire rather than erroring.

use std::rc::Rc;

/// Delegation prefix of a parsed expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DelegatePath {
    /// No `@` prefix: the listener sits on the subscribing object
    None,
    /// `*@`: the listener follows every collection member
    Wildcard,
    /// `a.b@`: the listener follows the object at the dotted path
    Path(Vec<String>),
}

/// Event half of a parsed expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExprBody {
    Object {
        name: String,
        key: Option<String>,
    },
    Dom {
        event: String,
        key: Option<String>,
        selector: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EventExpr {
    pub path: DelegatePath,
    pub body: ExprBody,
}

impl EventExpr {
    pub fn parse(raw: &str) -> Rc<EventExpr> {
        let (path, body) = match raw.split_once('@') {
            Some(("*", rest)) => (DelegatePath::Wildcard, rest),
            Some((path, rest)) if !path.is_empty() => (
                DelegatePath::Path(path.split('.').map(str::to_string).collect()),
                rest,
            ),
            Some((_, rest)) => (DelegatePath::None, rest),
            None => (DelegatePath::None, raw),
        };

        let body = match body.split_once("::") {
            Some((event, rest)) => {
                let (key, selector) = parse_dom_tail(rest);
                ExprBody::Dom {
                    event: event.to_string(),
                    key,
                    selector,
                }
            }
            None => match body.split_once(':') {
                Some((name, key)) if !key.is_empty() => ExprBody::Object {
                    name: name.to_string(),
                    key: Some(key.to_string()),
                },
                Some((name, _)) => ExprBody::Object {
                    name: name.to_string(),
                    key: None,
                },
                None => ExprBody::Object {
                    name: body.to_string(),
                    key: None,
                },
            },
        };

        Rc::new(EventExpr { path, body })
    }

    /// Whether this expression listens to DOM events
    pub fn is_dom(&self) -> bool {
        matches!(self.body, ExprBody::Dom { .. })
    }
}

/// Split the text after `::` into an optional bound key and an optional
/// trailing `(selector)`
fn parse_dom_tail(rest: &str) -> (Option<String>, Option<String>) {
    let (key_part, selector) = match rest.find('(') {
        Some(open) if rest.ends_with(')') => {
            (&rest[..open], Some(rest[open + 1..rest.len() - 1].to_string()))
        }
        _ => (rest, None),
    };
    let key = (!key_part.is_empty()).then(|| key_part.to_string());
    (key, selector)
}
