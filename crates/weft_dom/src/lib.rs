//! Weft DOM
//!
//! This crate provides the element layer the binding runtime operates on:
//!
//! - **Node arena**: a generational arena of element nodes (tag, id,
//!   classes, attributes, a value slot, parent/children links)
//! - **Selector engine**: a CSS-subset parser and query evaluator over
//!   the arena
//!
//! The arena never creates markup on its own behalf. Embedders build the
//! tree; the binding runtime only binds to and listens on nodes that
//! already exist.
//!
//! # Example
//!
//! ```rust
//! use weft_dom::{Dom, Selector};
//!
//! let mut dom = Dom::new();
//!
//! let root = dom.create_element("div");
//! let input = dom.create_element("input");
//! dom.set_id(input, "name");
//! dom.append_child(root, input);
//!
//! let sel = Selector::parse("#name").unwrap();
//! assert_eq!(dom.query(root, &sel), Some(input));
//! ```

pub mod node;
pub mod selector;

pub use node::{Dom, NodeData, NodeId};
pub use selector::{Selector, SelectorError};
