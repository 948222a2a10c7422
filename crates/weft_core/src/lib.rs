//! Weft Core Runtime
//!
//! This crate is the object-to-DOM synchronization engine of Weft:
//!
//! - **Definition Store**: Generational arena of managed objects with
//!   ordered property records
//! - **Event Bus**: Object and DOM event subscriptions with delegation
//!   paths, dispatched in registration order
//! - **Binder Engine**: Bidirectional, debounced property-to-node
//!   bindings through pluggable binder adapters
//! - **Scoped Selection**: `:sandbox` / `:bound(key)` selector scoping
//!   on top of the `weft_dom` query engine
//! - **Virtual Clock**: Deterministic trailing-edge debouncing driven
//!   by [`Runtime::advance`]
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use weft_core::{handler, BindOptions, ObjectKind, Runtime, ValueBinder};
//!
//! let mut rt = Runtime::new();
//! let form = rt.create_object(ObjectKind::Plain);
//! let input = rt.dom.create_element("input");
//!
//! rt.bind_node(form, "query", input, Some(Rc::new(ValueBinder)), BindOptions::no_debounce())?;
//! rt.on(form, "change:query", handler(|_, ev| {
//!     println!("query is now {:?}", ev.args[0]);
//! }))?;
//!
//! // A property write pushes into the bound node
//! rt.set(form, "query", "weaving")?;
//! assert_eq!(rt.dom.value(input), "weaving");
//!
//! // A DOM edit pulls back into the property
//! rt.dom.set_value(input, "unravelling");
//! rt.fire_node_event(input, "input", vec![]);
//! assert_eq!(rt.get(form, "query"), Some("unravelling".into()));
//! # Ok::<(), weft_core::WeftError>(())
//! ```

pub mod binder;
pub mod error;
pub mod events;
pub mod handle;
pub mod path;
pub mod registry;
pub mod remove;
pub mod runtime;
pub mod select;
pub mod timer;
pub mod value;

pub use binder::{
    AttrBinder, BindOptions, BindTarget, Binder, BindingId, ChangeHook, ValueBinder,
};
pub use error::{Result, WeftError};
pub use events::{handler, Event, Handler, ListenerOptions};
pub use handle::ObjectRef;
pub use registry::{ObjectId, ObjectKind};
pub use runtime::Runtime;
pub use timer::{TimerId, DEFAULT_DEBOUNCE_DELAY};
pub use value::Value;
