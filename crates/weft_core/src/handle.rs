//! Chainable per-object handle
//!
//! [`Runtime::object`] borrows the runtime as one object's view, so a
//! setup block reads as a chain instead of repeating the id:
//!
//! ```
//! # use weft_core::{Runtime, ObjectKind, ValueBinder, BindOptions, handler};
//! # use std::rc::Rc;
//! # let mut rt = Runtime::new();
//! # let form = rt.create_object(ObjectKind::Plain);
//! # let input = rt.dom.create_element("input");
//! rt.object(form)
//!     .bind_node("query", input, Some(Rc::new(ValueBinder)), BindOptions::default())?
//!     .on("change:query", handler(|_, ev| println!("{:?}", ev.args)))?
//!     .set("query", "hello")?;
//! # Ok::<(), weft_core::WeftError>(())
//! ```

use std::rc::Rc;
use std::time::Duration;

use weft_dom::NodeId;

use crate::binder::{BindOptions, BindTarget, Binder};
use crate::error::Result;
use crate::events::{Handler, ListenerOptions};
use crate::registry::ObjectId;
use crate::runtime::Runtime;
use crate::value::Value;

pub struct ObjectRef<'a> {
    rt: &'a mut Runtime,
    id: ObjectId,
}

impl Runtime {
    /// View the runtime through one object for chained calls
    pub fn object(&mut self, id: ObjectId) -> ObjectRef<'_> {
        ObjectRef { rt: self, id }
    }
}

impl ObjectRef<'_> {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.rt.get(self.id, path)
    }

    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.rt.set(self.id, path, value)?;
        Ok(self)
    }

    pub fn on(&mut self, expr: &str, handler: Handler) -> Result<&mut Self> {
        self.rt.on(self.id, expr, handler)?;
        Ok(self)
    }

    pub fn on_with(
        &mut self,
        expr: &str,
        handler: Handler,
        options: ListenerOptions,
    ) -> Result<&mut Self> {
        self.rt.on_with(self.id, expr, handler, options)?;
        Ok(self)
    }

    pub fn once(&mut self, expr: &str, handler: Handler) -> Result<&mut Self> {
        self.rt.once(self.id, expr, handler)?;
        Ok(self)
    }

    pub fn on_debounce(
        &mut self,
        expr: &str,
        delay: Option<Duration>,
        handler: Handler,
    ) -> Result<&mut Self> {
        self.rt.on_debounce(self.id, expr, delay, handler)?;
        Ok(self)
    }

    pub fn off_name(&mut self, expr: &str) -> Result<&mut Self> {
        self.rt.off_name(self.id, expr)?;
        Ok(self)
    }

    pub fn trigger(&mut self, name: &str, args: Vec<Value>) -> Result<&mut Self> {
        self.rt.trigger(self.id, name, args)?;
        Ok(self)
    }

    pub fn bind_node(
        &mut self,
        key: &str,
        target: impl Into<BindTarget>,
        binder: Option<Rc<dyn Binder>>,
        options: BindOptions,
    ) -> Result<&mut Self> {
        self.rt.bind_node(self.id, key, target, binder, options)?;
        Ok(self)
    }

    pub fn bind_sandbox(&mut self, target: impl Into<BindTarget>) -> Result<&mut Self> {
        self.rt.bind_sandbox(self.id, target)?;
        Ok(self)
    }

    pub fn unbind_key(&mut self, key: &str) -> Result<&mut Self> {
        self.rt.unbind_key(self.id, key)?;
        Ok(self)
    }

    pub fn remove(&mut self, keys: &str) -> Result<&mut Self> {
        self.rt.remove(self.id, keys)?;
        Ok(self)
    }

    pub fn bound_node(&self, key: &str) -> Option<NodeId> {
        self.rt.bound_node(self.id, key)
    }

    pub fn select_all(&self, sel: &str) -> Result<Vec<NodeId>> {
        self.rt.select_all(self.id, sel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::ValueBinder;
    use crate::events::handler;
    use crate::registry::ObjectKind;

    #[test]
    fn test_chained_setup() {
        let mut rt = Runtime::new();
        let obj = rt.create_object(ObjectKind::Plain);
        let node = rt.dom.create_element("input");

        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        rt.object(obj)
            .bind_node("q", node, Some(Rc::new(ValueBinder)), BindOptions::no_debounce())
            .unwrap()
            .on("change:q", handler(move |_, ev| log.borrow_mut().push(ev.args[0].clone())))
            .unwrap()
            .set("q", "typed")
            .unwrap();

        assert_eq!(rt.dom.value(node), "typed");
        assert_eq!(*seen.borrow(), vec![Value::from("typed")]);
    }
}
