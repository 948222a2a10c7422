//! Binder engine
//!
//! A binding ties one property slot to one DOM node through a
//! [`Binder`], the adapter that knows how to read and write that kind
//! of node. Bindings are bidirectional: property writes push through
//! [`Binder::set_value`], and DOM events the binder subscribed to via
//! its change hook pull through [`Binder::get_value`]. Both directions
//! are debounced on the trailing edge by default so bursts collapse to
//! one DOM write or one property write.
//!
//! Dotted keys (`"user.name"`) bind through the object graph: the
//! binding registers on whatever object the intermediate path resolves
//! to, and a structural write anywhere in the graph re-resolves every
//! delegated binding and freshly syncs the ones whose target moved.
//! A binding whose path stops resolving goes dormant rather than being
//! destroyed, and wakes up when the path becomes reachable again.

use std::rc::Rc;

use slotmap::new_key_type;
use weft_dom::{Dom, NodeId};

use crate::error::{Result, WeftError};
use crate::registry::{ObjectId, ObjectKind};
use crate::runtime::Runtime;
use crate::timer::DEFAULT_DEBOUNCE_DELAY;
use crate::value::Value;

new_key_type! {
    /// Generational id of one binding
    pub struct BindingId;
}

/// Lifecycle event namespaces owned by the binder engine
pub(crate) const BINDER_NAMESPACES: &[&str] = &["bind", "unbind"];

/// Adapter between one kind of DOM node and a property value
pub trait Binder {
    /// Declare the DOM events that should trigger a pull from the node.
    /// The default listens to nothing, making the binding push-only.
    fn on(&self, _hook: &mut ChangeHook) {}

    /// Read the node's current state as a property value
    fn get_value(&self, node: NodeId, dom: &Dom) -> Value;

    /// Write a property value into the node
    fn set_value(&self, node: NodeId, dom: &mut Dom, value: &Value);

    /// Called once after the initial sync
    fn initialize(&self, _node: NodeId, _dom: &mut Dom) {}

    /// Called when the binding is removed
    fn destroy(&self, _node: NodeId, _dom: &mut Dom) {}
}

/// Collects the DOM event names a binder wants to pull on
#[derive(Debug, Default)]
pub struct ChangeHook {
    events: Vec<String>,
}

impl ChangeHook {
    pub fn listen(&mut self, event: &str) {
        self.events.push(event.to_string());
    }
}

/// Binder for form-like nodes carrying a value slot
#[derive(Debug, Default)]
pub struct ValueBinder;

impl Binder for ValueBinder {
    fn on(&self, hook: &mut ChangeHook) {
        hook.listen("input");
        hook.listen("change");
    }

    fn get_value(&self, node: NodeId, dom: &Dom) -> Value {
        Value::from(dom.value(node))
    }

    fn set_value(&self, node: NodeId, dom: &mut Dom, value: &Value) {
        dom.set_value(node, &value.as_text());
    }
}

/// Push-only binder mirroring a property into a node attribute
#[derive(Debug)]
pub struct AttrBinder {
    pub attr: String,
}

impl AttrBinder {
    pub fn new(attr: &str) -> Self {
        Self { attr: attr.to_string() }
    }
}

impl Binder for AttrBinder {
    fn get_value(&self, node: NodeId, dom: &Dom) -> Value {
        dom.attr(node, &self.attr).map(Value::from).unwrap_or_default()
    }

    fn set_value(&self, node: NodeId, dom: &mut Dom, value: &Value) {
        dom.set_attr(node, &self.attr, &value.as_text());
    }
}

/// What a bind call attaches to
#[derive(Debug, Clone)]
pub enum BindTarget {
    Node(NodeId),
    /// A scoped selector, resolved against the owner's sandbox when one
    /// is bound
    Selector(String),
    Many(Vec<BindTarget>),
}

impl From<NodeId> for BindTarget {
    fn from(node: NodeId) -> Self {
        BindTarget::Node(node)
    }
}

impl From<&str> for BindTarget {
    fn from(sel: &str) -> Self {
        BindTarget::Selector(sel.to_string())
    }
}

impl From<String> for BindTarget {
    fn from(sel: String) -> Self {
        BindTarget::Selector(sel)
    }
}

impl From<Vec<NodeId>> for BindTarget {
    fn from(nodes: Vec<NodeId>) -> Self {
        BindTarget::Many(nodes.into_iter().map(BindTarget::Node).collect())
    }
}

/// Per-binding behavior switches
#[derive(Debug, Clone, Copy)]
pub struct BindOptions {
    /// Debounce pushes from property to node
    pub debounce_set_value: bool,
    /// Debounce pulls from node to property
    pub debounce_get_value: bool,
    /// Debounce the initial push at bind time
    pub debounce_set_value_on_bind: bool,
    /// Debounce the initial pull at bind time
    pub debounce_get_value_on_bind: bool,
    /// Tolerate an unresolvable target instead of erroring
    pub optional: bool,
    /// Treat a dotted key as one literal key on the owner
    pub exact_key: bool,
    /// Suppress `bind` events and initial-pull change events
    pub silent: bool,
    pub debounce_delay: std::time::Duration,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            debounce_set_value: true,
            debounce_get_value: true,
            debounce_set_value_on_bind: false,
            debounce_get_value_on_bind: false,
            optional: false,
            exact_key: false,
            silent: false,
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
        }
    }
}

impl BindOptions {
    /// Fully synchronous variant, useful in tests
    pub fn no_debounce() -> Self {
        Self {
            debounce_set_value: false,
            debounce_get_value: false,
            ..Self::default()
        }
    }
}

pub(crate) struct Binding {
    pub owner: ObjectId,
    pub raw_key: String,
    /// Intermediate path segments; empty for a direct binding
    pub path: Vec<String>,
    /// Final literal key on the resolved object
    pub key: String,
    pub node: NodeId,
    pub binder: Option<Rc<dyn Binder>>,
    pub options: BindOptions,
    /// Object the final key currently lives on; `None` while dormant
    pub resolved: Option<ObjectId>,
    pub hook_events: Vec<String>,
    pub set_timer: Option<crate::timer::TimerId>,
    pub get_timer: Option<crate::timer::TimerId>,
}

impl Runtime {
    /// Bind a property key to one or more nodes through a binder. A
    /// `None` binder is a pure association: the nodes are retrievable
    /// through [`Runtime::bound_nodes`] and usable by DOM event
    /// expressions, but no value syncing happens.
    pub fn bind_node(
        &mut self,
        obj: ObjectId,
        key: &str,
        target: impl Into<BindTarget>,
        binder: Option<Rc<dyn Binder>>,
        options: BindOptions,
    ) -> Result<()> {
        self.def(obj)?;
        let target = target.into();
        self.check_reserved(obj, key, &target)?;
        self.bind_inner(obj, key, &target, binder, options)
    }

    /// [`Runtime::bind_node`] with `optional` set: a target that does
    /// not resolve is skipped instead of erroring
    pub fn bind_optional_node(
        &mut self,
        obj: ObjectId,
        key: &str,
        target: impl Into<BindTarget>,
        binder: Option<Rc<dyn Binder>>,
        options: BindOptions,
    ) -> Result<()> {
        self.bind_node(obj, key, target, binder, BindOptions { optional: true, ..options })
    }

    /// Bind several keys to the same binder in one call
    pub fn bind(
        &mut self,
        obj: ObjectId,
        entries: &[(&str, BindTarget)],
        binder: Option<Rc<dyn Binder>>,
        options: BindOptions,
    ) -> Result<()> {
        for (key, target) in entries {
            self.bind_node(obj, *key, target.clone(), binder.clone(), options)?;
        }
        Ok(())
    }

    /// Declare the object's sandbox, the root node scoped selectors and
    /// DOM event expressions resolve against. Rebinding replaces the
    /// previous sandbox.
    pub fn bind_sandbox(&mut self, obj: ObjectId, target: impl Into<BindTarget>) -> Result<()> {
        self.def(obj)?;
        let target = target.into();
        let nodes = self.resolve_target(obj, &target)?;
        if nodes.is_empty() {
            return Err(WeftError::MissingNode);
        }
        // The sandbox is an exclusive single-node slot
        if nodes.len() > 1 {
            return Err(WeftError::ReservedKeyConflict { key: "sandbox".to_string() });
        }
        self.unbind_key(obj, "sandbox")?;
        self.bind_inner(obj, "sandbox", &BindTarget::Many(
            nodes.into_iter().map(BindTarget::Node).collect(),
        ), None, BindOptions { exact_key: true, ..BindOptions::default() })
    }

    fn bind_inner(
        &mut self,
        obj: ObjectId,
        key: &str,
        target: &BindTarget,
        binder: Option<Rc<dyn Binder>>,
        options: BindOptions,
    ) -> Result<()> {
        if key.is_empty() {
            return Err(WeftError::InvalidKey(key.to_string()));
        }
        let nodes = match self.resolve_target(obj, target) {
            Ok(nodes) => nodes,
            Err(_) if options.optional => Vec::new(),
            Err(err) => return Err(err),
        };
        if nodes.is_empty() {
            if options.optional {
                return Ok(());
            }
            return Err(WeftError::MissingNode);
        }

        let (path, final_key) = if options.exact_key || !key.contains('.') {
            (Vec::new(), key.to_string())
        } else {
            let mut segs: Vec<String> = key.split('.').map(str::to_string).collect();
            let last = segs.pop().unwrap_or_default();
            (segs, last)
        };

        let resolved = if path.is_empty() {
            obj
        } else {
            let segs: Vec<&str> = path.iter().map(String::as_str).collect();
            self.resolve_owner_creating(obj, &segs)?
        };

        for node in nodes {
            let id = self.bindings.insert(Binding {
                owner: obj,
                raw_key: key.to_string(),
                path: path.clone(),
                key: final_key.clone(),
                node,
                binder: binder.clone(),
                options,
                resolved: Some(resolved),
                hook_events: Vec::new(),
                set_timer: None,
                get_timer: None,
            });
            if !path.is_empty() {
                self.delegated_bindings.push(id);
            }

            {
                let def = self.def_mut(resolved)?;
                let prop = def.props.entry(final_key.clone()).or_default();
                prop.bindings.push(id);
                if options.exact_key {
                    prop.exact_bind = true;
                }
            }

            if let Some(binder) = &binder {
                let mut hook = ChangeHook::default();
                binder.on(&mut hook);
                for event in &hook.events {
                    self.node_listeners
                        .entry((node, event.clone()))
                        .or_default()
                        .push(id);
                }
                if let Some(b) = self.bindings.get_mut(id) {
                    b.hook_events = hook.events;
                }

                self.initial_sync(id);
                binder.initialize(node, &mut self.dom);
            }
            tracing::debug!(?obj, key, ?node, "binding created");
        }

        if !options.silent {
            self.emit(obj, "bind", vec![]);
            self.emit(obj, &format!("bind:{key}"), vec![]);
        }
        Ok(())
    }

    /// Push the property into the node when it has a value, otherwise
    /// pull the node's state into the property
    fn initial_sync(&mut self, id: BindingId) {
        let Some(b) = self.bindings.get(id) else {
            return;
        };
        let (resolved, key, options) = (b.resolved, b.key.clone(), b.options);
        let Some(obj) = resolved else {
            return;
        };
        if self.get_key(obj, &key).is_some() {
            if options.debounce_set_value_on_bind {
                self.schedule_push(id);
            } else {
                self.push_now(id);
            }
        } else if options.debounce_get_value_on_bind {
            self.schedule_pull(id);
        } else {
            self.pull_now(id, options.silent);
        }
    }

    /// Reserved keys (`sandbox` everywhere, `container` on lists) are
    /// exclusive single-node slots: the first bind claims the slot, any
    /// further bind, or a multi-node target, is a conflict.
    fn check_reserved(&self, obj: ObjectId, key: &str, target: &BindTarget) -> Result<()> {
        let reserved = key == "sandbox"
            || (key == "container" && matches!(self.object_kind(obj), Ok(ObjectKind::List)));
        if !reserved {
            return Ok(());
        }
        if !self.bound_nodes(obj, key).is_empty() {
            return Err(WeftError::ReservedKeyConflict { key: key.to_string() });
        }
        if matches!(self.resolve_target(obj, target), Ok(nodes) if nodes.len() > 1) {
            return Err(WeftError::ReservedKeyConflict { key: key.to_string() });
        }
        Ok(())
    }

    fn resolve_target(&self, obj: ObjectId, target: &BindTarget) -> Result<Vec<NodeId>> {
        match target {
            BindTarget::Node(node) => {
                if self.dom.contains(*node) {
                    Ok(vec![*node])
                } else {
                    Err(WeftError::MissingNode)
                }
            }
            BindTarget::Selector(sel) => {
                let nodes = self.select_nodes(obj, sel)?;
                if nodes.is_empty() {
                    Err(WeftError::NodeNotFound { spec: sel.clone() })
                } else {
                    Ok(nodes)
                }
            }
            BindTarget::Many(targets) => {
                let mut nodes = Vec::new();
                for t in targets {
                    nodes.extend(self.resolve_target(obj, t)?);
                }
                Ok(nodes)
            }
        }
    }

    /// Remove every binding owned by `obj`
    pub fn unbind(&mut self, obj: ObjectId) -> Result<()> {
        self.def(obj)?;
        let ids: Vec<BindingId> = self
            .bindings
            .iter()
            .filter(|(_, b)| b.owner == obj)
            .map(|(id, _)| id)
            .collect();
        self.remove_bindings(obj, ids);
        Ok(())
    }

    /// Remove the bindings registered under one key
    pub fn unbind_key(&mut self, obj: ObjectId, key: &str) -> Result<()> {
        self.def(obj)?;
        let ids: Vec<BindingId> = self
            .bindings
            .iter()
            .filter(|(_, b)| b.owner == obj && b.raw_key == key)
            .map(|(id, _)| id)
            .collect();
        self.remove_bindings(obj, ids);
        Ok(())
    }

    /// Remove the bindings for one key whose node is in `target`.
    /// Targets that no longer resolve are ignored.
    pub fn unbind_node(
        &mut self,
        obj: ObjectId,
        key: &str,
        target: impl Into<BindTarget>,
    ) -> Result<()> {
        self.def(obj)?;
        let nodes = self.resolve_target(obj, &target.into()).unwrap_or_default();
        let ids: Vec<BindingId> = self
            .bindings
            .iter()
            .filter(|(_, b)| b.owner == obj && b.raw_key == key && nodes.contains(&b.node))
            .map(|(id, _)| id)
            .collect();
        self.remove_bindings(obj, ids);
        Ok(())
    }

    fn remove_bindings(&mut self, obj: ObjectId, ids: Vec<BindingId>) {
        let mut keys: Vec<String> = Vec::new();
        let mut silent = true;
        for id in ids {
            if let Some((raw_key, was_silent)) = self.remove_binding(id) {
                silent &= was_silent;
                if !keys.contains(&raw_key) {
                    keys.push(raw_key);
                }
            }
        }
        if keys.is_empty() || silent {
            return;
        }
        self.emit(obj, "unbind", vec![]);
        for key in keys {
            self.emit(obj, &format!("unbind:{key}"), vec![]);
        }
    }

    pub(crate) fn remove_binding(&mut self, id: BindingId) -> Option<(String, bool)> {
        let b = self.bindings.remove(id)?;
        if let Some(t) = b.set_timer {
            self.timers.cancel(t);
        }
        if let Some(t) = b.get_timer {
            self.timers.cancel(t);
        }
        for event in &b.hook_events {
            if let Some(list) = self.node_listeners.get_mut(&(b.node, event.clone())) {
                list.retain(|&x| x != id);
                if list.is_empty() {
                    self.node_listeners.remove(&(b.node, event.clone()));
                }
            }
        }
        self.delegated_bindings.retain(|&x| x != id);
        if let Some(target) = b.resolved {
            if let Some(def) = self.objects.get_mut(target) {
                if let Some(prop) = def.props.get_mut(&b.key) {
                    prop.bindings.retain(|x| *x != id);
                }
            }
        }
        if let Some(binder) = &b.binder {
            binder.destroy(b.node, &mut self.dom);
        }
        tracing::debug!(owner = ?b.owner, key = %b.raw_key, "binding removed");
        Some((b.raw_key, b.options.silent))
    }

    /// First node bound to this key, in binding order
    pub fn bound_node(&self, obj: ObjectId, key: &str) -> Option<NodeId> {
        self.bound_nodes(obj, key).into_iter().next()
    }

    /// All nodes bound to this key, in binding order
    pub fn bound_nodes(&self, obj: ObjectId, key: &str) -> Vec<NodeId> {
        self.bindings
            .iter()
            .filter(|(_, b)| b.owner == obj && b.raw_key == key)
            .map(|(_, b)| b.node)
            .collect()
    }

    /// The object's sandbox node, when one is bound
    pub fn sandbox(&self, obj: ObjectId) -> Option<NodeId> {
        self.bound_node(obj, "sandbox")
    }

    /// Push a freshly written property value into every binding
    /// registered on that slot, skipping the binding the write came
    /// from so pulls do not echo back into the DOM
    pub(crate) fn sync_bindings_for(
        &mut self,
        obj: ObjectId,
        key: &str,
        from: Option<BindingId>,
    ) {
        let ids: Vec<BindingId> = self
            .objects
            .get(obj)
            .and_then(|def| def.props.get(key))
            .map(|prop| prop.bindings.to_vec())
            .unwrap_or_default();
        for id in ids {
            if Some(id) == from {
                continue;
            }
            let Some(b) = self.bindings.get(id) else {
                continue;
            };
            if b.binder.is_none() {
                continue;
            }
            if b.options.debounce_set_value {
                self.schedule_push(id);
            } else {
                self.push_now(id);
            }
        }
    }

    fn schedule_push(&mut self, id: BindingId) {
        let Some(b) = self.bindings.get_mut(id) else {
            return;
        };
        let delay = b.options.debounce_delay;
        if let Some(stale) = b.set_timer.take() {
            self.timers.cancel(stale);
        }
        let timer = self
            .timers
            .set_timeout(delay, move |rt| rt.push_now(id));
        if let Some(b) = self.bindings.get_mut(id) {
            b.set_timer = Some(timer);
        }
    }

    /// Write the property's current value into the node. Reads at call
    /// time, so a debounced push carries the latest value.
    fn push_now(&mut self, id: BindingId) {
        let Some(b) = self.bindings.get_mut(id) else {
            return;
        };
        b.set_timer = None;
        let (node, key, resolved, binder) = (b.node, b.key.clone(), b.resolved, b.binder.clone());
        let (Some(obj), Some(binder)) = (resolved, binder) else {
            return;
        };
        if !self.dom.contains(node) {
            return;
        }
        if let Some(value) = self.get_key(obj, &key) {
            binder.set_value(node, &mut self.dom, &value);
        }
    }

    /// A DOM event the binder listens to fired on the bound node
    pub(crate) fn handle_node_change(&mut self, id: BindingId) {
        let Some(b) = self.bindings.get(id) else {
            return;
        };
        if b.options.debounce_get_value {
            self.schedule_pull(id);
        } else {
            self.pull_now(id, false);
        }
    }

    fn schedule_pull(&mut self, id: BindingId) {
        let Some(b) = self.bindings.get_mut(id) else {
            return;
        };
        let delay = b.options.debounce_delay;
        if let Some(stale) = b.get_timer.take() {
            self.timers.cancel(stale);
        }
        let timer = self
            .timers
            .set_timeout(delay, move |rt| rt.pull_now(id, false));
        if let Some(b) = self.bindings.get_mut(id) {
            b.get_timer = Some(timer);
        }
    }

    /// Read the node's state into the property. Reads at call time, so
    /// a debounced pull carries the node's latest state.
    fn pull_now(&mut self, id: BindingId, silent: bool) {
        let Some(b) = self.bindings.get_mut(id) else {
            return;
        };
        b.get_timer = None;
        let (node, key, resolved, binder) = (b.node, b.key.clone(), b.resolved, b.binder.clone());
        let (Some(obj), Some(binder)) = (resolved, binder) else {
            return;
        };
        if !self.dom.contains(node) {
            return;
        }
        let value = binder.get_value(node, &self.dom);
        if let Err(err) = self.set_key_inner(obj, &key, value, silent, Some(id)) {
            tracing::warn!(%err, key, "binding pull dropped");
        }
    }

    /// Re-resolve every delegated binding after a structural write.
    /// Bindings whose target moved re-register on the new object and
    /// sync immediately; bindings whose path broke go dormant.
    pub(crate) fn rebind_delegated(&mut self) {
        for id in self.delegated_bindings.clone() {
            let Some(b) = self.bindings.get(id) else {
                continue;
            };
            let owner = b.owner;
            let key = b.key.clone();
            let old = b.resolved;
            let node = b.node;
            let binder = b.binder.clone();
            let segs: Vec<&str> = b.path.iter().map(String::as_str).collect();

            let new = self.resolve_owner(owner, &segs);
            if new == old {
                continue;
            }

            if let Some(prev) = old {
                if let Some(def) = self.objects.get_mut(prev) {
                    if let Some(prop) = def.props.get_mut(&key) {
                        prop.bindings.retain(|x| *x != id);
                    }
                }
            }
            if let Some(next) = new {
                if let Some(def) = self.objects.get_mut(next) {
                    def.props.entry(key.clone()).or_default().bindings.push(id);
                }
            }
            if let Some(b) = self.bindings.get_mut(id) {
                b.resolved = new;
            }
            tracing::debug!(?owner, key, dormant = new.is_none(), "delegated binding retargeted");

            let (Some(next), Some(binder)) = (new, binder) else {
                continue;
            };
            if !self.dom.contains(node) {
                continue;
            }
            // Fresh sync against the new target, undebounced
            match self.get_key(next, &key) {
                Some(value) => binder.set_value(node, &mut self.dom, &value),
                None => {
                    let value = binder.get_value(node, &self.dom);
                    if let Err(err) = self.set_key_inner(next, &key, value, true, Some(id)) {
                        tracing::warn!(%err, key, "rebind pull dropped");
                    }
                }
            }
        }
    }
}
