//! The runtime: one arena owning every object, binding, subscription,
//! timer, and the DOM they attach to
//!
//! All operations go through `&mut Runtime`, which is what makes the
//! dispatch model safe without locks: handlers receive the runtime
//! re-borrowed, never aliased. Handlers and binders hold `Rc`s, so the
//! runtime is single-threaded by construction.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use weft_dom::{Dom, NodeId};

use crate::binder::{Binding, BindingId, BINDER_NAMESPACES};
use crate::events::EventExpr;
use crate::path::CHANGE_NAMESPACES;
use crate::registry::{Definition, ObjectId};
use crate::remove::REMOVE_NAMESPACES;
use crate::timer::Timers;

pub struct Runtime {
    /// The synthetic DOM bindings attach to
    pub dom: Dom,
    pub(crate) objects: SlotMap<ObjectId, Definition>,
    pub(crate) bindings: SlotMap<BindingId, Binding>,
    /// Bindings with a dotted path, re-resolved after structural writes
    pub(crate) delegated_bindings: Vec<BindingId>,
    /// Binder change hooks: (node, DOM event) to pulling bindings
    pub(crate) node_listeners: FxHashMap<(NodeId, String), Vec<BindingId>>,
    pub(crate) timers: Timers,
    pub(crate) expr_cache: FxHashMap<String, Rc<EventExpr>>,
    /// Subscriptions with a delegation path, owner plus sub id
    pub(crate) delegated_subs: Vec<(ObjectId, u64)>,
    /// DOM-event subscriptions, owner plus sub id
    pub(crate) dom_subs: Vec<(ObjectId, u64)>,
    /// Global subscription counter; ordering across owners follows it
    pub(crate) next_sub: u64,
    /// Event namespaces with per-key listeners (`ns:key`), cleaned up
    /// when the key is removed
    pub(crate) key_namespaces: Vec<&'static str>,
}

impl Runtime {
    pub fn new() -> Self {
        let mut key_namespaces = Vec::new();
        key_namespaces.extend_from_slice(CHANGE_NAMESPACES);
        key_namespaces.extend_from_slice(BINDER_NAMESPACES);
        key_namespaces.extend_from_slice(REMOVE_NAMESPACES);
        Self {
            dom: Dom::new(),
            objects: SlotMap::with_key(),
            bindings: SlotMap::with_key(),
            delegated_bindings: Vec::new(),
            node_listeners: FxHashMap::default(),
            timers: Timers::default(),
            expr_cache: FxHashMap::default(),
            delegated_subs: Vec::new(),
            dom_subs: Vec::new(),
            next_sub: 0,
            key_namespaces,
        }
    }

    /// Declare an extension-owned event namespace whose `ns:key`
    /// listeners should be dropped when the key is removed
    pub fn register_key_namespace(&mut self, ns: &'static str) {
        if !self.key_namespaces.contains(&ns) {
            self.key_namespaces.push(ns);
        }
    }

    /// Number of live managed objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
