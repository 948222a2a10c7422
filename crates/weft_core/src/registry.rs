//! Definition store
//!
//! Every managed object is an entry in a generational
//! `SlotMap<ObjectId, Definition>`. The Definition is the per-object
//! record of property definitions, active bindings, and event
//! subscriptions. Reclaiming an object (`remove_object`) drops the
//! whole record; stale ids fail with `UnknownObject` afterwards, which
//! is the typed stand-in for a weak identity map.

use indexmap::IndexMap;
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::binder::BindingId;
use crate::error::{Result, WeftError};
use crate::events::Subscription;
use crate::runtime::Runtime;
use crate::value::Value;

new_key_type! {
    /// Unique identifier for a managed object
    pub struct ObjectId;
}

/// Capability marker of a managed object, fixed at creation
///
/// Collection kinds participate in wildcard (`*@name`) event
/// delegation, and `List` swaps the exclusive reserved binding key from
/// `sandbox` to `container`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectKind {
    /// A plain property bag
    #[default]
    Plain,
    /// An ordered collection (external wrapper stores members as
    /// indexed properties or a list-valued property)
    List,
    /// A keyed collection
    Keyed,
}

/// Per-property record: current value plus the bindings registered
/// under this key on the owning object
#[derive(Debug, Default)]
pub(crate) struct PropertyDef {
    /// Current value; `None` means the property was never assigned
    pub value: Option<Value>,
    /// Bindings registered under this key, in bind order
    pub bindings: SmallVec<[BindingId; 2]>,
    /// Set when an `exact_key` binding claimed this literal (dotted)
    /// key, suppressing path-splitting for it
    pub exact_bind: bool,
}

/// The per-object record of properties, bindings, and subscriptions
#[derive(Default)]
pub(crate) struct Definition {
    pub kind: ObjectKind,
    /// Property records, in first-touch order
    pub props: IndexMap<String, PropertyDef>,
    /// Event subscriptions, in registration order
    pub subs: Vec<Subscription>,
}

impl std::fmt::Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("kind", &self.kind)
            .field("props", &self.props.keys().collect::<Vec<_>>())
            .field("subs", &self.subs.len())
            .finish()
    }
}

impl Runtime {
    /// Register a new managed object of the given kind
    pub fn create_object(&mut self, kind: ObjectKind) -> ObjectId {
        self.objects.insert(Definition {
            kind,
            ..Definition::default()
        })
    }

    /// Whether the id refers to a live object
    pub fn contains_object(&self, obj: ObjectId) -> bool {
        self.objects.contains_key(obj)
    }

    /// Capability kind of an object
    pub fn object_kind(&self, obj: ObjectId) -> Result<ObjectKind> {
        self.objects
            .get(obj)
            .map(|d| d.kind)
            .ok_or(WeftError::UnknownObject)
    }

    /// Reclaim an object: tear down its bindings and subscriptions,
    /// cancel their pending timers, and drop the Definition. The id
    /// becomes inert; other objects still holding `Value::Object` edges
    /// to it resolve to nothing from now on.
    pub fn remove_object(&mut self, obj: ObjectId) -> Result<()> {
        if !self.objects.contains_key(obj) {
            return Err(WeftError::UnknownObject);
        }
        self.unbind(obj)?;
        self.off(obj)?;
        self.objects.remove(obj);
        tracing::debug!(?obj, "object reclaimed");
        Ok(())
    }

    pub(crate) fn def(&self, obj: ObjectId) -> Result<&Definition> {
        self.objects.get(obj).ok_or(WeftError::UnknownObject)
    }

    pub(crate) fn def_mut(&mut self, obj: ObjectId) -> Result<&mut Definition> {
        self.objects.get_mut(obj).ok_or(WeftError::UnknownObject)
    }

    /// Direct members of a collection-kind object: object-valued
    /// properties, plus objects inside list-valued properties. Used by
    /// wildcard event delegation; membership is evaluated lazily at
    /// dispatch time, so future members match without re-registration.
    pub fn members(&self, obj: ObjectId) -> Vec<ObjectId> {
        let Some(def) = self.objects.get(obj) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for prop in def.props.values() {
            match &prop.value {
                Some(Value::Object(id)) => out.push(*id),
                Some(Value::List(items)) => {
                    out.extend(items.iter().filter_map(Value::as_object));
                }
                _ => {}
            }
        }
        out
    }
}
