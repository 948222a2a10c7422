//! Path resolution and property writes
//!
//! Dotted paths (`"a.b.c"`) walk `Value::Object` edges through the
//! object graph. Writes through [`Runtime::set`] create missing
//! intermediate containers on demand; reads never do.
//!
//! A dotted key is taken literally (not split into a path) only when an
//! `exact_key` binding has claimed that literal key on the object.
//!
//! Property writes are the heart of the set flow: they emit
//! `beforechange:<key>` / `change` / `change:<key>` lifecycle events,
//! push the new value through every binding currently resolving to the
//! written slot, and re-resolve delegated bindings whenever an
//! object-valued property is reassigned (the structural watcher).

use crate::binder::BindingId;
use crate::error::{Result, WeftError};
use crate::registry::{ObjectId, ObjectKind};
use crate::runtime::Runtime;
use crate::value::Value;

/// Lifecycle event namespaces owned by change tracking, registered with
/// the runtime for key-scoped cleanup in `remove`
pub(crate) const CHANGE_NAMESPACES: &[&str] = &["change", "beforechange"];

impl Runtime {
    /// Read a property through a dotted path. Returns `None` when any
    /// segment (or the final key) is absent.
    pub fn get(&self, obj: ObjectId, path: &str) -> Option<Value> {
        if self.is_literal_key(obj, path) {
            return self.get_key(obj, path);
        }
        let (segments, last) = split_path(path);
        let target = self.resolve_owner(obj, &segments)?;
        self.get_key(target, last)
    }

    /// Read a literal property key
    pub fn get_key(&self, obj: ObjectId, key: &str) -> Option<Value> {
        self.objects
            .get(obj)?
            .props
            .get(key)
            .and_then(|p| p.value.clone())
    }

    /// Write a property through a dotted path, creating intermediate
    /// plain objects on demand
    pub fn set(&mut self, obj: ObjectId, path: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if self.is_literal_key(obj, path) {
            return self.set_key(obj, path, value);
        }
        let (segments, last) = split_path(path);
        let last = last.to_string();
        let target = self.resolve_owner_creating(obj, &segments)?;
        self.set_key(target, &last, value)
    }

    /// Write a literal property key, emitting lifecycle events and
    /// syncing bindings. Writing an equal value is a no-op.
    pub fn set_key(&mut self, obj: ObjectId, key: &str, value: impl Into<Value>) -> Result<()> {
        self.set_key_inner(obj, key, value.into(), false, None)
    }

    /// [`Runtime::set_key`] without lifecycle events. Bindings still
    /// sync; only the event bus stays quiet.
    pub fn set_key_silent(
        &mut self,
        obj: ObjectId,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.set_key_inner(obj, key, value.into(), true, None)
    }

    pub(crate) fn set_key_inner(
        &mut self,
        obj: ObjectId,
        key: &str,
        value: Value,
        silent: bool,
        from_binding: Option<BindingId>,
    ) -> Result<()> {
        if key.is_empty() {
            return Err(WeftError::InvalidKey(key.to_string()));
        }
        let old = {
            let def = self.def(obj)?;
            def.props.get(key).and_then(|p| p.value.clone())
        };
        if old.as_ref() == Some(&value) {
            return Ok(());
        }

        if !silent {
            self.emit(obj, &format!("beforechange:{key}"), vec![]);
        }

        {
            let def = self.def_mut(obj)?;
            def.props.entry(key.to_string()).or_default().value = Some(value.clone());
        }
        tracing::trace!(?obj, key, "property write");

        self.sync_bindings_for(obj, key, from_binding);

        let structural = matches!(value, Value::Object(_))
            || matches!(old, Some(Value::Object(_)));
        if structural {
            self.rebind_delegated();
        }

        if !silent {
            let args = vec![value, old.unwrap_or(Value::Null)];
            self.emit(obj, "change", args.clone());
            self.emit(obj, &format!("change:{key}"), args);
        }
        Ok(())
    }

    /// Whether `path` must be treated as a literal key on `obj`: either
    /// it has no dots, or an exact-key binding claimed the literal.
    pub(crate) fn is_literal_key(&self, obj: ObjectId, path: &str) -> bool {
        !path.contains('.')
            || self
                .objects
                .get(obj)
                .and_then(|d| d.props.get(path))
                .map(|p| p.exact_bind)
                .unwrap_or(false)
    }

    /// Walk object-valued segments from `obj`. `None` when a segment is
    /// absent, non-object, or points at a reclaimed object.
    pub(crate) fn resolve_owner(&self, obj: ObjectId, segments: &[&str]) -> Option<ObjectId> {
        let mut cur = obj;
        for seg in segments {
            let next = self.objects.get(cur)?.props.get(*seg)?.value.as_ref()?.as_object()?;
            if !self.objects.contains_key(next) {
                return None;
            }
            cur = next;
        }
        Some(cur)
    }

    /// Walk object-valued segments from `obj`, creating plain objects
    /// for missing or non-object segments. Structural scaffolding:
    /// writes no events and syncs no bindings.
    pub(crate) fn resolve_owner_creating(
        &mut self,
        obj: ObjectId,
        segments: &[&str],
    ) -> Result<ObjectId> {
        if !self.objects.contains_key(obj) {
            return Err(WeftError::UnknownObject);
        }
        let mut cur = obj;
        for seg in segments {
            let existing = self
                .objects
                .get(cur)
                .and_then(|d| d.props.get(*seg))
                .and_then(|p| p.value.as_ref())
                .and_then(Value::as_object)
                .filter(|id| self.objects.contains_key(*id));
            cur = match existing {
                Some(id) => id,
                None => {
                    let created = self.create_object(ObjectKind::Plain);
                    let def = self.def_mut(cur)?;
                    def.props.entry(seg.to_string()).or_default().value =
                        Some(Value::Object(created));
                    created
                }
            };
        }
        Ok(cur)
    }
}

/// Split a dotted path into intermediate segments plus the final key
pub(crate) fn split_path(path: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop().unwrap_or(path);
    (segments, last)
}
