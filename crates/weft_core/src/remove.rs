//! Property removal
//!
//! `remove` is the full teardown for a property: bindings registered on
//! the slot go away (the object's own and delegated ones from other
//! owners), `delete` events fire, and the key-scoped lifecycle
//! listeners (`change:key`, `bind:key`, ...) registered through every
//! known namespace are dropped so a later property under the same name
//! starts clean.

use crate::error::{Result, WeftError};
use crate::registry::ObjectId;
use crate::runtime::Runtime;
use crate::value::Value;

/// Lifecycle event namespace owned by removal
pub(crate) const REMOVE_NAMESPACES: &[&str] = &["delete"];

impl Runtime {
    /// Remove one or more whitespace-separated property keys. Absent
    /// keys are skipped. Each removed key fires `delete` and
    /// `delete:key` with the old value and the key as arguments.
    pub fn remove(&mut self, obj: ObjectId, keys: &str) -> Result<()> {
        self.remove_inner(obj, keys, false)
    }

    /// [`Runtime::remove`] without `delete` events. Listener and
    /// binding teardown still happens.
    pub fn remove_silent(&mut self, obj: ObjectId, keys: &str) -> Result<()> {
        self.remove_inner(obj, keys, true)
    }

    fn remove_inner(&mut self, obj: ObjectId, keys: &str, silent: bool) -> Result<()> {
        self.def(obj)?;
        if keys.split_whitespace().next().is_none() {
            return Err(WeftError::InvalidKey(keys.to_string()));
        }
        // Validate the whole batch before touching anything
        for key in keys.split_whitespace() {
            if key == "sandbox" || key == "container" {
                return Err(WeftError::InvalidKey(key.to_string()));
            }
        }
        for key in keys.split_whitespace() {
            let slot_bindings = match self.def(obj)?.props.get(key) {
                Some(prop) => prop.bindings.to_vec(),
                None => continue,
            };

            // The object's own bindings under this key, with unbind
            // events, then delegated leftovers registered on the slot
            self.unbind_key(obj, key)?;
            for id in slot_bindings {
                self.remove_binding(id);
            }

            let old = self
                .def_mut(obj)?
                .props
                .shift_remove(key)
                .and_then(|prop| prop.value);
            tracing::debug!(?obj, key, "property removed");

            // Removing an object edge is a structural change
            if matches!(old, Some(Value::Object(_))) {
                self.rebind_delegated();
            }

            if !silent {
                let args = vec![old.unwrap_or_default(), Value::from(key)];
                self.emit(obj, "delete", args.clone());
                self.emit(obj, &format!("delete:{key}"), args);
            }

            for ns in self.key_namespaces.clone() {
                self.off_name(obj, &format!("{ns}:{key}"))?;
            }
        }
        Ok(())
    }
}
