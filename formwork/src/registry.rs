//! Field registry: name -> live field handle, updater, cached validator.
//!
//! The registry owns registration, unregistration, and rename semantics and
//! keeps a registration-order vector beside the map so that aggregate
//! validation can walk fields in the order they appeared.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::compiler::FieldValidator;
use crate::error::FormError;
use crate::field::{Field, FieldHandle, FieldId, Updater};
use crate::path;
use crate::rules::CustomRule;

/// Everything the engine stores per registered field.
pub(crate) struct Registration {
    pub field: FieldHandle,
    pub updater: Option<Updater>,
    /// Compiled validator for declared rule maps.
    pub validator: Option<FieldValidator>,
    /// Whole-field custom predicate, when the field declares one instead.
    pub custom: Option<CustomRule>,
}

#[derive(Default)]
struct RegistryInner {
    entries: HashMap<String, Registration>,
    /// Registration order; kept in sync with `entries`.
    order: Vec<String>,
}

/// Registry of live fields. Cheap to clone; clones share the same entries.
#[derive(Clone, Default)]
pub struct FieldRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field under its name.
    ///
    /// The same instance re-registering under a new name is a rename: the
    /// old entry is removed first. A *different* instance claiming an
    /// occupied name replaces the old registration (keeping its order slot)
    /// with a warning.
    pub(crate) fn register(&self, registration: Registration) -> Result<(), FormError> {
        let name = registration.field.name();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }
        let id = registration.field.id();

        let Ok(mut inner) = self.inner.write() else {
            return Ok(());
        };

        // Rename-in-place: drop the old binding of this same instance.
        let old_name = inner
            .entries
            .iter()
            .find(|(entry_name, entry)| entry.field.id() == id && **entry_name != name)
            .map(|(entry_name, _)| entry_name.clone());
        if let Some(old_name) = old_name {
            debug!("field renamed '{old_name}' -> '{name}'");
            inner.entries.remove(&old_name);
            inner.order.retain(|n| n != &old_name);
        }

        match inner.entries.insert(name.clone(), registration) {
            Some(previous) if previous.field.id() != id => {
                // Replacement keeps the original order slot.
                warn!("field '{name}' replaced by a different instance");
            }
            Some(_) => debug!("field '{name}' re-registered"),
            None => {
                debug!("field '{name}' registered");
                inner.order.push(name);
            }
        }
        debug_assert_eq!(inner.order.len(), inner.entries.len());
        Ok(())
    }

    /// Remove a field's registration by name. Idempotent.
    pub fn unregister(&self, name: &str) -> bool {
        let Ok(mut inner) = self.inner.write() else {
            return false;
        };
        let removed = inner.entries.remove(name).is_some();
        if removed {
            inner.order.retain(|n| n != name);
            debug!("field '{name}' unregistered");
        }
        removed
    }

    /// Identity lookup: the name this exact instance is registered under.
    pub fn registered_name(&self, field: &dyn Field) -> Option<String> {
        let id = field.id();
        self.inner.read().ok()?.entries.iter().find_map(|(name, entry)| {
            (entry.field.id() == id).then(|| name.clone())
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .map(|inner| inner.entries.contains_key(name))
            .unwrap_or(false)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.order.clone())
            .unwrap_or_default()
    }

    /// A field's current value, straight from the live field.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.inner
            .read()
            .ok()?
            .entries
            .get(name)
            .map(|entry| entry.field.value())
    }

    /// Assemble the full value context: every field's dotted name set into a
    /// nested object, in registration order.
    pub fn values(&self) -> Value {
        let mut values = Value::Object(Map::new());
        let Ok(inner) = self.inner.read() else {
            return values;
        };
        for name in &inner.order {
            if let Some(entry) = inner.entries.get(name) {
                path::set(&mut values, name, entry.field.value());
            }
        }
        values
    }

    /// The pieces `validate_one` needs, cloned out so no lock is held across
    /// the await.
    pub(crate) fn validation_parts(
        &self,
        name: &str,
    ) -> Option<(FieldHandle, Option<FieldValidator>, Option<CustomRule>)> {
        let inner = self.inner.read().ok()?;
        let entry = inner.entries.get(name)?;
        Some((
            Arc::clone(&entry.field),
            entry.validator.clone(),
            entry.custom.clone(),
        ))
    }

    /// Invoke every registered field's updater with an empty delta.
    pub fn notify_all(&self) {
        let updaters: Vec<Updater> = match self.inner.read() {
            Ok(inner) => inner
                .order
                .iter()
                .filter_map(|name| inner.entries.get(name))
                .filter_map(|entry| entry.updater.clone())
                .collect(),
            Err(_) => return,
        };
        for updater in updaters {
            updater();
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.entries.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
