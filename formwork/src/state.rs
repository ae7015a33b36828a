//! Shared form state: dirty, touched, bad, and error maps.
//!
//! All four maps are keyed by field name and mutated only through the
//! tracker's setters. Every setter detects no-op writes and skips the
//! broadcast for them, so redundant mutations never wake the fields.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use log::trace;

use crate::broadcast::UpdateBroadcaster;
use crate::verdict::Verdict;

/// Which boolean flag map a setter targets.
#[derive(Debug, Clone, Copy)]
enum Flag {
    Dirty,
    Touched,
    Bad,
}

#[derive(Default)]
struct StateMaps {
    dirty: HashSet<String>,
    touched: HashSet<String>,
    bad: HashSet<String>,
    /// Present key = field in error; value = optional user-facing message.
    errors: HashMap<String, Option<String>>,
}

impl StateMaps {
    fn flag_set(&mut self, flag: Flag) -> &mut HashSet<String> {
        match flag {
            Flag::Dirty => &mut self.dirty,
            Flag::Touched => &mut self.touched,
            Flag::Bad => &mut self.bad,
        }
    }
}

/// Tracker for the four per-field state maps.
///
/// Cheap to clone; all clones share the same maps and broadcaster.
#[derive(Clone)]
pub struct StateTracker {
    maps: Arc<RwLock<StateMaps>>,
    broadcaster: UpdateBroadcaster,
}

impl StateTracker {
    pub fn new(broadcaster: UpdateBroadcaster) -> Self {
        Self {
            maps: Arc::new(RwLock::new(StateMaps::default())),
            broadcaster,
        }
    }

    fn set_flag<'a>(
        &self,
        flag: Flag,
        names: impl IntoIterator<Item = &'a str>,
        value: bool,
        update: bool,
    ) {
        let mut changed = false;
        if let Ok(mut maps) = self.maps.write() {
            let set = maps.flag_set(flag);
            for name in names {
                if value {
                    changed |= set.insert(name.to_string());
                } else {
                    changed |= set.remove(name);
                }
            }
        }
        if changed {
            trace!("state changed: {flag:?} -> {value}");
            if update {
                self.broadcaster.notify();
            }
        }
    }

    /// Mark a field dirty (it has ever held a user-driven value).
    pub fn set_dirty(&self, name: &str, dirty: bool, update: bool) {
        self.set_flag(Flag::Dirty, [name], dirty, update);
    }

    /// Mark several fields dirty in one batch.
    pub fn set_dirty_many<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
        dirty: bool,
        update: bool,
    ) {
        self.set_flag(Flag::Dirty, names, dirty, update);
    }

    /// Mark a field touched (it has been interacted with once).
    pub fn set_touched(&self, name: &str, touched: bool, update: bool) {
        self.set_flag(Flag::Touched, [name], touched, update);
    }

    /// Mark several fields touched in one batch.
    pub fn set_touched_many<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
        touched: bool,
        update: bool,
    ) {
        self.set_flag(Flag::Touched, names, touched, update);
    }

    /// Mark a field as unable to produce a usable value. Bad fields are
    /// excluded from rule evaluation and always fail.
    pub fn set_bad(&self, name: &str, bad: bool, update: bool) {
        self.set_flag(Flag::Bad, [name], bad, update);
    }

    /// Set or clear a field's error state.
    ///
    /// No-op (and no broadcast) when the requested state — presence and
    /// message — already matches the stored state.
    pub fn set_error(&self, name: &str, error: bool, message: Option<String>, update: bool) {
        let changed = match self.maps.write() {
            Ok(mut maps) => {
                let current = maps.errors.get(name);
                let matches_current = match (error, current) {
                    (false, None) => true,
                    (true, Some(stored)) => *stored == message,
                    _ => false,
                };
                if matches_current {
                    false
                } else {
                    if error {
                        maps.errors.insert(name.to_string(), message);
                    } else {
                        maps.errors.remove(name);
                    }
                    true
                }
            }
            Err(_) => false,
        };
        if changed {
            trace!("error state changed for '{name}'");
            if update {
                self.broadcaster.notify();
            }
        }
    }

    /// Apply a validation verdict to a field's error state.
    pub fn apply_verdict(&self, name: &str, verdict: &Verdict, update: bool) {
        match verdict {
            Verdict::Pass => self.set_error(name, false, None, update),
            Verdict::Fail(message) => self.set_error(name, true, message.clone(), update),
        }
    }

    /// Drop every state entry for a field. Broadcasts once if anything
    /// changed.
    pub fn clear(&self, name: &str, update: bool) {
        let mut changed = false;
        if let Ok(mut maps) = self.maps.write() {
            changed |= maps.dirty.remove(name);
            changed |= maps.touched.remove(name);
            changed |= maps.bad.remove(name);
            changed |= maps.errors.remove(name).is_some();
        }
        if changed && update {
            self.broadcaster.notify();
        }
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.maps
            .read()
            .map(|maps| maps.dirty.contains(name))
            .unwrap_or(false)
    }

    pub fn any_dirty(&self) -> bool {
        self.maps
            .read()
            .map(|maps| !maps.dirty.is_empty())
            .unwrap_or(false)
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.maps
            .read()
            .map(|maps| maps.touched.contains(name))
            .unwrap_or(false)
    }

    pub fn any_touched(&self) -> bool {
        self.maps
            .read()
            .map(|maps| !maps.touched.is_empty())
            .unwrap_or(false)
    }

    pub fn is_bad(&self, name: &str) -> bool {
        self.maps
            .read()
            .map(|maps| maps.bad.contains(name))
            .unwrap_or(false)
    }

    pub fn has_error(&self, name: &str) -> bool {
        self.maps
            .read()
            .map(|maps| maps.errors.contains_key(name))
            .unwrap_or(false)
    }

    pub fn any_error(&self) -> bool {
        self.maps
            .read()
            .map(|maps| !maps.errors.is_empty())
            .unwrap_or(false)
    }

    /// The stored error message for a field, if it is in error and the
    /// failing rule supplied one.
    pub fn error_message(&self, name: &str) -> Option<String> {
        self.maps
            .read()
            .ok()
            .and_then(|maps| maps.errors.get(name).cloned())
            .flatten()
    }

    /// The message to display for a field in error, with a fallback for
    /// generic failures.
    pub fn error_or(&self, name: &str, fallback: &str) -> String {
        self.error_message(name)
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> StateTracker {
        StateTracker::new(UpdateBroadcaster::default())
    }

    #[test]
    fn test_flags_are_idempotent() {
        let state = tracker();
        state.set_dirty("a", true, false);
        state.set_dirty("a", true, false);
        assert!(state.is_dirty("a"));
        state.set_dirty("a", false, false);
        assert!(!state.is_dirty("a"));
        assert!(!state.any_dirty());
    }

    #[test]
    fn test_error_message_fallback() {
        let state = tracker();
        state.set_error("a", true, None, false);
        assert!(state.has_error("a"));
        assert_eq!(state.error_or("a", "Field is invalid"), "Field is invalid");

        state.set_error("a", true, Some("specific".into()), false);
        assert_eq!(state.error_or("a", "Field is invalid"), "specific");
    }

    #[test]
    fn test_clear_drops_all_entries() {
        let state = tracker();
        state.set_dirty("a", true, false);
        state.set_touched("a", true, false);
        state.set_bad("a", true, false);
        state.set_error("a", true, Some("x".into()), false);
        state.clear("a", false);
        assert!(!state.is_dirty("a"));
        assert!(!state.is_touched("a"));
        assert!(!state.is_bad("a"));
        assert!(!state.has_error("a"));
    }
}
