//! The field adapter contract.
//!
//! A concrete widget participates in a form by implementing [`Field`] and
//! registering itself with a [`FormController`]. The engine never drives the
//! widget; the widget calls back into the controller on its own change and
//! blur events and re-reads shared state when its updater fires.
//!
//! [`FormController`]: crate::controller::FormController

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use crate::rules::RuleSet;

/// Unique identity for a field instance.
///
/// Identity (not name equality) is what lets the registry detect the
/// "same instance, new name" rename case. Clones of the same underlying
/// field share one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(usize);

impl FieldId {
    /// Allocate a fresh process-unique id.
    pub fn next() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__field_{}", self.0)
    }
}

/// Semantic kind of a field's value.
///
/// Kinds with a same-named rule in the library (`email`, `phone`, `number`,
/// `date`) get that rule injected implicitly by [`ValueField`] when it is not
/// already declared.
///
/// [`ValueField`]: crate::fields::ValueField
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Email,
    Phone,
    Date,
    Checkbox,
    Select,
}

impl FieldKind {
    /// The rule implied by this kind, if any.
    pub fn implicit_rule(&self) -> Option<&'static str> {
        match self {
            Self::Number => Some("number"),
            Self::Email => Some("email"),
            Self::Phone => Some("phone"),
            Self::Date => Some("date"),
            Self::Text | Self::Checkbox | Self::Select => None,
        }
    }
}

/// Contract a widget must satisfy to participate in validation.
pub trait Field: Send + Sync {
    /// Instance identity, stable across renames.
    fn id(&self) -> FieldId;

    /// The field's name. Must be non-empty and stable while registered;
    /// treated as a dotted path when assembling the form value context.
    fn name(&self) -> String;

    /// The field's current semantic value.
    fn value(&self) -> Value;

    /// Declarative validation rules, or a single field-level predicate.
    fn rules(&self) -> Option<RuleSet> {
        None
    }

    /// Override message for a failing rule (flat or per-rule).
    fn error_message(&self, _rule: &str) -> Option<String> {
        None
    }

    /// Whether the field is required.
    fn required(&self) -> bool {
        false
    }

    /// Whether the field holds multiple values (checkbox group, multi-select).
    fn multiple(&self) -> bool {
        false
    }

    /// Semantic kind of the field's value.
    fn kind(&self) -> FieldKind {
        FieldKind::Text
    }
}

/// Shared handle to a registered field.
pub type FieldHandle = Arc<dyn Field>;

/// Callback invoked with an empty delta when shared form state changes.
///
/// The receiving field re-reads `is_dirty` / `is_touched` / `has_error` /
/// `error_or` from the controller to refresh its own display.
pub type Updater = Arc<dyn Fn() + Send + Sync>;
