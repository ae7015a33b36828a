//! Built-in field adapter.
//!
//! [`ValueField`] is a plain value-holder implementing the [`Field`]
//! contract, for forms driven without a widget layer (and for tests).
//! Widget toolkits embedding the engine implement [`Field`] on their own
//! state types instead.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::field::{Field, FieldId, FieldKind};
use crate::rules::{RuleSet, RuleSpec};

/// Override messages for failing rules: one flat message, or one per rule.
#[derive(Debug, Clone)]
pub enum ErrorMessages {
    Single(String),
    PerRule(HashMap<String, String>),
}

#[derive(Default)]
struct ValueFieldInner {
    name: String,
    value: Value,
    kind: FieldKind,
    multiple: bool,
    required: bool,
    rules: Option<RuleSet>,
    messages: Option<ErrorMessages>,
}

/// A self-contained field holding its own value and declarative rules.
///
/// Cheap to clone; clones share the same state and identity, so a clone
/// handed to the controller stays in sync with the one kept by the caller.
///
/// # Example
///
/// ```
/// use formwork::fields::ValueField;
/// use formwork::rules::{Constraint, RuleSet};
/// use formwork::field::FieldKind;
///
/// let email = ValueField::new("email")
///     .with_kind(FieldKind::Email)
///     .with_required(true)
///     .with_rules(RuleSet::new().rule("min_length", 6));
/// email.set_value("kari@example.com".into());
/// ```
#[derive(Clone)]
pub struct ValueField {
    id: FieldId,
    inner: Arc<RwLock<ValueFieldInner>>,
}

impl ValueField {
    /// Create a field with the given (dotted) name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FieldId::next(),
            inner: Arc::new(RwLock::new(ValueFieldInner {
                name: name.into(),
                ..Default::default()
            })),
        }
    }

    /// Set the initial value.
    pub fn with_value(self, value: Value) -> Self {
        self.set_value(value);
        self
    }

    /// Set the semantic kind. Kinds with a same-named rule inject it
    /// implicitly.
    pub fn with_kind(self, kind: FieldKind) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.kind = kind;
        }
        self
    }

    /// Mark the field as multi-valued (checkbox group, multi-select).
    pub fn with_multiple(self, multiple: bool) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.multiple = multiple;
        }
        self
    }

    /// Mark the field required; injects a `required` rule when none is
    /// declared.
    pub fn with_required(self, required: bool) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.required = required;
        }
        self
    }

    /// Set the declarative rules.
    pub fn with_rules(self, rules: RuleSet) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.rules = Some(rules);
        }
        self
    }

    /// Set one flat override message used for any failing rule.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.messages = Some(ErrorMessages::Single(message.into()));
        }
        self
    }

    /// Set per-rule override messages.
    pub fn with_messages(self, messages: HashMap<String, String>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.messages = Some(ErrorMessages::PerRule(messages));
        }
        self
    }

    /// Replace the current value.
    pub fn set_value(&self, value: Value) {
        if let Ok(mut inner) = self.inner.write() {
            inner.value = value;
        }
    }

    /// Convenience for text fields.
    pub fn set_text(&self, text: impl Into<String>) {
        self.set_value(Value::String(text.into()));
    }

    /// Rename the field. Re-register afterwards so the registry rebinds it.
    pub fn set_name(&self, name: impl Into<String>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.name = name.into();
        }
    }

    /// Reset the value to null.
    pub fn clear(&self) {
        self.set_value(Value::Null);
    }
}

impl Field for ValueField {
    fn id(&self) -> FieldId {
        self.id
    }

    fn name(&self) -> String {
        self.inner
            .read()
            .map(|inner| inner.name.clone())
            .unwrap_or_default()
    }

    fn value(&self) -> Value {
        self.inner
            .read()
            .map(|inner| inner.value.clone())
            .unwrap_or(Value::Null)
    }

    /// Declared rules, augmented with the implicit kind rule and the
    /// `required` capability flag when those are not already declared.
    fn rules(&self) -> Option<RuleSet> {
        let Ok(inner) = self.inner.read() else {
            return None;
        };

        let mut rules = match inner.rules.clone() {
            Some(custom @ RuleSet::Custom(_)) => return Some(custom),
            Some(RuleSet::Declared(rules)) => rules,
            None => Vec::new(),
        };

        if let Some(rule) = inner.kind.implicit_rule()
            && !rules.iter().any(|(name, _)| name == rule)
        {
            rules.push((rule.to_string(), RuleSpec::Literal(Value::Bool(true))));
        }
        if inner.required && !rules.iter().any(|(name, _)| name == "required") {
            rules.push(("required".to_string(), RuleSpec::Literal(Value::Bool(true))));
        }

        if rules.is_empty() {
            None
        } else {
            Some(RuleSet::Declared(rules))
        }
    }

    fn error_message(&self, rule: &str) -> Option<String> {
        let inner = self.inner.read().ok()?;
        match inner.messages.as_ref()? {
            ErrorMessages::Single(message) => Some(message.clone()),
            ErrorMessages::PerRule(map) => map.get(rule).cloned(),
        }
    }

    fn required(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.required)
            .unwrap_or(false)
    }

    fn multiple(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.multiple)
            .unwrap_or(false)
    }

    fn kind(&self) -> FieldKind {
        self.inner
            .read()
            .map(|inner| inner.kind)
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ValueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueField")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}
