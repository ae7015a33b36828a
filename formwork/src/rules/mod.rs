//! Declarative rule model and the rule library.
//!
//! A field declares its validation as an ordered list of `(rule name,
//! [`RuleSpec`])` pairs. Rule specs are normalized into a [`Constraint`] at
//! the compiler boundary; the named rules themselves live in a
//! [`RuleLibrary`] shared by the whole form, which ships with the built-in
//! rules and accepts plugins under new names.
//!
//! # Example
//!
//! ```
//! use formwork::rules::{Constraint, RuleSet};
//!
//! let rules = RuleSet::new()
//!     .rule("required", Constraint::new(true).with_message("Email is required"))
//!     .rule("email", true)
//!     .rule("min_length", 6);
//! assert!(rules.declares("email"));
//! ```

mod date;
mod email;
mod matches;
mod max;
mod max_checked;
mod max_length;
mod min;
mod min_checked;
mod min_length;
mod number;
mod pattern;
mod phone;
mod required;
mod step;
pub(crate) mod utils;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::field::{Field, FieldHandle};
use crate::verdict::Verdict;

/// Type alias for boxed futures used in async validation.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Configuration supplied to a rule for one field.
#[derive(Debug, Clone)]
pub struct Constraint {
    /// The constraint value (bound, pattern, flag, peer path, ...).
    pub value: Value,
    /// Override message shown when this rule fails.
    pub error_message: Option<String>,
    /// A disabled constraint is trivially satisfied without being removed
    /// from the declaration.
    pub enabled: bool,
    /// Date format (chrono syntax) for date-aware rules.
    pub format: Option<String>,
}

impl Constraint {
    /// Create a constraint with the given value.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            error_message: None,
            enabled: true,
            format: None,
        }
    }

    /// Set the override error message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Set the date format (chrono syntax).
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Disable the constraint without removing it.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Self::new(Value::Bool(true))
    }
}

/// A custom per-field or per-rule async predicate.
///
/// Invoked with the field's extracted value, the full form context, and a
/// handle to the field. Sync predicates are wrapped into ready futures at
/// construction; there is a single calling convention downstream.
#[derive(Clone)]
pub struct CustomRule(
    Arc<dyn Fn(Value, Value, FieldHandle) -> BoxFuture<'static, Verdict> + Send + Sync>,
);

impl CustomRule {
    /// Create a custom rule from an async predicate.
    pub fn new<F, Fut>(predicate: F) -> Self
    where
        F: Fn(Value, Value, FieldHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Verdict> + Send + 'static,
    {
        Self(Arc::new(move |value, context, field| {
            Box::pin(predicate(value, context, field))
        }))
    }

    /// Create a custom rule from a synchronous predicate.
    pub fn sync<F>(predicate: F) -> Self
    where
        F: Fn(&Value, &Value, &dyn Field) -> Verdict + Send + Sync + 'static,
    {
        Self(Arc::new(move |value, context, field| {
            let verdict = predicate(&value, &context, field.as_ref());
            Box::pin(std::future::ready(verdict))
        }))
    }

    /// Invoke the predicate.
    pub fn call(&self, value: Value, context: Value, field: FieldHandle) -> BoxFuture<'static, Verdict> {
        (self.0)(value, context, field)
    }
}

impl std::fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CustomRule")
    }
}

/// One declared rule: a bare shorthand, a full constraint, or a custom
/// predicate.
#[derive(Debug, Clone)]
pub enum RuleSpec {
    /// Bare shorthand (`true`, `18`, `"^a.*"`), normalized to a constraint.
    Literal(Value),
    /// Full constraint configuration.
    Constraint(Constraint),
    /// Custom predicate; the rule name is only used for message lookup.
    Custom(CustomRule),
}

impl RuleSpec {
    /// Normalize into a constraint. `Custom` specs have no constraint; they
    /// get the default.
    pub fn constraint(&self) -> Constraint {
        match self {
            Self::Literal(value) => Constraint::new(value.clone()),
            Self::Constraint(constraint) => constraint.clone(),
            Self::Custom(_) => Constraint::default(),
        }
    }
}

impl From<Constraint> for RuleSpec {
    fn from(constraint: Constraint) -> Self {
        Self::Constraint(constraint)
    }
}

impl From<CustomRule> for RuleSpec {
    fn from(rule: CustomRule) -> Self {
        Self::Custom(rule)
    }
}

impl From<bool> for RuleSpec {
    fn from(value: bool) -> Self {
        Self::Literal(Value::Bool(value))
    }
}

impl From<i64> for RuleSpec {
    fn from(value: i64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<f64> for RuleSpec {
    fn from(value: f64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<&str> for RuleSpec {
    fn from(value: &str) -> Self {
        Self::Literal(Value::from(value))
    }
}

/// A field's declared validation: an ordered rule map or a single custom
/// predicate covering the whole field.
///
/// Declaration order is semantic — it decides which failing rule's message
/// wins, even though rules execute concurrently.
#[derive(Debug, Clone)]
pub enum RuleSet {
    /// Ordered `(rule name, spec)` pairs.
    Declared(Vec<(String, RuleSpec)>),
    /// One custom predicate validating the whole field.
    Custom(CustomRule),
}

impl RuleSet {
    /// Create an empty declared rule set.
    pub fn new() -> Self {
        Self::Declared(Vec::new())
    }

    /// Create a whole-field custom rule set.
    pub fn custom(rule: CustomRule) -> Self {
        Self::Custom(rule)
    }

    /// Append a rule. No-op on a whole-field custom set.
    pub fn rule(self, name: impl Into<String>, spec: impl Into<RuleSpec>) -> Self {
        match self {
            Self::Declared(mut rules) => {
                rules.push((name.into(), spec.into()));
                Self::Declared(rules)
            }
            custom @ Self::Custom(_) => custom,
        }
    }

    /// Whether a rule name is declared.
    pub fn declares(&self, name: &str) -> bool {
        matches!(self, Self::Declared(rules) if rules.iter().any(|(rule, _)| rule == name))
    }

    /// Whether the set declares nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Declared(rules) => rules.is_empty(),
            Self::Custom(_) => false,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

/// A synchronous library rule.
pub type SyncRuleFn =
    Arc<dyn Fn(&Value, &Value, &Constraint, &dyn Field) -> Verdict + Send + Sync>;

/// An asynchronous library rule.
pub type AsyncRuleFn = Arc<
    dyn Fn(Value, Value, Constraint, FieldHandle) -> BoxFuture<'static, Verdict> + Send + Sync,
>;

/// A named, reusable predicate registered in the library.
#[derive(Clone)]
pub enum Rule {
    Sync(SyncRuleFn),
    Async(AsyncRuleFn),
}

/// Mapping from rule name to predicate. Leaf dependency; knows nothing about
/// fields' registration or form state.
///
/// Cheap to clone; all clones share the same underlying table, so rules
/// registered after a validator was compiled are still visible to it.
#[derive(Clone)]
pub struct RuleLibrary {
    inner: Arc<RwLock<HashMap<String, Rule>>>,
}

impl RuleLibrary {
    /// Create an empty library.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a library preloaded with the built-in rules.
    pub fn with_builtins() -> Self {
        let library = Self::empty();
        library.register_sync("required", required::validate);
        library.register_sync("email", email::validate);
        library.register_sync("phone", phone::validate);
        library.register_sync("pattern", pattern::validate);
        library.register_sync("number", number::validate);
        library.register_sync("min", min::validate);
        library.register_sync("max", max::validate);
        library.register_sync("min_length", min_length::validate);
        library.register_sync("max_length", max_length::validate);
        library.register_sync("min_checked", min_checked::validate);
        library.register_sync("max_checked", max_checked::validate);
        library.register_sync("step", step::validate);
        library.register_sync("date", date::validate);
        library.register_sync("matches", matches::validate);
        library
    }

    /// Register a rule under a name, replacing any previous registration.
    pub fn register(&self, name: impl Into<String>, rule: Rule) {
        if let Ok(mut rules) = self.inner.write() {
            rules.insert(name.into(), rule);
        }
    }

    /// Register a synchronous rule.
    pub fn register_sync<F>(&self, name: impl Into<String>, rule: F)
    where
        F: Fn(&Value, &Value, &Constraint, &dyn Field) -> Verdict + Send + Sync + 'static,
    {
        self.register(name, Rule::Sync(Arc::new(rule)));
    }

    /// Register an asynchronous rule.
    pub fn register_async<F, Fut>(&self, name: impl Into<String>, rule: F)
    where
        F: Fn(Value, Value, Constraint, FieldHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Verdict> + Send + 'static,
    {
        self.register(
            name,
            Rule::Async(Arc::new(move |value, context, constraint, field| {
                Box::pin(rule(value, context, constraint, field))
            })),
        );
    }

    /// Look up a rule by name.
    pub fn get(&self, name: &str) -> Option<Rule> {
        self.inner.read().ok()?.get(name).cloned()
    }

    /// Whether a rule name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .map(|rules| rules.contains_key(name))
            .unwrap_or(false)
    }
}

impl Default for RuleLibrary {
    fn default() -> Self {
        Self::with_builtins()
    }
}
