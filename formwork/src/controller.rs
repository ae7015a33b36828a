//! The form controller.
//!
//! One controller instance owns a field registry, the shared state tracker,
//! the rule library, and the throttled broadcaster, and orchestrates the
//! aggregate validation pass on submit. It is an explicit object passed to
//! fields by reference (cheap clone), never ambient context.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use formwork::controller::{FormController, FormOptions};
//! use formwork::fields::ValueField;
//! use formwork::rules::RuleSet;
//!
//! # async fn demo() -> Result<(), formwork::error::FormError> {
//! let form = FormController::new(FormOptions::default());
//! let email = ValueField::new("email").with_rules(
//!     RuleSet::new().rule("required", true).rule("email", true),
//! );
//! form.register(Arc::new(email.clone()), None)?;
//!
//! email.set_text("kari@example.com");
//! form.field_changed("email").await?;
//! let outcome = form.submit().await?;
//! assert!(outcome.is_valid());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::debug;
use serde_json::Value;

use crate::broadcast::{DEFAULT_THROTTLE_WINDOW, UpdateBroadcaster};
use crate::compiler::{self, FormMessages};
use crate::error::FormError;
use crate::field::{Field, FieldHandle, Updater};
use crate::path;
use crate::registry::{FieldRegistry, Registration};
use crate::rules::{RuleLibrary, RuleSet};
use crate::state::StateTracker;
use crate::verdict::Verdict;

/// Sentinel appended to the error list when a form-level rule fails.
pub const FORM_RULE_SENTINEL: &str = "*";

/// A form-level rule evaluated over the full value context.
pub type FormRule = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Fired unconditionally after every validation pass of a submit.
pub type SubmitCallback = Arc<dyn Fn(&ValidationReport, &Value) + Send + Sync>;

/// Fired when a submit passes validation.
pub type ValidSubmitCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Fired with the invalid field names when a submit fails validation.
pub type InvalidSubmitCallback = Arc<dyn Fn(&[String], &Value) + Send + Sync>;

/// Result of an aggregate validation pass.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Invalid field names in registration order, plus `"*"` for a failing
    /// form-level rule.
    pub errors: Vec<String>,
}

/// Outcome of a submit attempt.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The form is administratively disabled; nothing ran.
    Disabled,
    Valid {
        values: Value,
    },
    Invalid {
        errors: Vec<String>,
        values: Value,
    },
}

impl SubmitOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Controller configuration.
#[derive(Clone, Default)]
pub struct FormOptions {
    disabled: bool,
    /// Default values, resolved by dotted field name.
    model: Value,
    /// Form-level per-rule override messages, the last message fallback.
    error_messages: HashMap<String, String>,
    form_rules: Vec<FormRule>,
    throttle_window: Option<Duration>,
    /// Opt-in: unregistering a field also clears its dirty/touched/bad/error
    /// state. Off by default; stale state survives unregistration otherwise.
    clear_state_on_unregister: bool,
    on_submit: Option<SubmitCallback>,
    on_valid_submit: Option<ValidSubmitCallback>,
    on_invalid_submit: Option<InvalidSubmitCallback>,
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn model(mut self, model: Value) -> Self {
        self.model = model;
        self
    }

    /// Register a form-level override message for a rule name.
    pub fn error_message(mut self, rule: impl Into<String>, message: impl Into<String>) -> Self {
        self.error_messages.insert(rule.into(), message.into());
        self
    }

    /// Add a form-level rule over the full value context.
    pub fn form_rule(mut self, rule: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.form_rules.push(Arc::new(rule));
        self
    }

    pub fn throttle_window(mut self, window: Duration) -> Self {
        self.throttle_window = Some(window);
        self
    }

    pub fn clear_state_on_unregister(mut self, clear: bool) -> Self {
        self.clear_state_on_unregister = clear;
        self
    }

    pub fn on_submit(mut self, callback: impl Fn(&ValidationReport, &Value) + Send + Sync + 'static) -> Self {
        self.on_submit = Some(Arc::new(callback));
        self
    }

    pub fn on_valid_submit(mut self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_valid_submit = Some(Arc::new(callback));
        self
    }

    pub fn on_invalid_submit(
        mut self,
        callback: impl Fn(&[String], &Value) + Send + Sync + 'static,
    ) -> Self {
        self.on_invalid_submit = Some(Arc::new(callback));
        self
    }
}

struct ControllerInner {
    registry: FieldRegistry,
    state: StateTracker,
    broadcaster: UpdateBroadcaster,
    library: RuleLibrary,
    messages: FormMessages,
    model: Value,
    form_rules: Vec<FormRule>,
    clear_state_on_unregister: bool,
    on_submit: Option<SubmitCallback>,
    on_valid_submit: Option<ValidSubmitCallback>,
    on_invalid_submit: Option<InvalidSubmitCallback>,
    disabled: AtomicBool,
    submitted: AtomicBool,
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        self.broadcaster.shutdown();
    }
}

/// The form controller. Cheap to clone; all clones drive the same form.
#[derive(Clone)]
pub struct FormController {
    inner: Arc<ControllerInner>,
}

impl FormController {
    pub fn new(options: FormOptions) -> Self {
        let window = options.throttle_window.unwrap_or(DEFAULT_THROTTLE_WINDOW);
        let broadcaster = UpdateBroadcaster::new(window);
        let registry = FieldRegistry::new();
        let state = StateTracker::new(broadcaster.clone());

        let fanout_registry = registry.clone();
        broadcaster.install(move || fanout_registry.notify_all());

        Self {
            inner: Arc::new(ControllerInner {
                registry,
                state,
                broadcaster,
                library: RuleLibrary::with_builtins(),
                messages: Arc::new(options.error_messages),
                model: options.model,
                form_rules: options.form_rules,
                clear_state_on_unregister: options.clear_state_on_unregister,
                on_submit: options.on_submit,
                on_valid_submit: options.on_valid_submit,
                on_invalid_submit: options.on_invalid_submit,
                disabled: AtomicBool::new(options.disabled),
                submitted: AtomicBool::new(false),
            }),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a field (and optionally its updater), compiling and caching
    /// its validator.
    pub fn register(&self, field: FieldHandle, updater: Option<Updater>) -> Result<(), FormError> {
        let name = field.name();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }

        let (validator, custom) = match field.rules() {
            Some(RuleSet::Declared(rules)) => (
                Some(compiler::compile(
                    Arc::clone(&field),
                    rules,
                    self.inner.library.clone(),
                    self.inner.state.clone(),
                    Arc::clone(&self.inner.messages),
                )),
                None,
            ),
            Some(RuleSet::Custom(rule)) => (None, Some(rule)),
            None => (None, None),
        };

        self.inner.registry.register(Registration {
            field,
            updater,
            validator,
            custom,
        })
    }

    /// Unregister a field. Idempotent.
    pub fn unregister(&self, field: &dyn Field) {
        self.unregister_name(&field.name());
    }

    /// Unregister by name. Idempotent.
    pub fn unregister_name(&self, name: &str) {
        if self.inner.registry.unregister(name) && self.inner.clear_state_on_unregister {
            self.inner.state.clear(name, true);
        }
    }

    /// The name this exact field instance is registered under, if any.
    pub fn registered_name(&self, field: &dyn Field) -> Option<String> {
        self.inner.registry.registered_name(field)
    }

    /// The shared rule library, for registering plugin rules.
    pub fn rules(&self) -> RuleLibrary {
        self.inner.library.clone()
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// A registered field's live value.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.inner.registry.value(name)
    }

    /// The full nested value context from every registered field.
    pub fn values(&self) -> Value {
        self.inner.registry.values()
    }

    /// A field's default value from the form model, by dotted name.
    pub fn default_value(&self, name: &str) -> Option<Value> {
        path::get(&self.inner.model, name).cloned()
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn set_dirty(&self, name: &str, dirty: bool, update: bool) {
        self.inner.state.set_dirty(name, dirty, update);
    }

    pub fn set_touched(&self, name: &str, touched: bool, update: bool) {
        self.inner.state.set_touched(name, touched, update);
    }

    pub fn set_bad(&self, name: &str, bad: bool, update: bool) {
        self.inner.state.set_bad(name, bad, update);
    }

    pub fn set_error(&self, name: &str, error: bool, message: Option<String>, update: bool) {
        self.inner.state.set_error(name, error, message, update);
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.inner.state.is_dirty(name)
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.inner.state.is_touched(name)
    }

    pub fn is_bad(&self, name: &str) -> bool {
        self.inner.state.is_bad(name)
    }

    pub fn has_error(&self, name: &str) -> bool {
        self.inner.state.has_error(name)
    }

    pub fn any_error(&self) -> bool {
        self.inner.state.any_error()
    }

    /// The message to display for a field in error.
    pub fn error_or(&self, name: &str, fallback: &str) -> String {
        self.inner.state.error_or(name, fallback)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.inner.disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.disabled.load(Ordering::SeqCst)
    }

    /// Whether a submit has ever been attempted. Once set, field changes
    /// revalidate live.
    pub fn submitted(&self) -> bool {
        self.inner.submitted.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Field events
    // =========================================================================

    /// A field's value changed: mark it dirty and touched, and revalidate it
    /// when a submit has already been attempted.
    pub async fn field_changed(&self, name: &str) -> Result<(), FormError> {
        self.inner.state.set_dirty(name, true, true);
        self.inner.state.set_touched(name, true, true);
        if self.submitted() {
            self.validate_field(name).await?;
        }
        Ok(())
    }

    /// A field lost focus: mark it touched.
    pub fn field_blurred(&self, name: &str) {
        self.inner.state.set_touched(name, true, true);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate one field against the current live values.
    pub async fn validate_field(&self, name: &str) -> Result<bool, FormError> {
        let values = self.values();
        self.validate_one(name, &values, true).await
    }

    /// Validate one field against a value context.
    ///
    /// An unknown name validates trivially and leaves the error map
    /// untouched. The verdict of a field that unregistered while its rules
    /// were in flight is discarded.
    pub async fn validate_one(
        &self,
        name: &str,
        context: &Value,
        update: bool,
    ) -> Result<bool, FormError> {
        let Some((field, validator, custom)) = self.inner.registry.validation_parts(name) else {
            return Ok(true);
        };

        let value = path::get(context, name).cloned().unwrap_or(Value::Null);
        let verdict = if let Some(custom) = custom {
            custom.call(value, context.clone(), field).await
        } else if let Some(validator) = validator {
            validator(value, context.clone()).await?
        } else {
            Verdict::Pass
        };

        let valid = verdict.is_pass();
        if self.inner.registry.contains(name) {
            self.inner.state.apply_verdict(name, &verdict, update);
        } else {
            debug!("discarding verdict for unregistered field '{name}'");
        }
        Ok(valid)
    }

    /// Validate every registered field in registration order, then the
    /// form-level rules.
    ///
    /// Fields are awaited one after another (their internal rules still run
    /// concurrently), so cross-field effects of custom rules are serialized
    /// within one pass.
    pub async fn validate_all(
        &self,
        context: &Value,
        update: bool,
    ) -> Result<ValidationReport, FormError> {
        let mut errors = Vec::new();

        for name in self.inner.registry.names() {
            if !self.validate_one(&name, context, update).await? {
                errors.push(name);
            }
        }

        if !self.inner.form_rules.iter().all(|rule| rule(context)) {
            errors.push(FORM_RULE_SENTINEL.to_string());
        }

        Ok(ValidationReport {
            is_valid: errors.is_empty(),
            errors,
        })
    }

    // =========================================================================
    // Submit
    // =========================================================================

    /// Run the aggregate validation pass and dispatch the outcome.
    ///
    /// A disabled form short-circuits: no validation, no callbacks. Otherwise
    /// every field is validated with per-field broadcasts suppressed, every
    /// field is marked touched in one batch, and a single throttled broadcast
    /// is flushed before exactly one of the valid/invalid callbacks fires.
    pub async fn submit(&self) -> Result<SubmitOutcome, FormError> {
        if self.is_disabled() {
            debug!("submit ignored: form disabled");
            return Ok(SubmitOutcome::Disabled);
        }

        let values = self.values();
        let report = self.validate_all(&values, false).await?;

        let names = self.inner.registry.names();
        self.inner
            .state
            .set_touched_many(names.iter().map(String::as_str), true, false);
        self.inner.broadcaster.notify();

        if let Some(on_submit) = &self.inner.on_submit {
            on_submit(&report, &values);
        }

        let outcome = if report.is_valid {
            if let Some(on_valid) = &self.inner.on_valid_submit {
                on_valid(&values);
            }
            SubmitOutcome::Valid { values }
        } else {
            if let Some(on_invalid) = &self.inner.on_invalid_submit {
                on_invalid(&report.errors, &values);
            }
            SubmitOutcome::Invalid {
                errors: report.errors,
                values,
            }
        };

        self.inner.submitted.store(true, Ordering::SeqCst);
        Ok(outcome)
    }
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(FormOptions::default())
    }
}
