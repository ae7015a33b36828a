//! Error types for form registration and rule configuration.
//!
//! Validation *failures* are never errors — they travel as [`Verdict`]s
//! through the state tracker. `FormError` covers the programmer-error side:
//! registering a nameless field or declaring a rule the library has never
//! heard of.
//!
//! [`Verdict`]: crate::verdict::Verdict

/// Error type for controller operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FormError {
    /// A field tried to register without a name.
    #[error("Field has no name")]
    MissingName,

    /// A declarative rule map referenced a rule that is not in the library.
    #[error("Unknown validation rule '{rule}' on field '{field}'")]
    UnknownRule { rule: String, field: String },
}

impl FormError {
    /// Creates a new unknown-rule error.
    pub fn unknown_rule(rule: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownRule {
            rule: rule.into(),
            field: field.into(),
        }
    }
}
