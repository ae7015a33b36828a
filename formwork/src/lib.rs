//! Declarative, field-level, async form validation.
//!
//! A [`FormController`](controller::FormController) owns a registry of live
//! fields, a shared dirty/touched/bad/error state tracker, and a library of
//! named validation rules. Fields declare their rules as data; the rule
//! compiler turns each declaration into one cached async validator whose
//! failing rule is always decided in declaration order. Submitting runs the
//! aggregate pass over every field and dispatches valid/invalid callbacks,
//! and all state changes reach the fields through one trailing-edge
//! throttled broadcast.
//!
//! Fields are anything implementing the [`Field`](field::Field) trait;
//! [`ValueField`](fields::ValueField) is the built-in plain-value adapter.

pub mod broadcast;
pub mod compiler;
pub mod controller;
pub mod error;
pub mod field;
pub mod fields;
pub mod path;
pub mod registry;
pub mod rules;
pub mod state;
pub mod verdict;

pub use controller::{FormController, FormOptions};

pub mod prelude {
    pub use crate::broadcast::UpdateBroadcaster;
    pub use crate::controller::{
        FormController, FormOptions, SubmitOutcome, ValidationReport,
    };
    pub use crate::error::FormError;
    pub use crate::field::{Field, FieldHandle, FieldId, FieldKind, Updater};
    pub use crate::fields::{ErrorMessages, ValueField};
    pub use crate::registry::FieldRegistry;
    pub use crate::rules::{Constraint, CustomRule, RuleLibrary, RuleSet, RuleSpec};
    pub use crate::state::StateTracker;
    pub use crate::verdict::Verdict;
}
