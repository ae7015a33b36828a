//! `required`: the value must be non-empty.
//!
//! The only rule that fails on empty values; every other rule treats an
//! empty value as vacuously valid so optional fields stay optional.

use serde_json::Value;

use crate::field::Field;
use crate::rules::{Constraint, utils};
use crate::verdict::Verdict;

pub(super) fn validate(
    value: &Value,
    _context: &Value,
    constraint: &Constraint,
    _field: &dyn Field,
) -> Verdict {
    // `required: false` shorthand turns the rule off entirely.
    let enabled = !matches!(constraint.value, Value::Bool(false));
    Verdict::check(
        !enabled || !utils::is_empty(value),
        constraint.error_message.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ValueField;
    use serde_json::json;

    #[test]
    fn test_required() {
        let field = ValueField::new("f");
        let constraint = Constraint::new(true).with_message("req");
        assert_eq!(
            validate(&json!(""), &Value::Null, &constraint, &field),
            Verdict::fail_with("req")
        );
        assert_eq!(
            validate(&json!("x"), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
    }

    #[test]
    fn test_required_false_shorthand_disables() {
        let field = ValueField::new("f");
        let constraint = Constraint::new(false);
        assert_eq!(
            validate(&json!(""), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
    }
}
