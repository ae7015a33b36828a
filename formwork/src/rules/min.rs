//! `min`: lower bound on a numeric value, a date, or a checked count.

use serde_json::Value;

use crate::field::Field;
use crate::rules::{Constraint, min_checked, utils};
use crate::verdict::Verdict;

pub(super) fn validate(
    value: &Value,
    context: &Value,
    constraint: &Constraint,
    field: &dyn Field,
) -> Verdict {
    // Multi-value fields bound the number of checked entries instead.
    if field.multiple() && value.is_array() {
        return min_checked::validate(value, context, constraint, field);
    }

    if utils::is_empty(value) {
        return Verdict::Pass;
    }
    let message = constraint.error_message.as_deref();

    if utils::is_date_field(field) {
        let format = constraint.format.as_deref();
        let actual = utils::parse_date(value, format);
        let bound = utils::parse_date(&constraint.value, format);
        return match (actual, bound) {
            (Some(actual), Some(bound)) => Verdict::check(actual >= bound, message),
            _ => Verdict::Fail(message.map(str::to_string)),
        };
    }

    match (utils::to_number(value), utils::to_number(&constraint.value)) {
        (Some(actual), Some(bound)) => Verdict::check(actual >= bound, message),
        _ => Verdict::Fail(message.map(str::to_string)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use crate::fields::ValueField;
    use serde_json::json;

    #[test]
    fn test_min_numeric() {
        let field = ValueField::new("age");
        let constraint = Constraint::new(18).with_message("too young");
        assert_eq!(
            validate(&json!(21), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
        assert_eq!(
            validate(&json!("15"), &Value::Null, &constraint, &field),
            Verdict::fail_with("too young")
        );
    }

    #[test]
    fn test_min_date() {
        let field = ValueField::new("start").with_kind(FieldKind::Date);
        let constraint = Constraint::new("2024-01-01");
        assert_eq!(
            validate(&json!("2024-06-01"), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
        assert_eq!(
            validate(&json!("2023-12-31"), &Value::Null, &constraint, &field),
            Verdict::fail()
        );
    }

    #[test]
    fn test_min_delegates_to_checked_count() {
        let field = ValueField::new("toppings").with_multiple(true);
        let constraint = Constraint::new(2);
        assert_eq!(
            validate(&json!(["a"]), &Value::Null, &constraint, &field),
            Verdict::fail()
        );
        assert_eq!(
            validate(&json!(["a", "b"]), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
    }
}
