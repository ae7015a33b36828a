//! `max`: upper bound on a numeric value, a date, or a checked count.

use serde_json::Value;

use crate::field::Field;
use crate::rules::{Constraint, max_checked, utils};
use crate::verdict::Verdict;

pub(super) fn validate(
    value: &Value,
    context: &Value,
    constraint: &Constraint,
    field: &dyn Field,
) -> Verdict {
    if field.multiple() && value.is_array() {
        return max_checked::validate(value, context, constraint, field);
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
            (Some(actual), Some(bound)) => Verdict::check(actual <= bound, message),
            _ => Verdict::Fail(message.map(str::to_string)),
        };
    }

    match (utils::to_number(value), utils::to_number(&constraint.value)) {
        (Some(actual), Some(bound)) => Verdict::check(actual <= bound, message),
        _ => Verdict::Fail(message.map(str::to_string)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ValueField;
    use serde_json::json;

    #[test]
    fn test_max_numeric() {
        let field = ValueField::new("count");
        let constraint = Constraint::new(10);
        assert_eq!(
            validate(&json!(10), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
        assert_eq!(
            validate(&json!(11), &Value::Null, &constraint, &field),
            Verdict::fail()
        );
    }

    #[test]
    fn test_max_non_numeric_value_fails() {
        let field = ValueField::new("count");
        let constraint = Constraint::new(10).with_message("not a number");
        assert_eq!(
            validate(&json!("abc"), &Value::Null, &constraint, &field),
            Verdict::fail_with("not a number")
        );
    }
}
