//! `max_checked`: maximum number of checked entries in a multi-value field.

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
    if utils::is_empty(value) {
        return Verdict::Pass;
    }
    let message = constraint.error_message.as_deref();

    let Some(items) = value.as_array() else {
        return Verdict::Fail(message.map(str::to_string));
    };

    match utils::to_number(&constraint.value) {
        Some(bound) if !utils::is_decimal(bound) => {
            Verdict::check(items.len() as f64 <= bound, message)
        }
        _ => Verdict::Fail(message.map(str::to_string)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ValueField;
    use serde_json::json;

    #[test]
    fn test_max_checked() {
        let field = ValueField::new("f");
        let constraint = Constraint::new(2);
        assert_eq!(
            validate(&json!(["a", "b"]), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
        assert_eq!(
            validate(&json!(["a", "b", "c"]), &Value::Null, &constraint, &field),
            Verdict::fail()
        );
    }
}
