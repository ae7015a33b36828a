//! `min_length`: minimum length of a string value, in characters.

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

    match (value.as_str(), utils::to_number(&constraint.value)) {
        (Some(text), Some(bound)) => Verdict::check(text.chars().count() as f64 >= bound, message),
        _ => Verdict::Fail(message.map(str::to_string)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ValueField;
    use serde_json::json;

    #[test]
    fn test_min_length_counts_chars() {
        let field = ValueField::new("f");
        let constraint = Constraint::new(3).with_message("too short");
        assert_eq!(
            validate(&json!("abc"), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
        assert_eq!(
            validate(&json!("æøå"), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
        assert_eq!(
            validate(&json!("ab"), &Value::Null, &constraint, &field),
            Verdict::fail_with("too short")
        );
    }
}
