//! `email`: the value must be a syntactically valid email address.

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

    let valid = value
        .as_str()
        .is_some_and(email_address::EmailAddress::is_valid);
    Verdict::check(valid, constraint.error_message.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ValueField;
    use serde_json::json;

    #[test]
    fn test_email() {
        let field = ValueField::new("f");
        let constraint = Constraint::default();
        assert_eq!(
            validate(&json!("a@b.com"), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
        assert_eq!(
            validate(&json!("not-an-email"), &Value::Null, &constraint, &field),
            Verdict::fail()
        );
        // Empty is valid; combine with `required` for non-empty.
        assert_eq!(
            validate(&json!(""), &Value::Null, &constraint, &field),
            Verdict::Pass
        );
    }
}
