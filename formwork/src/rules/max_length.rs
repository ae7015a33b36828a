//! `max_length`: maximum length of a string value, in characters.

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
        (Some(text), Some(bound)) => Verdict::check(text.chars().count() as f64 <= bound, message),
        _ => Verdict::Fail(message.map(str::to_string)),
    }
}
