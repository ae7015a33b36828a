//! `number`: the value must be numeric (or a numeric string).

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
    Verdict::check(
        utils::to_number(value).is_some(),
        constraint.error_message.as_deref(),
    )
}
