//! `matches`: the value must equal another field's value.
//!
//! The constraint value is the peer field's dotted name, resolved against
//! the full form context at validation time.

use serde_json::Value;

use crate::field::Field;
use crate::path;
use crate::rules::{Constraint, utils};
use crate::verdict::Verdict;

pub(super) fn validate(
    value: &Value,
    context: &Value,
    constraint: &Constraint,
    _field: &dyn Field,
) -> Verdict {
    if utils::is_empty(value) {
        return Verdict::Pass;
    }
    let message = constraint.error_message.as_deref();

    let Some(peer) = constraint.value.as_str() else {
        return Verdict::Fail(message.map(str::to_string));
    };
    let peer_value = path::get(context, peer).unwrap_or(&Value::Null);
    Verdict::check(value == peer_value, message)
}
