//! `date`: the value must parse strictly as a date.
//!
//! Accepts ISO (`%Y-%m-%d`) alongside the constraint's configured format
//! (default `%m/%d/%Y`).

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

    let format = constraint.format.as_deref();
    if utils::parse_date(value, format).is_some() {
        return Verdict::Pass;
    }

    let message = constraint.error_message.clone().unwrap_or_else(|| {
        format!(
            "Format needs to be {}",
            format.unwrap_or(utils::DEFAULT_DATE_FORMAT)
        )
    });
    Verdict::fail_with(message)
}
