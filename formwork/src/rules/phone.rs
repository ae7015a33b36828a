//! `phone`: the value must be a NANP (North American) phone number.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::field::Field;
use crate::rules::{Constraint, utils};
use crate::verdict::Verdict;

static NANP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+?1[.\-\s]?)?\(?[2-9]\d{2}[).\-\s]?\s?[2-9]\d{2}[.\-\s]?\d{4}$")
        .expect("NANP regex is valid")
});

pub(super) fn validate(
    value: &Value,
    _context: &Value,
    constraint: &Constraint,
    _field: &dyn Field,
) -> Verdict {
    if utils::is_empty(value) {
        return Verdict::Pass;
    }

    let valid = value.as_str().is_some_and(|s| NANP.is_match(s));
    Verdict::check(valid, constraint.error_message.as_deref())
}
