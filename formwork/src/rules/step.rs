//! `step`: the value must be an exact multiple of the constraint.

use serde_json::Value;

use crate::field::Field;
use crate::rules::{Constraint, utils};
use crate::verdict::Verdict;

/// Remainder computed over scaled integers so that e.g. `0.3 % 0.1` is
/// exactly zero despite binary float representation.
fn float_safe_remainder(value: f64, step: f64) -> f64 {
    let decimals = |v: f64| {
        let text = format!("{v}");
        text.split_once('.').map_or(0, |(_, frac)| frac.len())
    };
    let scale = decimals(value).max(decimals(step)) as u32;
    let factor = 10f64.powi(scale as i32);
    let value_int = (value * factor).round() as i64;
    let step_int = (step * factor).round() as i64;
    if step_int == 0 {
        return f64::NAN;
    }
    (value_int % step_int) as f64 / factor
}

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

    match (utils::to_number(value), utils::to_number(&constraint.value)) {
        (Some(actual), Some(step)) => {
            Verdict::check(float_safe_remainder(actual, step) == 0.0, message)
        }
        _ => Verdict::Fail(message.map(str::to_string)),
    }
}
