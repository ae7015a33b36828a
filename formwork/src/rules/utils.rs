//! Shared helpers for the built-in rules.

use chrono::NaiveDate;
use serde_json::Value;

use crate::field::{Field, FieldKind};
use crate::rules::RuleSet;

/// Strict ISO date format, always accepted alongside the configured format.
pub(crate) const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default display date format when a constraint does not configure one.
pub(crate) const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// An "empty" value is vacuously valid for every rule except `required`.
pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Coerce a value to a finite float, accepting numeric strings.
pub(crate) fn to_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

pub(crate) fn is_decimal(value: f64) -> bool {
    value.fract() != 0.0
}

/// Parse a date value strictly against ISO and the configured format.
pub(crate) fn parse_date(value: &Value, format: Option<&str>) -> Option<NaiveDate> {
    let text = value.as_str()?;
    let format = format.unwrap_or(DEFAULT_DATE_FORMAT);
    NaiveDate::parse_from_str(text, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text, format))
        .ok()
}

/// Whether a field's value should be compared as a date by `min`/`max`.
pub(crate) fn is_date_field(field: &dyn Field) -> bool {
    if field.kind() == FieldKind::Date {
        return true;
    }
    matches!(field.rules(), Some(RuleSet::Declared(rules)) if rules.iter().any(|(name, _)| name == "date"))
}
