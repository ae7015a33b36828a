//! `pattern`: the value must match at least one of the configured regexes.
//!
//! The constraint value is a pattern string or an array of alternatives.
//! Patterns may use the `/body/flags` literal form; `i`, `m` and `s` flags
//! are translated to inline regex flags.

use log::warn;
use regex::Regex;
use serde_json::Value;

use crate::field::Field;
use crate::rules::{Constraint, utils};
use crate::verdict::Verdict;

/// Compile a pattern, unwrapping the `/body/flags` literal form.
fn as_regex(pattern: &str) -> Option<Regex> {
    let source = match (pattern.strip_prefix('/'), pattern.rfind('/')) {
        (Some(_), Some(end)) if end > 0 => {
            let body = &pattern[1..end];
            let flags: String = pattern[end + 1..]
                .chars()
                .filter(|c| matches!(c, 'i' | 'm' | 's'))
                .collect();
            if flags.is_empty() {
                body.to_string()
            } else {
                format!("(?{flags}){body}")
            }
        }
        _ => pattern.to_string(),
    };

    match Regex::new(&source) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!("Invalid pattern '{pattern}': {err}");
            None
        }
    }
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

    let Some(text) = value.as_str() else {
        return Verdict::Fail(constraint.error_message.clone());
    };

    let patterns: Vec<&str> = match &constraint.value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    let matched = patterns
        .iter()
        .filter_map(|p| as_regex(p))
        .any(|regex| regex.is_match(text));
    Verdict::check(matched, constraint.error_message.as_deref())
}
