//! Compiles a field's declarative rules into one async validator.
//!
//! The compiled validator runs every applicable rule concurrently, then
//! reduces the results strictly in declaration order: the first failing rule
//! decides the field's validity and its message. Execution order therefore
//! never affects which error message wins.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;
use log::warn;
use serde_json::Value;

use crate::error::FormError;
use crate::field::FieldHandle;
use crate::rules::{BoxFuture, Rule, RuleLibrary, RuleSpec};
use crate::state::StateTracker;
use crate::verdict::Verdict;

/// A compiled per-field validator: `(value, context) -> Verdict`.
///
/// Rejects with [`FormError::UnknownRule`] when the declaration references a
/// rule the library does not know — a programmer error, never a field error.
pub type FieldValidator =
    Arc<dyn Fn(Value, Value) -> BoxFuture<'static, Result<Verdict, FormError>> + Send + Sync>;

/// Form-level per-rule override messages, the last stop of the fallback
/// chain before a generic failure.
pub type FormMessages = Arc<HashMap<String, String>>;

/// Compile a declarative rule list into a single cached validator.
///
/// The validator checks the field's **bad** state at every invocation: a
/// field whose own value extraction is broken short-circuits to a generic
/// failure without evaluating any rule.
pub fn compile(
    field: FieldHandle,
    rules: Vec<(String, RuleSpec)>,
    library: RuleLibrary,
    state: StateTracker,
    form_messages: FormMessages,
) -> FieldValidator {
    let rules = Arc::new(rules);

    Arc::new(move |value: Value, context: Value| {
        let field = Arc::clone(&field);
        let rules = Arc::clone(&rules);
        let library = library.clone();
        let state = state.clone();
        let form_messages = Arc::clone(&form_messages);

        Box::pin(async move {
            if state.is_bad(&field.name()) {
                return Ok(Verdict::fail());
            }

            // Normalize every rule into one future up front; unknown names
            // reject the whole validator before anything runs.
            let mut pending: Vec<(String, BoxFuture<'static, Verdict>)> = Vec::new();
            for (name, spec) in rules.iter() {
                let future: BoxFuture<'static, Verdict> = match spec {
                    RuleSpec::Custom(custom) => {
                        custom.call(value.clone(), context.clone(), Arc::clone(&field))
                    }
                    _ => {
                        let constraint = spec.constraint();
                        if !constraint.enabled {
                            Box::pin(std::future::ready(Verdict::Pass))
                        } else {
                            match library.get(name) {
                                None => {
                                    return Err(FormError::unknown_rule(name, field.name()));
                                }
                                Some(Rule::Sync(rule)) => {
                                    let verdict =
                                        rule(&value, &context, &constraint, field.as_ref());
                                    Box::pin(std::future::ready(verdict))
                                }
                                Some(Rule::Async(rule)) => rule(
                                    value.clone(),
                                    context.clone(),
                                    constraint,
                                    Arc::clone(&field),
                                ),
                            }
                        }
                    }
                };
                pending.push((name.clone(), future));
            }

            let (names, futures): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
            let results = join_all(
                futures
                    .into_iter()
                    .map(|future| AssertUnwindSafe(future).catch_unwind()),
            )
            .await;

            // Reduce in declaration order; completion order is irrelevant.
            for (name, result) in names.into_iter().zip(results) {
                let verdict = result.unwrap_or_else(|_| {
                    warn!("rule '{name}' panicked while validating '{}'", field.name());
                    Verdict::fail()
                });
                if let Verdict::Fail(message) = verdict {
                    let message = message
                        .or_else(|| field.error_message(&name))
                        .or_else(|| form_messages.get(&name).cloned());
                    return Ok(Verdict::Fail(message));
                }
            }
            Ok(Verdict::Pass)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::UpdateBroadcaster;
    use crate::fields::ValueField;
    use crate::rules::{Constraint, CustomRule, RuleSet};
    use serde_json::json;

    fn state() -> StateTracker {
        StateTracker::new(UpdateBroadcaster::default())
    }

    fn declared(rules: RuleSet) -> Vec<(String, RuleSpec)> {
        match rules {
            RuleSet::Declared(rules) => rules,
            RuleSet::Custom(_) => panic!("expected declared rules"),
        }
    }

    #[tokio::test]
    async fn test_first_declared_failure_wins() {
        let field: FieldHandle = Arc::new(ValueField::new("f"));
        let rules = declared(
            RuleSet::new()
                .rule("a", CustomRule::sync(|_, _, _| Verdict::fail_with("A")))
                .rule("b", CustomRule::sync(|_, _, _| Verdict::fail_with("B"))),
        );
        let validator = compile(
            field,
            rules,
            RuleLibrary::with_builtins(),
            state(),
            Arc::new(HashMap::new()),
        );

        let verdict = validator(json!("x"), json!({})).await.unwrap();
        assert_eq!(verdict, Verdict::fail_with("A"));
    }

    #[tokio::test]
    async fn test_unknown_rule_rejects() {
        let field: FieldHandle = Arc::new(ValueField::new("f"));
        let rules = declared(RuleSet::new().rule("no_such_rule", true));
        let validator = compile(
            field,
            rules,
            RuleLibrary::with_builtins(),
            state(),
            Arc::new(HashMap::new()),
        );

        let result = validator(json!("x"), json!({})).await;
        assert!(matches!(result, Err(FormError::UnknownRule { .. })));
    }

    #[tokio::test]
    async fn test_bad_field_short_circuits() {
        let field: FieldHandle = Arc::new(ValueField::new("f"));
        let tracker = state();
        tracker.set_bad("f", true, false);
        let rules = declared(
            RuleSet::new().rule("a", CustomRule::sync(|_, _, _| Verdict::fail_with("A"))),
        );
        let validator = compile(
            field,
            rules,
            RuleLibrary::with_builtins(),
            tracker,
            Arc::new(HashMap::new()),
        );

        // Generic failure, not the rule's message: rules never ran.
        let verdict = validator(json!("x"), json!({})).await.unwrap();
        assert_eq!(verdict, Verdict::fail());
    }

    #[tokio::test]
    async fn test_disabled_constraint_is_satisfied() {
        let field: FieldHandle = Arc::new(ValueField::new("f"));
        let rules = declared(RuleSet::new().rule("required", Constraint::new(true).disabled()));
        let validator = compile(
            field,
            rules,
            RuleLibrary::with_builtins(),
            state(),
            Arc::new(HashMap::new()),
        );

        let verdict = validator(json!(""), json!({})).await.unwrap();
        assert_eq!(verdict, Verdict::Pass);
    }

    #[tokio::test]
    async fn test_message_fallback_to_form_map() {
        let field: FieldHandle = Arc::new(ValueField::new("f"));
        let rules = declared(RuleSet::new().rule("required", true));
        let mut messages = HashMap::new();
        messages.insert("required".to_string(), "Pflichtfeld".to_string());
        let validator = compile(
            field,
            rules,
            RuleLibrary::with_builtins(),
            state(),
            Arc::new(messages),
        );

        let verdict = validator(json!(""), json!({})).await.unwrap();
        assert_eq!(verdict, Verdict::fail_with("Pflichtfeld"));
    }
}
