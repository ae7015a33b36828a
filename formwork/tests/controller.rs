//! End-to-end tests driving the controller the way an embedding would.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use formwork::prelude::*;
use serde_json::{Value, json};

fn handle(field: &ValueField) -> FieldHandle {
    Arc::new(field.clone())
}

#[tokio::test]
async fn test_register_rejects_empty_name() {
    let form = FormController::default();
    let field = ValueField::new("");
    assert!(matches!(
        form.register(handle(&field), None),
        Err(FormError::MissingName)
    ));
}

#[tokio::test]
async fn test_invalid_submit_reports_fields_in_registration_order() {
    let form = FormController::default();
    let email = ValueField::new("email")
        .with_kind(FieldKind::Email)
        .with_required(true);
    let age = ValueField::new("age")
        .with_rules(RuleSet::new().rule("min", 18))
        .with_value(json!(15));
    form.register(handle(&email), None).unwrap();
    form.register(handle(&age), None).unwrap();

    let outcome = form.submit().await.unwrap();
    let SubmitOutcome::Invalid { errors, .. } = outcome else {
        panic!("expected invalid submit");
    };
    assert_eq!(errors, vec!["email".to_string(), "age".to_string()]);

    // Submitting touches every field even without interaction.
    assert!(form.is_touched("email"));
    assert!(form.is_touched("age"));
    assert!(form.has_error("email"));
    assert!(form.has_error("age"));

    email.set_text("a@b.com");
    age.set_value(json!(21));
    let outcome = form.submit().await.unwrap();
    assert!(outcome.is_valid());
    assert!(!form.any_error());
}

#[tokio::test]
async fn test_valid_submit_carries_nested_values() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let form = FormController::new(FormOptions::new().on_valid_submit(move |values| {
        assert_eq!(values["address"]["city"], json!("Oslo"));
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let name = ValueField::new("name").with_value(json!("Kari"));
    let city = ValueField::new("address.city").with_value(json!("Oslo"));
    form.register(handle(&name), None).unwrap();
    form.register(handle(&city), None).unwrap();

    let outcome = form.submit().await.unwrap();
    assert!(outcome.is_valid());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(form.submitted());
}

#[tokio::test]
async fn test_on_submit_fires_for_both_outcomes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let form = FormController::new(FormOptions::new().on_submit(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    let field = ValueField::new("f").with_required(true);
    form.register(handle(&field), None).unwrap();

    assert!(!form.submit().await.unwrap().is_valid());
    field.set_text("x");
    assert!(form.submit().await.unwrap().is_valid());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_form_rule_failure_uses_sentinel() {
    let form = FormController::new(
        FormOptions::new().form_rule(|values| values["a"] == values["b"]),
    );
    let a = ValueField::new("a").with_value(json!("x"));
    let b = ValueField::new("b").with_value(json!("y"));
    form.register(handle(&a), None).unwrap();
    form.register(handle(&b), None).unwrap();

    let SubmitOutcome::Invalid { errors, .. } = form.submit().await.unwrap() else {
        panic!("expected invalid submit");
    };
    assert_eq!(errors, vec!["*".to_string()]);

    b.set_value(json!("x"));
    assert!(form.submit().await.unwrap().is_valid());
}

#[tokio::test]
async fn test_disabled_form_short_circuits_submit() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let form = FormController::new(
        FormOptions::new()
            .disabled(true)
            .on_submit(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
    );
    let field = ValueField::new("f").with_required(true);
    form.register(handle(&field), None).unwrap();

    assert!(matches!(
        form.submit().await.unwrap(),
        SubmitOutcome::Disabled
    ));
    assert!(!form.is_touched("f"));
    assert!(!form.submitted());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    form.set_disabled(false);
    assert!(!form.submit().await.unwrap().is_valid());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_field_changed_revalidates_only_after_submit() {
    let form = FormController::default();
    let field = ValueField::new("email").with_kind(FieldKind::Email);
    form.register(handle(&field), None).unwrap();

    field.set_text("not-an-email");
    form.field_changed("email").await.unwrap();
    assert!(form.is_dirty("email"));
    assert!(form.is_touched("email"));
    // No submit yet, so no live validation.
    assert!(!form.has_error("email"));

    form.submit().await.unwrap();
    assert!(form.has_error("email"));

    field.set_text("kari@example.com");
    form.field_changed("email").await.unwrap();
    assert!(!form.has_error("email"));
}

#[tokio::test]
async fn test_unknown_rule_is_a_programmer_error() {
    let form = FormController::default();
    let field = ValueField::new("f").with_rules(RuleSet::new().rule("no_such_rule", true));
    form.register(handle(&field), None).unwrap();

    assert!(matches!(
        form.submit().await,
        Err(FormError::UnknownRule { .. })
    ));
}

#[tokio::test]
async fn test_plugin_rule_extends_the_library() {
    let form = FormController::default();
    form.rules().register_sync("shouty", |value, _, _, _| {
        let text = value.as_str().unwrap_or_default();
        Verdict::check(text == text.to_uppercase(), Some("Use capitals"))
    });

    let field = ValueField::new("f")
        .with_rules(RuleSet::new().rule("shouty", true))
        .with_value(json!("quiet"));
    form.register(handle(&field), None).unwrap();

    assert!(!form.submit().await.unwrap().is_valid());
    assert_eq!(form.error_or("f", "invalid"), "Use capitals");
}

#[tokio::test]
async fn test_whole_field_custom_rule() {
    let form = FormController::default();
    let field = ValueField::new("token").with_rules(RuleSet::custom(CustomRule::new(
        |value, _, _| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Verdict::check(value == json!("open-sesame"), Some("Wrong token"))
        },
    )));
    form.register(handle(&field), None).unwrap();

    assert!(!form.submit().await.unwrap().is_valid());
    assert_eq!(form.error_or("token", "invalid"), "Wrong token");

    field.set_text("open-sesame");
    assert!(form.submit().await.unwrap().is_valid());
}

#[tokio::test]
async fn test_bad_field_always_fails_generically() {
    let form = FormController::default();
    let field = ValueField::new("f")
        .with_rules(RuleSet::new().rule("min_length", 2))
        .with_value(json!("long enough"));
    form.register(handle(&field), None).unwrap();

    form.set_bad("f", true, false);
    assert!(!form.submit().await.unwrap().is_valid());
    assert_eq!(form.error_or("f", "Field is invalid"), "Field is invalid");

    form.set_bad("f", false, false);
    assert!(form.submit().await.unwrap().is_valid());
}

#[tokio::test]
async fn test_message_fallback_chain() {
    // Form-level map is the last fallback.
    let form =
        FormController::new(FormOptions::new().error_message("required", "Form says required"));

    let plain = ValueField::new("plain").with_required(true);
    let overridden = ValueField::new("overridden")
        .with_required(true)
        .with_message("Field says required");
    let constrained = ValueField::new("constrained").with_rules(
        RuleSet::new().rule("required", Constraint::new(true).with_message("Rule says required")),
    );
    form.register(handle(&plain), None).unwrap();
    form.register(handle(&overridden), None).unwrap();
    form.register(handle(&constrained), None).unwrap();

    form.submit().await.unwrap();
    assert_eq!(form.error_or("plain", "?"), "Form says required");
    assert_eq!(form.error_or("overridden", "?"), "Field says required");
    assert_eq!(form.error_or("constrained", "?"), "Rule says required");
}

#[tokio::test]
async fn test_unregister_keeps_state_by_default() {
    let form = FormController::default();
    let field = ValueField::new("f").with_required(true);
    form.register(handle(&field), None).unwrap();
    form.submit().await.unwrap();
    assert!(form.has_error("f"));

    form.unregister(&field);
    form.unregister(&field);
    assert!(form.registered_name(&field).is_none());
    // Stale state survives unless opted out.
    assert!(form.has_error("f"));
}

#[tokio::test]
async fn test_unregister_clears_state_when_opted_in() {
    let form = FormController::new(FormOptions::new().clear_state_on_unregister(true));
    let field = ValueField::new("f").with_required(true);
    form.register(handle(&field), None).unwrap();
    form.submit().await.unwrap();
    assert!(form.has_error("f"));

    form.unregister(&field);
    assert!(!form.has_error("f"));
    assert!(!form.is_touched("f"));
}

#[tokio::test]
async fn test_rename_rebinds_registration() {
    let form = FormController::default();
    let field = ValueField::new("before");
    form.register(handle(&field), None).unwrap();

    field.set_name("after");
    form.register(handle(&field), None).unwrap();

    assert_eq!(form.registered_name(&field), Some("after".to_string()));
    assert!(form.value("before").is_none());
    assert!(form.value("after").is_some());
}

#[tokio::test]
async fn test_default_value_resolves_dotted_names() {
    let form = FormController::new(
        FormOptions::new().model(json!({ "address": { "city": "Oslo" }, "name": "Kari" })),
    );
    assert_eq!(form.default_value("address.city"), Some(json!("Oslo")));
    assert_eq!(form.default_value("name"), Some(json!("Kari")));
    assert_eq!(form.default_value("missing"), None);
}

#[tokio::test]
async fn test_matches_rule_compares_peer_fields() {
    let form = FormController::default();
    let password = ValueField::new("password").with_value(json!("hunter2"));
    let confirm = ValueField::new("confirm")
        .with_rules(RuleSet::new().rule("matches", "password"))
        .with_message("Passwords do not match")
        .with_value(json!("hunter3"));
    form.register(handle(&password), None).unwrap();
    form.register(handle(&confirm), None).unwrap();

    assert!(!form.submit().await.unwrap().is_valid());
    assert_eq!(form.error_or("confirm", "?"), "Passwords do not match");

    confirm.set_text("hunter2");
    assert!(form.submit().await.unwrap().is_valid());
}

#[tokio::test]
async fn test_validate_all_against_external_context() {
    let form = FormController::default();
    let field = ValueField::new("age").with_rules(RuleSet::new().rule("min", 18));
    form.register(handle(&field), None).unwrap();

    let report = form
        .validate_all(&json!({ "age": 15 }), false)
        .await
        .unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.errors, vec!["age".to_string()]);

    let report = form.validate_all(&json!({ "age": 21 }), false).await.unwrap();
    assert!(report.is_valid);
}

#[tokio::test]
async fn test_field_without_rules_validates_trivially() {
    let form = FormController::default();
    let field = ValueField::new("plain");
    form.register(handle(&field), None).unwrap();

    assert!(form.validate_one("plain", &json!({}), true).await.unwrap());
    assert!(!form.has_error("plain"));
}

#[tokio::test]
async fn test_declaration_order_beats_completion_order() {
    let form = FormController::default();
    // The first-declared rule is the slowest; its message must still win.
    let field = ValueField::new("f")
        .with_rules(
            RuleSet::new()
                .rule(
                    "slow",
                    CustomRule::new(|_, _, _| async {
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Verdict::fail_with("slow")
                    }),
                )
                .rule(
                    "fast",
                    CustomRule::new(|_, _, _| async { Verdict::fail_with("fast") }),
                ),
        )
        .with_value(json!("x"));
    form.register(handle(&field), None).unwrap();

    form.submit().await.unwrap();
    assert_eq!(form.error_or("f", "?"), "slow");
}

#[tokio::test]
async fn test_missing_field_validates_trivially() {
    let form = FormController::default();
    assert!(form.validate_one("ghost", &Value::Null, true).await.unwrap());
    assert!(!form.has_error("ghost"));
}
