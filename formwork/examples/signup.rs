//! Signup Form Example
//!
//! A headless demo driving the form engine directly:
//! - Declarative rules (required, email, min_length, matches)
//! - A custom async rule checking username availability
//! - Submit callbacks and the throttled update broadcast

use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use formwork::prelude::*;
use log::{LevelFilter, info};
use serde_json::json;
use simplelog::{Config, WriteLogger};

#[tokio::main]
async fn main() -> Result<(), FormError> {
    let _ = WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create("signup.log").unwrap(),
    );

    let form = FormController::new(
        FormOptions::new()
            .error_message("required", "This field is required")
            .throttle_window(Duration::from_millis(100))
            .on_valid_submit(|values| info!("submitting {values}"))
            .on_invalid_submit(|errors, _| info!("invalid fields: {errors:?}")),
    );

    let username = ValueField::new("username")
        .with_required(true)
        .with_rules(RuleSet::new().rule("min_length", 3).rule(
            "available",
            CustomRule::new(|value, _, _| async move {
                // Stand-in for an availability lookup.
                tokio::time::sleep(Duration::from_millis(20)).await;
                Verdict::check(value != json!("admin"), Some("Username is taken"))
            }),
        ));
    let email = ValueField::new("email")
        .with_kind(FieldKind::Email)
        .with_required(true);
    let password = ValueField::new("password")
        .with_required(true)
        .with_rules(RuleSet::new().rule("min_length", 8));
    let confirm = ValueField::new("confirm")
        .with_rules(RuleSet::new().rule("matches", "password"))
        .with_message("Passwords do not match");

    let updater: Updater = Arc::new(|| info!("fields woken by broadcast"));
    for field in [&username, &email, &password, &confirm] {
        form.register(Arc::new(field.clone()), Some(Arc::clone(&updater)))?;
    }

    // First attempt: everything empty.
    let outcome = form.submit().await?;
    info!("first submit valid: {}", outcome.is_valid());
    for name in ["username", "email", "password", "confirm"] {
        if form.has_error(name) {
            info!("  {name}: {}", form.error_or(name, "Field is invalid"));
        }
    }

    // Fill the form in; changes after a submit revalidate live.
    username.set_text("kari");
    form.field_changed("username").await?;
    email.set_text("kari@example.com");
    form.field_changed("email").await?;
    password.set_text("hunter2hunter2");
    form.field_changed("password").await?;
    confirm.set_text("hunter2hunter2");
    form.field_changed("confirm").await?;

    let outcome = form.submit().await?;
    info!("second submit valid: {}", outcome.is_valid());
    if let SubmitOutcome::Valid { values } = outcome {
        println!("signed up: {values}");
    }

    // Let the trailing-edge broadcast flush before exit.
    tokio::time::sleep(Duration::from_millis(150)).await;
    Ok(())
}
