//! Validation outcome type.

/// Outcome of evaluating one rule, or one field's whole rule set.
///
/// A failing rule may or may not carry a user-facing message. When a field's
/// results are reduced, the first failing rule in declaration order wins and
/// its message (after the fallback chain) becomes the field's error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Verdict {
    /// The value satisfied the rule.
    #[default]
    Pass,
    /// The value failed the rule, with an optional user-facing message.
    Fail(Option<String>),
}

impl Verdict {
    /// A failure without a message (the consumer supplies a generic one at
    /// display time).
    pub fn fail() -> Self {
        Self::Fail(None)
    }

    /// A failure carrying a user-facing message.
    pub fn fail_with(message: impl Into<String>) -> Self {
        Self::Fail(Some(message.into()))
    }

    /// Check whether the value passed.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Get the failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Fail(message) => message.as_deref(),
        }
    }

    /// Pass when the condition holds, otherwise fail with the constraint's
    /// message (if one is configured).
    pub fn check(condition: bool, message: Option<&str>) -> Self {
        if condition {
            Self::Pass
        } else {
            Self::Fail(message.map(str::to_string))
        }
    }
}

impl From<bool> for Verdict {
    fn from(valid: bool) -> Self {
        if valid { Self::Pass } else { Self::Fail(None) }
    }
}
