//! Field rules for every input shape.
//!
//! Checks never stop at the first failure: a [`ValidationErrors`] lists every
//! violated rule with the field name and the offending value, so a client can
//! fix the whole request in one round trip. Rules for update bodies only run
//! on supplied fields.

use std::{fmt, sync::LazyLock};

use api_types::{
    Patch,
    event::{EventNew, EventUpdate},
    expense::{ExpenseNew, ExpenseUpdate},
    user::{UserNew, UserUpdate},
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::{EngineError, ResultEngine};

pub(crate) const EVENT_TEXT_MIN: usize = 3;
pub(crate) const EVENT_TEXT_MAX: usize = 100;
pub(crate) const USERNAME_MIN: usize = 3;
pub(crate) const USERNAME_MAX: usize = 50;
/// Shortest password accepted on create and update.
pub const PASSWORD_MIN: usize = 8;
pub(crate) const CATEGORY_NAME_MAX: usize = 100;

const REDACTED: &str = "<redacted>";

#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// The rule a field broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    MinLength(usize),
    MaxLength(usize),
    NotBlank,
    Email,
    Finite,
    NotBeforeStart,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinLength(min) => write!(f, "must be at least {min} characters"),
            Self::MaxLength(max) => write!(f, "must be at most {max} characters"),
            Self::NotBlank => write!(f, "must not be blank"),
            Self::Email => write!(f, "must be a valid email address"),
            Self::Finite => write!(f, "must be a finite number"),
            Self::NotBeforeStart => write!(f, "must not be earlier than start_date"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub rule: Rule,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `field` broke `rule`.
    pub fn contains(&self, field: &str, rule: Rule) -> bool {
        self.0.iter().any(|v| v.field == field && v.rule == rule)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} {}", violation.field, violation.rule)?;
        }
        Ok(())
    }
}

/// Accumulates violations for one input.
#[derive(Default)]
struct Checks(Vec<Violation>);

impl Checks {
    fn push(&mut self, field: &'static str, rule: Rule, value: impl Into<String>) {
        self.0.push(Violation {
            field,
            rule,
            value: value.into(),
        });
    }

    fn length(&mut self, field: &'static str, value: &str, min: usize, max: Option<usize>) {
        let len = value.chars().count();
        if len < min {
            self.push(field, Rule::MinLength(min), value);
        }
        if let Some(max) = max
            && len > max
        {
            self.push(field, Rule::MaxLength(max), value);
        }
    }

    fn password(&mut self, value: &str) {
        if value.chars().count() < PASSWORD_MIN {
            self.push("password", Rule::MinLength(PASSWORD_MIN), REDACTED);
        }
    }

    fn not_blank(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, Rule::NotBlank, value);
        }
    }

    fn email(&mut self, value: &str) {
        if !EMAIL.is_match(value) {
            self.push("email", Rule::Email, value);
        }
    }

    fn finite(&mut self, field: &'static str, value: f64) {
        if !value.is_finite() {
            self.push(field, Rule::Finite, value.to_string());
        }
    }

    fn date_order(&mut self, start: &DateTime<Utc>, end: &DateTime<Utc>) {
        if end < start {
            self.push("end_date", Rule::NotBeforeStart, end.to_rfc3339());
        }
    }

    fn finish(self) -> ResultEngine<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(ValidationErrors(self.0)))
        }
    }
}

/// Trim a category name and check it.
pub(crate) fn category_name(name: &str) -> ResultEngine<String> {
    let mut checks = Checks::default();
    let trimmed = name.trim();
    checks.not_blank("name", trimmed);
    if trimmed.chars().count() > CATEGORY_NAME_MAX {
        checks.push("name", Rule::MaxLength(CATEGORY_NAME_MAX), trimmed);
    }
    checks.finish()?;
    Ok(trimmed.to_string())
}

pub(crate) fn expense_new(input: &ExpenseNew) -> ResultEngine<()> {
    let mut checks = Checks::default();
    checks.not_blank("title", &input.title);
    checks.finite("amount", input.amount);
    checks.finish()
}

pub(crate) fn expense_update(changes: &ExpenseUpdate) -> ResultEngine<()> {
    let mut checks = Checks::default();
    if let Patch::Present(title) = &changes.title {
        checks.not_blank("title", title);
    }
    if let Patch::Present(amount) = changes.amount {
        checks.finite("amount", amount);
    }
    checks.finish()
}

pub(crate) fn user_new(input: &UserNew) -> ResultEngine<()> {
    let mut checks = Checks::default();
    checks.email(&input.email);
    checks.length("username", &input.username, USERNAME_MIN, Some(USERNAME_MAX));
    checks.password(&input.password);
    checks.finish()
}

pub(crate) fn user_update(changes: &UserUpdate) -> ResultEngine<()> {
    let mut checks = Checks::default();
    if let Patch::Present(email) = &changes.email {
        checks.email(email);
    }
    if let Patch::Present(username) = &changes.username {
        checks.length("username", username, USERNAME_MIN, Some(USERNAME_MAX));
    }
    if let Patch::Present(password) = &changes.password {
        checks.password(password);
    }
    checks.finish()
}

pub(crate) fn event_new(input: &EventNew) -> ResultEngine<()> {
    let mut checks = Checks::default();
    checks.length("title", &input.title, EVENT_TEXT_MIN, Some(EVENT_TEXT_MAX));
    checks.length(
        "location",
        &input.location,
        EVENT_TEXT_MIN,
        Some(EVENT_TEXT_MAX),
    );
    checks.date_order(&input.start_date, &input.end_date);
    checks.finish()
}

/// Checks an event update against the stored dates.
///
/// The date order rule runs on the effective pair (supplied value, or the
/// stored one when absent) whenever either date is supplied.
pub(crate) fn event_update(
    changes: &EventUpdate,
    stored_start: &DateTime<Utc>,
    stored_end: &DateTime<Utc>,
) -> ResultEngine<()> {
    let mut checks = Checks::default();
    if let Patch::Present(title) = &changes.title {
        checks.length("title", title, EVENT_TEXT_MIN, Some(EVENT_TEXT_MAX));
    }
    if let Patch::Present(location) = &changes.location {
        checks.length("location", location, EVENT_TEXT_MIN, Some(EVENT_TEXT_MAX));
    }
    if changes.start_date.is_present() || changes.end_date.is_present() {
        checks.date_order(
            changes.start_date.or(stored_start),
            changes.end_date.or(stored_end),
        );
    }
    checks.finish()
}
