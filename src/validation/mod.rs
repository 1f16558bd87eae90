//! Form validation run before anything is sent to the backend.
//!
//! Every failing rule is reported against the field it concerns, so a form
//! can show all problems at once.

pub mod auth;
pub mod card;

use std::fmt;

use serde::Serialize;

pub use auth::{SignInForm, SignupForm};
pub use card::{
    suggest_slug, BasicInfo, CardDraft, CardForm, Customization, DraftLink, LinkInput, LinkInputId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the field, e.g. `links.0.value`.
    pub field: String,
    pub message: String,
}

/// All issues found while validating one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn first(&self) -> Option<&FieldError> {
        self.errors.first()
    }

    /// Messages reported for `field`, in the order the rules ran.
    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(value)` when nothing was reported, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Length checks count characters, not bytes.
pub(crate) fn check_length(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    min: Option<(usize, &str)>,
    max: Option<(usize, &str)>,
) {
    let len = value.chars().count();
    if let Some((min, message)) = min {
        if len < min {
            errors.push(field, message);
        }
    }
    if let Some((max, message)) = max {
        if len > max {
            errors.push(field, message);
        }
    }
}

/// Trim, then treat the empty string as absent.
pub(crate) fn trimmed_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
