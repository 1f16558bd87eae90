use serde::Deserialize;

use super::{check_length, ValidationErrors};
use crate::models::{LoginPayload, SignupPayload};

const EMAIL_MAX: usize = 255;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 128;

/// Raw sign-in form input.
#[derive(Deserialize, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    /// Normalizes the email (trimmed, lowercased) and checks both fields.
    pub fn validate(&self) -> Result<LoginPayload, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let email = validate_email(&mut errors, &self.email);
        validate_password(&mut errors, "password", &self.password);
        errors.into_result(LoginPayload {
            email,
            password: self.password.clone(),
        })
    }
}

/// Raw sign-up form input.
#[derive(Deserialize, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<SignupPayload, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim().to_string();
        check_length(
            &mut errors,
            "name",
            &name,
            Some((2, "Name must be at least 2 characters")),
            Some((100, "Name must be less than 100 characters")),
        );
        let email = validate_email(&mut errors, &self.email);
        validate_password(&mut errors, "password", &self.password);
        if self.password != self.confirm_password {
            errors.push("confirm_password", "Passwords do not match");
        }

        errors.into_result(SignupPayload {
            name,
            email,
            password: self.password.clone(),
        })
    }
}

fn validate_email(errors: &mut ValidationErrors, raw: &str) -> String {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        errors.push("email", "Invalid email address");
    }
    check_length(errors, "email", &email, None, Some((EMAIL_MAX, "Email is too long")));
    email
}

fn validate_password(errors: &mut ValidationErrors, field: &str, password: &str) {
    check_length(
        errors,
        field,
        password,
        Some((PASSWORD_MIN, "Password must be at least 8 characters")),
        Some((PASSWORD_MAX, "Password must be less than 128 characters")),
    );

    let rules: [(fn(&char) -> bool, &str); 4] = [
        (char::is_ascii_uppercase, "Password must contain at least one uppercase letter"),
        (char::is_ascii_lowercase, "Password must contain at least one lowercase letter"),
        (char::is_ascii_digit, "Password must contain at least one number"),
        (|c| !c.is_ascii_alphanumeric(), "Password must contain at least one special character"),
    ];
    for (rule, message) in rules {
        if !password.chars().any(|c| rule(&c)) {
            errors.push(field, message);
        }
    }
}

/// `local@domain.tld`, no whitespace, no empty domain labels.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
        && labels
            .last()
            .is_some_and(|tld| tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic))
}
