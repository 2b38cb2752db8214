//! Input checks for the login and registration forms.
//!
//! These run before any request is made; the identity service still has the
//! final word on what it accepts.

#[cfg(test)]
#[path = "forms_test.rs"]
mod forms_test;

use crate::net::types::{RegistrationInput, UserKind};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Trim the email and require both fields.
///
/// # Errors
///
/// Returns a user-facing message when either field is blank.
pub fn validate_login(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Enter both email and password.");
    }
    Ok((email.to_owned(), password.to_owned()))
}

/// Check a registration form and return it with text fields trimmed.
///
/// Passwords are compared and measured untrimmed.
///
/// # Errors
///
/// Returns a user-facing message for the first failing check.
pub fn validate_registration(input: &RegistrationInput, confirm_password: &str) -> Result<RegistrationInput, &'static str> {
    let name = trimmed(input.name.as_deref());
    if name.is_none() {
        return Err("Enter your full name.");
    }

    let email = input.email.trim();
    if email.is_empty() {
        return Err("Enter your email.");
    }

    let company_name = trimmed(input.company_name.as_deref());
    if input.user_type == UserKind::Employer && company_name.is_none() {
        return Err("Enter your company name.");
    }

    if input.password != confirm_password {
        return Err("Passwords do not match");
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters long");
    }

    Ok(RegistrationInput {
        user_type: input.user_type,
        name,
        email: email.to_owned(),
        password: input.password.clone(),
        phone: trimmed(input.phone.as_deref()),
        company_name,
        company_description: input.company_description.clone(),
    })
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
