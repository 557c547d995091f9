use std::{borrow::Cow, collections::BTreeMap};
use validator::{ValidationError, ValidationErrors};

/// FieldErrors
///
/// Form errors keyed by field name, ready to be rendered inline next to each input.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// password_strength
///
/// Sign-up password rule: at least one uppercase letter, one digit and one
/// character that is neither a letter nor a digit. Length is checked separately.
pub fn password_strength(password: &str) -> Result<(), ValidationError> {
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(error_with_message(
            "password_uppercase",
            "Password must contain at least one uppercase letter.",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(error_with_message(
            "password_digit",
            "Password must contain at least one number.",
        ));
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(error_with_message(
            "password_special",
            "Password must contain at least one special character.",
        ));
    }
    Ok(())
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with_message("blank", "This field cannot be empty."));
    }
    Ok(())
}

/// field_errors
///
/// Flattens `validator`'s error tree into `FieldErrors`. Messages fall back to the
/// error code when a rule carries no human-readable text.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
