//! Account field validation shared by registration and profile updates.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum password length for new and changed passwords.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum display-name length.
pub const MAX_DISPLAY_NAME_LEN: usize = 80;

/// Normalise an email address (trim + lowercase) and check its shape.
pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(CoreError::Validation("Email is required".into()));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation("Please provide a valid email".into()));
    }
    Ok(email)
}

/// Trim a display name; empty names are rejected.
pub fn validate_display_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Name is required".into()));
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Preferences are stored as an opaque JSON object.
pub fn validate_preferences(prefs: &serde_json::Value) -> Result<(), CoreError> {
    if !prefs.is_object() {
        return Err(CoreError::Validation(
            "preferences must be a JSON object".into(),
        ));
    }
    Ok(())
}
