//! Field rules that the `validator` derive cannot express directly.

use std::borrow::Cow;

use validator::ValidationError;

/// Role names accepted on registration.
pub const ROLES: [&str; 3] = ["Admin", "Moderator", "User"];

pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    if ROLES.contains(&role) {
        return Ok(());
    }

    Err(ValidationError::new("role").with_message(Cow::Borrowed(
        "Role must be one of the following: Admin, Moderator, User",
    )))
}

/// Rejects strings that are empty once trimmed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}
