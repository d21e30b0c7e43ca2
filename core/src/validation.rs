//! Field validation shared by tickets and comments.

use crate::error::{Result, TicketError};

/// Maximum length of a ticket title.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum length of an actor identifier.
pub const MAX_ACTOR_LEN: usize = 255;

/// Validate email address format.
///
/// This performs basic RFC 5322 validation:
/// - Must contain exactly one `@`
/// - Must have non-empty local and domain parts
/// - Length must be between 3 and 255 characters
///
/// # Examples
///
/// ```
/// use ticketdesk_core::validation::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    let valid_local_chars =
        |c: char| c.is_alphanumeric() || c == '.' || c == '-' || c == '+' || c == '_';
    let valid_domain_chars = |c: char| c.is_alphanumeric() || c == '.' || c == '-';

    if !local.chars().all(valid_local_chars) || !domain.chars().all(valid_domain_chars) {
        return false;
    }

    // Domain labels between dots must be non-empty
    domain.split('.').all(|label| !label.is_empty())
}

/// Reject empty or whitespace-only values.
///
/// # Errors
///
/// Returns [`TicketError::Validation`] naming `field`.
pub fn validate_required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TicketError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Title must be present and at most [`MAX_TITLE_LEN`] characters.
///
/// # Errors
///
/// Returns [`TicketError::Validation`] if the title is blank or too long.
pub fn validate_title(title: &str) -> Result<()> {
    validate_required("title", title)?;
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(TicketError::Validation(format!(
            "title too long: {len} characters (max {MAX_TITLE_LEN})"
        )));
    }
    Ok(())
}

/// Reporter email must be well formed.
///
/// # Errors
///
/// Returns [`TicketError::Validation`] for a malformed address.
pub fn validate_email(email: &str) -> Result<()> {
    if !is_valid_email(email) {
        return Err(TicketError::Validation(format!(
            "invalid email address `{email}`"
        )));
    }
    Ok(())
}

/// Actor identifiers (`created_by`, `updated_by`) must be present and bounded.
///
/// # Errors
///
/// Returns [`TicketError::Validation`] naming `field`.
pub fn validate_actor(field: &str, actor: &str) -> Result<()> {
    validate_required(field, actor)?;
    if actor.len() > MAX_ACTOR_LEN {
        return Err(TicketError::Validation(format!(
            "{field} too long (max {MAX_ACTOR_LEN})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rejects_two_at_signs() {
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[test]
    fn test_email_rejects_empty_domain_label() {
        assert!(!is_valid_email("user@example..com"));
        assert!(!is_valid_email("user@localhost"));
    }

    #[test]
    fn test_title_bounds() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn test_required_names_field() {
        let err = validate_required("body", "").unwrap_err();
        assert_eq!(err, TicketError::Validation("body is required".to_string()));
    }
}
