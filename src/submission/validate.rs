//! Submission validation.
//!
//! # Responsibilities
//! - Check the shape of an untrusted JSON body
//! - Check each field against its length and format constraints
//! - Surface one user-facing message for the first failing rule
//!
//! # Design Decisions
//! - Rules run in a fixed order; the order only decides which message wins
//! - All-or-nothing: no partially valid submission exists
//! - Email and phone patterns are sanity checks, not deliverability checks

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// Maximum name length, counted after trimming.
pub const MAX_NAME_CHARS: usize = 100;
/// Maximum email length.
pub const MAX_EMAIL_CHARS: usize = 255;
/// Maximum phone length.
pub const MAX_PHONE_CHARS: usize = 20;
/// Maximum message length.
pub const MAX_MESSAGE_CHARS: usize = 2000;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\s()-]+$").expect("valid phone pattern"));

/// Why a submission was rejected. Display text is shown to the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The body is not a JSON object.
    #[error("Données invalides")]
    NotAnObject,

    #[error("Nom invalide")]
    Name,

    #[error("Email invalide")]
    Email,

    #[error("Téléphone invalide")]
    Phone,

    /// One of `type`, `budget`, `deadline` or `message` is absent or empty.
    #[error("Tous les champs sont requis")]
    MissingField(&'static str),

    #[error("Message trop long")]
    MessageTooLong,
}

/// Validate a submission body.
pub fn validate(payload: &Value) -> Result<(), ValidationError> {
    let fields = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    match text(fields, "name") {
        Some(name) if !name.trim().is_empty() && name.trim().chars().count() <= MAX_NAME_CHARS => {}
        _ => return Err(ValidationError::Name),
    }

    match text(fields, "email") {
        Some(email) if EMAIL_PATTERN.is_match(email) && email.chars().count() <= MAX_EMAIL_CHARS => {}
        _ => return Err(ValidationError::Email),
    }

    match text(fields, "phone") {
        Some(phone) if PHONE_PATTERN.is_match(phone) && phone.chars().count() <= MAX_PHONE_CHARS => {}
        _ => return Err(ValidationError::Phone),
    }

    for field in ["type", "budget", "deadline", "message"] {
        if text(fields, field).map_or(true, str::is_empty) {
            return Err(ValidationError::MissingField(field));
        }
    }

    if text(fields, "message").map_or(0, |m| m.chars().count()) > MAX_MESSAGE_CHARS {
        return Err(ValidationError::MessageTooLong);
    }

    Ok(())
}

/// A string field; any other JSON type counts as absent.
fn text<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}
