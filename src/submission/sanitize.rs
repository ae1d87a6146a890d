//! Submission sanitization.
//!
//! Produces the only form of a submission that is ever sent upstream.
//! Stripping `<` and `>` is a minimal guard against naive markup injection in
//! the spreadsheet; whatever renders the data must still encode its output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Length cap applied to every sanitized field.
pub const MAX_FIELD_CHARS: usize = 2000;

/// A cleaned submission, ready to cross the trust boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub budget: String,
    pub deadline: String,
    pub message: String,
}

/// Sanitize a submission body. Total: missing or non-string fields become "".
///
/// Callers are expected to run [`validate`](super::validate) first.
pub fn sanitize(payload: &Value) -> SanitizedPayload {
    let field = |key: &str| payload.get(key).and_then(Value::as_str).unwrap_or_default();

    SanitizedPayload {
        name: sanitize_field(field("name")),
        email: sanitize_email(field("email")),
        phone: sanitize_field(field("phone")),
        kind: sanitize_field(field("type")),
        budget: sanitize_field(field("budget")),
        deadline: sanitize_field(field("deadline")),
        message: sanitize_field(field("message")),
    }
}

/// Strip angle brackets, trim, and cap the length.
///
/// Brackets go first and the cut is re-trimmed so that a second pass is a
/// no-op.
pub fn sanitize_field(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    cap(stripped.trim())
}

fn sanitize_email(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    cap(stripped.to_lowercase().trim())
}

fn cap(s: &str) -> String {
    match s.char_indices().nth(MAX_FIELD_CHARS) {
        Some((cut, _)) => s[..cut].trim_end().to_string(),
        None => s.to_string(),
    }
}

impl SanitizedPayload {
    /// Run the sanitizer over an already sanitized payload.
    pub fn resanitize(&self) -> Self {
        Self {
            name: sanitize_field(&self.name),
            email: sanitize_email(&self.email),
            phone: sanitize_field(&self.phone),
            kind: sanitize_field(&self.kind),
            budget: sanitize_field(&self.budget),
            deadline: sanitize_field(&self.deadline),
            message: sanitize_field(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_fields() {
        let clean = sanitize(&json!({
            "name": "  <b>Ana</b> ",
            "email": " Ana@Example.COM ",
            "phone": "0555 12 34 56",
            "type": "landing",
            "budget": "500",
            "deadline": "2025-01-01",
            "message": "<script>alert(1)</script> hello"
        }));

        assert_eq!(clean.name, "bAna/b");
        assert_eq!(clean.email, "ana@example.com");
        assert_eq!(clean.phone, "0555 12 34 56");
        assert_eq!(clean.kind, "landing");
        assert_eq!(clean.message, "scriptalert(1)/script hello");
    }

    #[test]
    fn test_non_string_becomes_empty() {
        let clean = sanitize(&json!({ "name": 12, "budget": null }));
        assert_eq!(clean.name, "");
        assert_eq!(clean.budget, "");
        assert_eq!(clean.deadline, "");

        let clean = sanitize(&Value::Null);
        assert_eq!(clean.message, "");
    }

    #[test]
    fn test_length_cap_counts_chars() {
        let long = "é".repeat(2500);
        let capped = sanitize_field(&long);
        assert_eq!(capped.chars().count(), MAX_FIELD_CHARS);
    }

    #[test]
    fn test_idempotent() {
        let tricky = [
            "plain",
            "  padded  ",
            "trailing <",
            "> leading",
            " < > ",
            "MiXeD@CaSe.Com",
            "",
        ];
        for raw in tricky {
            let once = sanitize_field(raw);
            assert_eq!(sanitize_field(&once), once, "{raw:?}");
            let once = sanitize_email(raw);
            assert_eq!(sanitize_email(&once), once, "{raw:?}");
        }

        let cut_on_space = format!("{} tail", "x".repeat(MAX_FIELD_CHARS - 1));
        let once = sanitize_field(&cut_on_space);
        assert_eq!(sanitize_field(&once), once);

        let payload = sanitize(&json!({
            "name": " a < ", "email": " B@C.D >", "phone": "1", "type": "t",
            "budget": "b", "deadline": "d", "message": "m >"
        }));
        assert_eq!(payload.resanitize(), payload);
    }

    #[test]
    fn test_serializes_with_type_key() {
        let clean = sanitize(&json!({ "type": "vitrine" }));
        let value = serde_json::to_value(&clean).unwrap();
        assert_eq!(value["type"], "vitrine");
        assert!(value.get("kind").is_none());
    }
}
