use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;

use crate::error::ApiError;

/// A single per-field constraint failure, rendered into the 400 envelope's
/// `details` array.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// ValidateBody
///
/// Declarative constraint checks a request payload runs after deserialization.
/// Implementations collect every violation rather than stopping at the first,
/// so the client sees the full list. Structural typing (field presence, basic
/// types, enum values) is already guaranteed by serde at this point.
pub trait ValidateBody {
    fn validate(&self) -> Result<(), Vec<FieldViolation>>;
}

/// ValidatedJson
///
/// Two-stage body extractor: deserialize with serde (malformed or mistyped
/// JSON rejects with a 400 envelope), then run the payload's `ValidateBody`
/// checks. On success the handler receives the normalized, typed value and
/// never re-parses raw input. Unknown extra fields are ignored by serde.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + ValidateBody,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rej| {
            ApiError::bad_request(
                "Bad Request: validation failed",
                Some(json!([{ "field": "body", "message": rej.body_text() }])),
            )
        })?;

        value.validate().map_err(|violations| {
            ApiError::bad_request(
                "Bad Request: validation failed",
                serde_json::to_value(violations).ok(),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

// --- Constraint helpers shared by the payload impls ---

/// Non-empty after trimming.
pub fn check_required(field: &str, value: &str, out: &mut Vec<FieldViolation>) {
    if value.trim().is_empty() {
        out.push(FieldViolation::new(field, "is required"));
    }
}

pub fn check_min_len(field: &str, value: &str, min: usize, out: &mut Vec<FieldViolation>) {
    if value.chars().count() < min {
        out.push(FieldViolation::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
}

pub fn check_max_len(field: &str, value: &str, max: usize, out: &mut Vec<FieldViolation>) {
    if value.chars().count() > max {
        out.push(FieldViolation::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
}

/// Minimal email shape: one `@` with a non-empty local part and a dotted,
/// whitespace-free domain.
pub fn check_email(field: &str, value: &str, out: &mut Vec<FieldViolation>) {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        out.push(FieldViolation::new(field, "must be a valid email"));
    }
}

/// Minimal url shape: an http(s) scheme followed by a non-empty host.
pub fn check_url(field: &str, value: &str, out: &mut Vec<FieldViolation>) {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    let valid = matches!(rest, Some(host) if !host.is_empty());
    if !valid {
        out.push(FieldViolation::new(field, "must be a valid url"));
    }
}

pub fn check_min_items<T>(field: &str, items: &[T], min: usize, out: &mut Vec<FieldViolation>) {
    if items.len() < min {
        out.push(FieldViolation::new(
            field,
            format!("must contain at least {min} items"),
        ));
    }
}

pub fn check_non_negative(field: &str, value: f64, out: &mut Vec<FieldViolation>) {
    if value < 0.0 {
        out.push(FieldViolation::new(field, "must not be negative"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        let mut out = vec![];
        check_email("email", "alice@example.com", &mut out);
        assert!(out.is_empty());

        for bad in ["", "alice", "@example.com", "a@b", "a b@c.com", "a@.com"] {
            let mut out = vec![];
            check_email("email", bad, &mut out);
            assert_eq!(out.len(), 1, "{bad:?} should be rejected");
        }
    }

    #[test]
    fn url_shapes() {
        let mut out = vec![];
        check_url("url", "https://example.com/p.jpg", &mut out);
        check_url("url", "http://example.com", &mut out);
        assert!(out.is_empty());

        check_url("url", "ftp://example.com", &mut out);
        check_url("url", "https://", &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn length_bounds_count_chars() {
        let mut out = vec![];
        check_min_len("password", "1234567", 8, &mut out);
        assert_eq!(out.len(), 1);

        let mut out = vec![];
        check_max_len("text", &"x".repeat(2001), 2000, &mut out);
        assert_eq!(out.len(), 1);
    }
}
