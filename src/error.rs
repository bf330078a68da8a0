use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

/// ApiError
///
/// The single error taxonomy every handler and middleware resolves to. Each
/// variant maps to one HTTP status and is rendered as the uniform envelope
/// `{code, message, details?}`. Storage failures are translated through the
/// `From<sqlx::Error>` impl below, so handlers can use `?` on repository calls.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401. Missing, malformed, invalid or expired credential.
    #[error("Unauthorized: {0}")]
    Unauthenticated(String),

    /// 403. Authenticated but lacking the required role or membership.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404. Referenced entity or route absent.
    #[error("{0}")]
    NotFound(String),

    /// 400. Structural validation failure or semantically invalid reference.
    #[error("{message}")]
    BadRequest {
        message: String,
        details: Option<Value>,
    },

    /// 409. Uniqueness violation or invariant-floor violation.
    #[error("{message}")]
    Conflict {
        message: String,
        details: Option<Value>,
    },

    /// 429. Client exceeded a rate-limit window.
    #[error("Too Many Requests")]
    TooManyRequests,

    /// 500. Anything unexpected. The detail is logged server-side only and
    /// never rendered to the client.
    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    /// `not_found("Event")` renders as "Event not found".
    pub fn not_found(entity: &str) -> Self {
        ApiError::NotFound(format!("{entity} not found"))
    }

    pub fn bad_request(message: impl Into<String>, details: Option<Value>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            ApiError::BadRequest { details, .. } | ApiError::Conflict { details, .. } => {
                details.clone()
            }
            _ => None,
        };

        let mut body = json!({
            "code": status.as_u16(),
            "message": self.to_string(),
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

/// Storage error translator.
///
/// Unique-index violations surface as a single database error with code 23505;
/// they become 409 with the violating fields named. Everything unrecognized is
/// logged with full detail and collapses to a generic 500.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::not_found("Resource"),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                let fields = db.constraint().map(constraint_fields).unwrap_or_default();
                ApiError::Conflict {
                    message: "Conflict: duplicate key".to_string(),
                    details: Some(json!({ "fields": fields })),
                }
            }
            other => {
                tracing::error!(error = ?other, "storage error");
                ApiError::Internal
            }
        }
    }
}

/// Maps a unique-index name to the logical fields it guards, for the 409
/// envelope's details.
pub fn constraint_fields(constraint: &str) -> Vec<&'static str> {
    match constraint {
        "users_email_key" => vec!["email"],
        "ticket_types_event_id_name_key" => vec!["event", "name"],
        "tickets_event_id_buyer_key" => vec!["event", "buyer"],
        _ => vec![],
    }
}
