use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{AppState, error::ApiError, models::HealthResponse};

pub mod albums;
pub mod auth;
pub mod events;
pub mod groups;
pub mod polls;
pub mod threads;
pub mod tickets;
pub mod users;

/// health
///
/// [Public Route] Liveness probe. Reports the configured environment name.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        env: state.config.env.as_str().to_string(),
    })
}

/// Fallback for any route the router does not know.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found".to_string())
}

/// Creator-first deduplicated id set, preserving submission order.
pub(crate) fn merge_unique(first: Uuid, rest: &[Uuid]) -> Vec<Uuid> {
    let mut out = vec![first];
    for id in rest {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

/// Idempotent append to a membership set.
pub(crate) fn push_unique(list: &mut Vec<Uuid>, id: Uuid) {
    if !list.contains(&id) {
        list.push(id);
    }
}
