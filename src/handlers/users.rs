use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError, models::User};

/// me
///
/// [Authenticated Route] The current user, looked up by the token's subject.
/// 404 if the account was deleted after the token was issued.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses((status = 200, description = "Current user", body = User))
)]
pub async fn me(auth: AuthUser, State(state): State<AppState>) -> Result<Json<User>, ApiError> {
    let user = state
        .repo
        .get_user(auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(user))
}

/// get_by_id
///
/// [Authenticated Route] Fetches any user by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(user))
}

/// delete_by_id
///
/// [Authenticated Route] Hard-deletes an account. Role-gated: requires the
/// "admin" role regardless of any resource membership.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if auth.role != "admin" {
        return Err(ApiError::forbidden("insufficient role"));
    }

    if state.repo.delete_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("User"))
    }
}
