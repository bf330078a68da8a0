use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use super::{merge_unique, push_unique};
use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{CreateGroupRequest, Group},
    validate::ValidatedJson,
};

/// create
///
/// [Authenticated Route] Creates a group. The creator becomes the sole admin
/// and is folded into the member set, deduplicated against any submitted
/// member ids.
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = CreateGroupRequest,
    responses((status = 201, description = "Created", body = Group))
)]
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let now = Utc::now();
    let group = Group {
        id: Uuid::new_v4(),
        name: payload.name,
        description: payload.description,
        icon: payload.icon,
        cover_photo: payload.cover_photo,
        kind: payload.kind,
        allow_member_posts: payload.allow_member_posts,
        allow_member_create_events: payload.allow_member_create_events,
        admins: vec![auth.id],
        members: merge_unique(auth.id, &payload.members),
        created_at: now,
        updated_at: now,
    };

    state.repo.create_group(&group).await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// get_by_id
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 200, description = "Found", body = Group),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Group>, ApiError> {
    let group = state
        .repo
        .get_group(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group"))?;
    Ok(Json(group))
}

/// join
///
/// [Authenticated Route] Adds the caller to the member set. Joining twice is
/// a no-op, not an error.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/join",
    params(("id" = Uuid, Path, description = "Group id")),
    responses((status = 200, description = "Joined", body = Group))
)]
pub async fn join(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Group>, ApiError> {
    let mut group = state
        .repo
        .get_group(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group"))?;

    push_unique(&mut group.members, auth.id);
    group.updated_at = Utc::now();
    state.repo.update_group_members(&group).await?;

    Ok(Json(group))
}

/// leave
///
/// [Authenticated Route] Removes the caller from both the member and admin
/// sets. Rejected with 409 when it would leave the group without any admin;
/// in that case nothing is persisted.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/leave",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 200, description = "Left", body = Group),
        (status = 409, description = "Last admin cannot leave")
    )
)]
pub async fn leave(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Group>, ApiError> {
    let mut group = state
        .repo
        .get_group(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group"))?;

    group.members.retain(|m| *m != auth.id);
    group.admins.retain(|a| *a != auth.id);

    if group.admins.is_empty() {
        return Err(ApiError::conflict("Group must have at least one admin"));
    }

    group.updated_at = Utc::now();
    state.repo.update_group_members(&group).await?;

    Ok(Json(group))
}
