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
    models::{CreateEventRequest, Event},
    validate::ValidatedJson,
};

/// create
///
/// [Authenticated Route] Creates an event. The creator is folded into both
/// the organiser and participant sets, so the organiser set starts non-empty.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventRequest,
    responses((status = 201, description = "Created", body = Event))
)]
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let now = Utc::now();
    let event = Event {
        id: Uuid::new_v4(),
        name: payload.name,
        description: payload.description,
        start_date: payload.start_date,
        end_date: payload.end_date,
        location: payload.location,
        cover_photo: payload.cover_photo,
        visibility: payload.visibility,
        organisers: merge_unique(auth.id, &payload.organisers),
        participants: merge_unique(auth.id, &payload.participants),
        group_id: payload.group_id,
        ticketing_enabled: payload.ticketing_enabled,
        shopping_list_enabled: payload.shopping_list_enabled,
        carpool_enabled: payload.carpool_enabled,
        created_at: now,
        updated_at: now,
    };

    state.repo.create_event(&event).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// get_by_id
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Found", body = Event),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .repo
        .get_event(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;
    Ok(Json(event))
}

/// join
///
/// [Authenticated Route] Adds the caller to the participant set. Joining
/// twice is a no-op, not an error.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/join",
    params(("id" = Uuid, Path, description = "Event id")),
    responses((status = 200, description = "Joined", body = Event))
)]
pub async fn join(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let mut event = state
        .repo
        .get_event(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;

    push_unique(&mut event.participants, auth.id);
    event.updated_at = Utc::now();
    state.repo.update_event_members(&event).await?;

    Ok(Json(event))
}

/// leave
///
/// [Authenticated Route] Removes the caller from both the participant and
/// organiser sets. Rejected with 409 when it would leave the event without
/// any organiser; in that case nothing is persisted.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/leave",
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Left", body = Event),
        (status = 409, description = "Last organiser cannot leave")
    )
)]
pub async fn leave(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let mut event = state
        .repo
        .get_event(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;

    event.participants.retain(|p| *p != auth.id);
    event.organisers.retain(|o| *o != auth.id);

    if event.organisers.is_empty() {
        return Err(ApiError::conflict("Event must have at least one organiser"));
    }

    event.updated_at = Utc::now();
    state.repo.update_event_members(&event).await?;

    Ok(Json(event))
}
