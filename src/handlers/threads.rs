use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{CreateThreadRequest, Message, PostMessageRequest, Reply, Thread},
    validate::ValidatedJson,
};

/// create
///
/// [Authenticated Route] Opens a discussion thread under exactly one parent,
/// a group or an event. The body validator rejects both-or-neither before the
/// handler runs.
#[utoipa::path(
    post,
    path = "/api/v1/threads",
    request_body = CreateThreadRequest,
    responses((status = 201, description = "Created", body = Thread))
)]
pub async fn create(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateThreadRequest>,
) -> Result<(StatusCode, Json<Thread>), ApiError> {
    let now = Utc::now();
    let thread = Thread {
        id: Uuid::new_v4(),
        group_id: payload.group_id,
        event_id: payload.event_id,
        messages: vec![],
        created_at: now,
        updated_at: now,
    };

    state.repo.create_thread(&thread).await?;

    Ok((StatusCode::CREATED, Json(thread)))
}

/// get_by_id
#[utoipa::path(
    get,
    path = "/api/v1/threads/{id}",
    params(("id" = Uuid, Path, description = "Thread id")),
    responses(
        (status = 200, description = "Found", body = Thread),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Thread>, ApiError> {
    let thread = state
        .repo
        .get_thread(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Thread"))?;
    Ok(Json(thread))
}

/// add_message
///
/// [Authenticated Route] Appends a top-level message authored by the caller
/// and answers with the whole updated thread.
#[utoipa::path(
    post,
    path = "/api/v1/threads/{id}/messages",
    params(("id" = Uuid, Path, description = "Thread id")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message posted", body = Thread),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn add_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PostMessageRequest>,
) -> Result<(StatusCode, Json<Thread>), ApiError> {
    let mut thread = state
        .repo
        .get_thread(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Thread"))?;

    thread.messages.push(Message {
        id: Uuid::new_v4(),
        author: auth.id,
        text: payload.text,
        replies: vec![],
        created_at: Utc::now(),
    });
    thread.updated_at = Utc::now();
    state.repo.update_thread_messages(&thread).await?;

    Ok((StatusCode::CREATED, Json(thread)))
}

/// reply
///
/// [Authenticated Route] Appends a reply under one existing message. Replies
/// are flat; there is no nesting below this level.
#[utoipa::path(
    post,
    path = "/api/v1/threads/{id}/messages/{message_id}/replies",
    params(
        ("id" = Uuid, Path, description = "Thread id"),
        ("message_id" = Uuid, Path, description = "Message id")
    ),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Reply posted", body = Thread),
        (status = 404, description = "Thread or message not found")
    )
)]
pub async fn reply(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, message_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(payload): ValidatedJson<PostMessageRequest>,
) -> Result<(StatusCode, Json<Thread>), ApiError> {
    let mut thread = state
        .repo
        .get_thread(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Thread"))?;

    let message = thread
        .messages
        .iter_mut()
        .find(|m| m.id == message_id)
        .ok_or_else(|| ApiError::not_found("Message"))?;

    message.replies.push(Reply {
        author: auth.id,
        text: payload.text,
        created_at: Utc::now(),
    });
    thread.updated_at = Utc::now();
    state.repo.update_thread_messages(&thread).await?;

    Ok((StatusCode::CREATED, Json(thread)))
}
