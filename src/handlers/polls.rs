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
    models::{Answer, AnswerPollRequest, CreatePollRequest, Poll, Question},
    validate::ValidatedJson,
};

/// create
///
/// [Authenticated Route] Creates a poll under an event. Only organisers of
/// the event may do this; question ids are minted server-side.
#[utoipa::path(
    post,
    path = "/api/v1/polls",
    request_body = CreatePollRequest,
    responses(
        (status = 201, description = "Created", body = Poll),
        (status = 403, description = "Caller is not an organiser"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePollRequest>,
) -> Result<(StatusCode, Json<Poll>), ApiError> {
    let event = state
        .repo
        .get_event(payload.event_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;

    if !event.organisers.contains(&auth.id) {
        return Err(ApiError::forbidden("Only organisers can create polls"));
    }

    let now = Utc::now();
    let poll = Poll {
        id: Uuid::new_v4(),
        event_id: event.id,
        created_by: auth.id,
        title: payload.title,
        questions: payload
            .questions
            .into_iter()
            .map(|q| Question {
                id: Uuid::new_v4(),
                question: q.question,
                options: q.options,
            })
            .collect(),
        answers: vec![],
        created_at: now,
        updated_at: now,
    };

    state.repo.create_poll(&poll).await?;

    Ok((StatusCode::CREATED, Json(poll)))
}

/// get_by_id
#[utoipa::path(
    get,
    path = "/api/v1/polls/{id}",
    params(("id" = Uuid, Path, description = "Poll id")),
    responses(
        (status = 200, description = "Found", body = Poll),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Poll>, ApiError> {
    let poll = state
        .repo
        .get_poll(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Poll"))?;
    Ok(Json(poll))
}

/// answer
///
/// [Authenticated Route] Records the caller's answer. Only event participants
/// may answer, every choice must point at a real question and an in-bounds
/// option, and a participant answers at most once.
#[utoipa::path(
    post,
    path = "/api/v1/polls/{id}/answer",
    params(("id" = Uuid, Path, description = "Poll id")),
    request_body = AnswerPollRequest,
    responses(
        (status = 201, description = "Answer recorded", body = Poll),
        (status = 400, description = "Unknown question or option out of range"),
        (status = 403, description = "Caller is not a participant"),
        (status = 409, description = "Already answered")
    )
)]
pub async fn answer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AnswerPollRequest>,
) -> Result<(StatusCode, Json<Poll>), ApiError> {
    let mut poll = state
        .repo
        .get_poll(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Poll"))?;

    let event = state
        .repo
        .get_event(poll.event_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;

    if !event.participants.contains(&auth.id) {
        return Err(ApiError::forbidden("Only participants can answer polls"));
    }

    for choice in &payload.choices {
        let question = poll
            .questions
            .iter()
            .find(|q| q.id == choice.question_id)
            .ok_or_else(|| ApiError::bad_request("Invalid questionId", None))?;
        if choice.option_index >= question.options.len() {
            return Err(ApiError::bad_request("Invalid optionIndex", None));
        }
    }

    if poll.answers.iter().any(|a| a.participant == auth.id) {
        return Err(ApiError::conflict("You already answered this poll"));
    }

    poll.answers.push(Answer {
        participant: auth.id,
        choices: payload.choices,
        created_at: Utc::now(),
    });
    poll.updated_at = Utc::now();
    state.repo.update_poll_answers(&poll).await?;

    Ok((StatusCode::CREATED, Json(poll)))
}
