use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{BuyTicketRequest, CreateTicketTypeRequest, Event, Ticket, TicketType},
    validate::ValidatedJson,
};

fn ensure_ticketing(event: &Event) -> Result<(), ApiError> {
    if event.visibility != "public" || !event.ticketing_enabled {
        return Err(ApiError::conflict("Ticketing not enabled for this event"));
    }
    Ok(())
}

/// create_type
///
/// [Authenticated Route] Defines a ticket tier on a public, ticketing-enabled
/// event. Organisers only; a duplicate tier name on the same event surfaces
/// as the storage layer's unique violation and renders as 409.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/types",
    request_body = CreateTicketTypeRequest,
    responses(
        (status = 201, description = "Created", body = TicketType),
        (status = 403, description = "Caller is not an organiser"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Ticketing disabled or duplicate name")
    )
)]
pub async fn create_type(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTicketTypeRequest>,
) -> Result<(StatusCode, Json<TicketType>), ApiError> {
    let event = state
        .repo
        .get_event(payload.event_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;

    ensure_ticketing(&event)?;

    if !event.organisers.contains(&auth.id) {
        return Err(ApiError::forbidden(
            "Only organisers can create ticket types",
        ));
    }

    let ticket_type = TicketType {
        id: Uuid::new_v4(),
        event_id: event.id,
        name: payload.name,
        amount: payload.amount,
        quantity: payload.quantity,
        created_at: Utc::now(),
    };

    state.repo.create_ticket_type(&ticket_type).await?;

    Ok((StatusCode::CREATED, Json(ticket_type)))
}

/// buy
///
/// [Public Route] Anonymous purchase. The stock check reads the sold count
/// before inserting, so two racing buyers can briefly oversell by one; the
/// per-event buyer-identity unique index is the hard backstop against the
/// same buyer holding two tickets.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/buy",
    request_body = BuyTicketRequest,
    responses(
        (status = 201, description = "Purchased", body = Ticket),
        (status = 400, description = "Ticket type does not belong to the event"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Ticketing disabled, sold out, or repeat buyer")
    )
)]
pub async fn buy(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BuyTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let event = state
        .repo
        .get_event(payload.event_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;

    ensure_ticketing(&event)?;

    let ticket_type = state
        .repo
        .get_ticket_type(payload.ticket_type_id)
        .await?
        .filter(|tt| tt.event_id == event.id)
        .ok_or_else(|| ApiError::bad_request("Invalid ticketType for this event", None))?;

    let sold = state.repo.count_tickets(ticket_type.id).await?;
    if sold >= i64::from(ticket_type.quantity) {
        return Err(ApiError::conflict("Sold out"));
    }

    let ticket = Ticket {
        id: Uuid::new_v4(),
        event_id: event.id,
        ticket_type_id: ticket_type.id,
        buyer: payload.buyer,
        purchased_at: Utc::now(),
    };

    state.repo.create_ticket(&ticket).await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}
