use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{AppState, handlers};

/// Authenticated Router Module
///
/// Every route here sits behind the bearer-token layer applied in
/// `create_router`, so handlers can take `AuthUser` for granted. Finer checks
/// (admin role, organiser or participant membership) stay in the handlers,
/// next to the data they inspect.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The profile behind the presented token.
        .route("/me", get(handlers::users::me))
        // GET/DELETE /users/{id}
        // Profile lookup for any account; deletion is admin-only.
        .route("/users/{id}", get(handlers::users::get_by_id))
        .route("/users/{id}", delete(handlers::users::delete_by_id))
        // --- Groups ---
        .route("/groups", post(handlers::groups::create))
        .route("/groups/{id}", get(handlers::groups::get_by_id))
        // Join is idempotent; leave answers 409 for the last admin.
        .route("/groups/{id}/join", post(handlers::groups::join))
        .route("/groups/{id}/leave", post(handlers::groups::leave))
        // --- Events ---
        .route("/events", post(handlers::events::create))
        .route("/events/{id}", get(handlers::events::get_by_id))
        // Join is idempotent; leave answers 409 for the last organiser.
        .route("/events/{id}/join", post(handlers::events::join))
        .route("/events/{id}/leave", post(handlers::events::leave))
        // --- Threads ---
        // A thread hangs off exactly one of a group or an event.
        .route("/threads", post(handlers::threads::create))
        .route("/threads/{id}", get(handlers::threads::get_by_id))
        .route("/threads/{id}/messages", post(handlers::threads::add_message))
        .route(
            "/threads/{id}/messages/{message_id}/replies",
            post(handlers::threads::reply),
        )
        // --- Albums ---
        .route("/albums", post(handlers::albums::create))
        .route("/albums/{id}", get(handlers::albums::get_by_id))
        .route("/albums/{id}/photos", post(handlers::albums::add_photo))
        .route(
            "/albums/{id}/photos/{photo_id}/comments",
            post(handlers::albums::comment),
        )
        // --- Polls ---
        // Creation is organiser-gated, answering participant-gated.
        .route("/polls", post(handlers::polls::create))
        .route("/polls/{id}", get(handlers::polls::get_by_id))
        .route("/polls/{id}/answer", post(handlers::polls::answer))
        // --- Tickets ---
        // Tier definition is organiser-gated; purchase lives on the public
        // router.
        .route("/tickets/types", post(handlers::tickets::create_type))
}
