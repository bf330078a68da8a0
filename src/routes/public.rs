use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{AppState, handlers, middleware::auth_rate_limit};

/// Public Router Module
///
/// Endpoints that are unauthenticated and accessible to any client. The
/// credential endpoints sit behind the stricter auth rate limiter on top of
/// the global one; ticket purchase is anonymous by design so that buyers do
/// not need an account.
pub fn public_routes(state: AppState) -> Router<AppState> {
    let auth_routes = Router::new()
        // POST /auth/register
        // New account creation. Duplicate emails answer 409.
        .route("/auth/register", post(handlers::auth::register))
        // POST /auth/login
        // Credential check and token issuance. Unknown email and wrong
        // password both answer 401 "Invalid credentials".
        .route("/auth/login", post(handlers::auth::login))
        .route_layer(middleware::from_fn_with_state(state, auth_rate_limit));

    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(handlers::health))
        // POST /tickets/buy
        // Anonymous ticket purchase against a public, ticketing-enabled event.
        .route("/tickets/buy", post(handlers::tickets::buy))
        .merge(auth_routes)
}
