use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod validate;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry
// point (main.rs) and to the test suite.
pub use config::AppConfig;
pub use error::ApiError;
pub use middleware::RateLimiters;
pub use repository::{PostgresRepository, Repository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application from the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]`
/// macros. The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::register, handlers::auth::login,
        handlers::users::me, handlers::users::get_by_id, handlers::users::delete_by_id,
        handlers::groups::create, handlers::groups::get_by_id,
        handlers::groups::join, handlers::groups::leave,
        handlers::events::create, handlers::events::get_by_id,
        handlers::events::join, handlers::events::leave,
        handlers::threads::create, handlers::threads::get_by_id,
        handlers::threads::add_message, handlers::threads::reply,
        handlers::albums::create, handlers::albums::get_by_id,
        handlers::albums::add_photo, handlers::albums::comment,
        handlers::polls::create, handlers::polls::get_by_id, handlers::polls::answer,
        handlers::tickets::create_type, handlers::tickets::buy,
    ),
    components(
        schemas(
            models::User, models::Event, models::Group, models::Thread,
            models::Message, models::Reply, models::Album, models::Photo,
            models::PhotoComment, models::Poll, models::Question, models::Answer,
            models::Choice, models::TicketType, models::Ticket, models::Buyer,
            models::RegisterRequest, models::LoginRequest, models::LoginResponse,
            models::CreateGroupRequest, models::CreateEventRequest,
            models::CreateThreadRequest, models::PostMessageRequest,
            models::CreateAlbumRequest, models::AddPhotoRequest,
            models::CommentPhotoRequest, models::CreatePollRequest,
            models::QuestionInput, models::AnswerPollRequest,
            models::CreateTicketTypeRequest, models::BuyTicketRequest,
            models::HealthResponse,
        )
    ),
    tags(
        (name = "gatherly", description = "Gatherly social event API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the Unified State Pattern: a single, thread-safe, immutable
/// container holding all application services and configuration, shared
/// across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Rate limiting: the global and credential-endpoint limiters.
    pub limits: RateLimiters,
}

// --- Axum FromRef Extractor Implementations ---

// These allow handlers and extractors to selectively pull components from
// the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the `authenticated_routes`. `AuthUser`
/// implements `FromRequestParts`, so a missing or invalid bearer token
/// rejects the request with 401 before any handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // CORS: explicit origin allow-list from configuration; an empty list
    // (local development) admits any origin.
    let allow_origin = if state.config.cors_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            state
                .config
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(allow_origin)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let api = Router::new()
        // Public routes: no auth layer. The credential endpoints carry their
        // own stricter rate-limit layer inside `public_routes`.
        .merge(public::public_routes(state.clone()))
        // Authenticated routes: protected by the bearer-token layer.
        .merge(
            authenticated::authenticated_routes().route_layer(
                axum::middleware::from_fn_with_state(state.clone(), auth_middleware),
            ),
        );

    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // The versioned API surface.
        .nest("/api/v1", api)
        // Anything else answers the standard 404 envelope.
        .fallback(handlers::not_found)
        // Global per-IP rate limit, ahead of routing so unknown paths are
        // throttled too.
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::global_rate_limit,
        ))
        // Baseline security headers on every response.
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .with_state(state);

    // Observability and correlation layers, applied outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in a
                // span carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Request ID propagation: returns x-request-id to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the `TraceLayer` span: includes the `x-request-id` header (if
/// present) alongside the HTTP method and URI so every log line for a single
/// request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
