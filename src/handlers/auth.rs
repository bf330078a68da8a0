use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState, auth,
    error::ApiError,
    models::{LoginRequest, LoginResponse, RegisterRequest, User},
    validate::ValidatedJson,
};

/// register
///
/// [Public Route, auth rate limit] Creates a local account. The password is
/// hashed with argon2 before it ever reaches the repository; the response
/// serializes the user without the hash. A duplicate email surfaces as the
/// storage layer's unique violation and renders as 409.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: payload.email.trim().to_lowercase(),
        password_hash: auth::hash_password(&payload.password)?,
        firstname: payload.firstname,
        lastname: payload.lastname,
        avatar: payload.avatar,
        city: payload.city,
        // Registration never grants an elevated role.
        role: "user".to_string(),
        created_at: now,
        updated_at: now,
    };

    state.repo.create_user(&user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// login
///
/// [Public Route, auth rate limit] Verifies the credential and returns a
/// signed bearer token plus the user. Unknown email and wrong password are
/// indistinguishable to the client: both answer 401 "Invalid credentials".
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    let user = state
        .repo
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Invalid credentials"))?;

    if !auth::verify_password(&user.password_hash, &payload.password) {
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    let token = auth::issue_token(&user, &state.config)?;

    Ok(Json(LoginResponse { token, user }))
}
