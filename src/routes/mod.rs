/// Router Module Index
///
/// Organizes the application's routing logic into access-segregated modules so
/// that the bearer-token layer is applied explicitly at the module level (via
/// Axum layers) rather than remembered per handler.

/// Routes accessible without a token: health, registration, login and the
/// anonymous ticket purchase. The credential endpoints carry the stricter
/// rate-limit layer.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware. Requires a
/// validated bearer token.
pub mod authenticated;
