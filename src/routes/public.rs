use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session: content reads, the auth flows that create
/// a session in the first place, and monitoring.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // --- Auth ---
        // GET /api/auth
        // Supabase URL plus the callback the provider redirects back to.
        .route("/api/auth", get(handlers::get_auth_config))
        .route("/api/auth/sign-in", post(handlers::sign_in))
        .route("/api/auth/sign-up", post(handlers::sign_up))
        // POST /api/auth/sign-out
        // Clears the session cookie even when the provider call fails.
        .route("/api/auth/sign-out", post(handlers::sign_out))
        .route("/api/auth/forgot-password", post(handlers::forgot_password))
        // POST /api/auth/update-password
        // Uses the recovery token directly; the user may not have a profile row.
        .route("/api/auth/update-password", post(handlers::update_password))
        .route("/api/auth/oauth/{provider}", get(handlers::oauth_redirect))
        .route("/api/auth/session", get(handlers::get_session))
        // --- Content ---
        // GET /api/posts?type=...&category=...&tag=...&author=...
        .route("/api/posts", get(handlers::list_posts))
        .route("/api/posts/{id}", get(handlers::get_post))
        .route("/api/posts/{id}/comments", get(handlers::get_post_comments))
        // POST /api/posts/{id}/views
        // Anonymous visits count too.
        .route("/api/posts/{id}/views", post(handlers::record_post_view))
        .route("/api/users/{id}", get(handlers::get_user))
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/tags", get(handlers::list_tags))
        .route("/api/ads", get(handlers::get_ad_config))
}
