use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every handler here receives a validated `AuthUser`. The extractor middleware on
/// the router layer above this module rejects the request with 401 first.
///
/// GET /api/posts/{id}/comments lives in the public module; axum merges the two
/// method routers for that path.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/me
        // The signed-in identity and its community profile.
        .route("/api/me", get(handlers::get_me))
        // POST /api/posts
        // Publishes a post; the author is always the requester.
        .route("/api/posts", post(handlers::create_post))
        .route("/api/posts/{id}/comments", post(handlers::create_comment))
        // POST /api/likes
        // Toggle semantics: a second call with the same target removes the like.
        .route("/api/likes", post(handlers::toggle_like))
        .route("/api/notifications", get(handlers::get_notifications))
}
