use crate::{AppState, pages};
use axum::{Router, routing::get};

/// Page Router Module
///
/// The screens of the site. The whole module is wrapped by the route guard, so a
/// protected page never runs for a signed-out visitor and the sign-in screens never
/// run for a signed-in one.
pub fn page_routes() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/", get(pages::home))
        // --- Auth-only ---
        .route("/login", get(pages::login))
        .route("/register", get(pages::register))
        .route("/forgot-password", get(pages::forgot_password))
        .route("/reset-password", get(pages::reset_password))
        // GET /auth/callback
        // Landing page for OAuth and email links.
        .route("/auth/callback", get(pages::auth_callback))
        // --- Protected ---
        .route("/board", get(pages::board))
        .route("/settings", get(pages::settings))
        .route("/profile", get(pages::profile))
        // --- Layout previews ---
        // GET /template/{social|forum|blog|ecommerce}
        .route("/template/{kind}", get(pages::template))
        // GET /template/forum/{id}
        // Counts a view; unknown ids bounce back to /template/forum.
        .route("/template/forum/{id}", get(pages::forum_post))
}
