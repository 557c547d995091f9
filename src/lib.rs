use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

use std::sync::Arc;

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod auth_service;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod repository;
pub mod validation;

// Routing segregation (Public API, Authenticated API, Guarded pages).
pub mod routes;
use auth::AuthUser;
use config::AuthProvider;
use routes::{authenticated, pages as page_routes, public};

// --- Public Re-exports ---

pub use auth_service::{AuthServiceState, GoTrueClient, MockAuthService};
pub use config::AppConfig;
pub use fixtures::FixtureRepository;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `/api` path and schema into the OpenAPI document served at
/// `/api-docs/openapi.json`. Page routes are not part of the API contract.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_auth_config, handlers::sign_in, handlers::sign_up, handlers::sign_out,
        handlers::forgot_password, handlers::update_password, handlers::oauth_redirect,
        handlers::get_session, handlers::list_posts, handlers::get_post,
        handlers::get_post_comments, handlers::record_post_view, handlers::get_user,
        handlers::list_categories, handlers::list_tags, handlers::get_ad_config,
        handlers::create_post, handlers::create_comment, handlers::toggle_like,
        handlers::get_notifications, handlers::get_me
    ),
    components(
        schemas(
            models::Post, models::Comment, models::User, models::Category, models::Tag,
            models::Like, models::Notification, models::UserSetting, models::PostType,
            models::PostStatus, models::Availability, models::TargetType, models::Role,
            models::SignInRequest, models::SignUpRequest, models::ForgotPasswordRequest,
            models::UpdatePasswordRequest, models::CreatePostRequest,
            models::CreateCommentRequest, models::ToggleLikeRequest,
            models::ToggleLikeResponse, models::AuthConfigResponse, models::SessionResponse,
            models::MessageResponse, models::OAuthRedirectResponse, models::MeResponse,
            config::AdMobConfig, error::ErrorBody,
        )
    ),
    tags(
        (name = "community-kit", description = "Community template API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single container of shared services, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Data-Access Shim: fixtures or Postgres, chosen at startup.
    pub repo: RepositoryState,
    /// Hosted identity provider.
    pub auth: AuthServiceState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AuthServiceState {
    fn from_ref(app_state: &AppState) -> AuthServiceState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// build_auth_service
///
/// The session issuer selected by `AppConfig::auth_provider`. The in-memory provider
/// starts with the fixture demo accounts.
pub fn build_auth_service(config: &AppConfig) -> AuthServiceState {
    match config.auth_provider {
        AuthProvider::GoTrue => Arc::new(GoTrueClient::from_config(config)),
        AuthProvider::Mock => {
            let provider = fixtures::DEMO_ACCOUNTS.iter().fold(
                MockAuthService::new(&config.jwt_secret),
                |provider, (id, email)| provider.with_account(id, email, fixtures::DEMO_PASSWORD),
            );
            Arc::new(provider)
        }
    }
}

/// auth_middleware
///
/// Runs the `AuthUser` extractor ahead of the authenticated API routes. A failed
/// extraction rejects the request with 401 before the handler is reached.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles every route, the scoped access layers and the observability stack.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Pages: signed-in/signed-out redirects.
        .merge(
            page_routes::page_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                guard::route_guard,
            )),
        )
        .merge(public::public_routes())
        // Authenticated API: 401 without a valid session.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the `http_request` span with the request id set by `SetRequestIdLayer`, so
/// every log line of one request can be correlated.
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
