use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use community_kit::{
    AppConfig, AppState, FixtureRepository, MockAuthService,
    auth::issue_token,
    build_auth_service, create_router, fixtures,
    guard::{GuardDecision, RouteClass, classify, decide},
};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "guard-test-secret";

fn app() -> axum::Router {
    let config = AppConfig {
        jwt_secret: SECRET.to_string(),
        ..AppConfig::default()
    };
    create_router(AppState {
        repo: Arc::new(FixtureRepository::seeded()),
        auth: Arc::new(MockAuthService::new(SECRET)),
        config,
    })
}

fn session_cookie() -> String {
    let (token, _) = issue_token("user-1", Some("a@b.co"), SECRET).unwrap();
    format!("sb-access-token={}", token)
}

async fn get(path: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut request = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

// --- Pure Decision Table ---

#[test]
fn test_protected_paths_require_a_session() {
    for path in ["/profile", "/settings", "/board", "/board/7", "/settings/privacy"] {
        assert_eq!(decide(path, false), GuardDecision::RedirectLogin, "{}", path);
        assert_eq!(decide(path, true), GuardDecision::Allow, "{}", path);
    }
}

#[test]
fn test_auth_only_paths_bounce_signed_in_visitors() {
    for path in ["/login", "/register", "/forgot-password", "/reset-password"] {
        assert_eq!(decide(path, true), GuardDecision::RedirectHome, "{}", path);
        assert_eq!(decide(path, false), GuardDecision::Allow, "{}", path);
    }
}

#[test]
fn test_everything_else_is_allowed() {
    for path in ["/", "/template/forum", "/template/forum/1", "/api/posts", "/profiles"] {
        assert_eq!(classify(path), RouteClass::Unrestricted, "{}", path);
        assert_eq!(decide(path, false), GuardDecision::Allow);
        assert_eq!(decide(path, true), GuardDecision::Allow);
    }
}

// --- Middleware ---

#[tokio::test]
async fn test_settings_without_session_redirects_to_login() {
    let response = get("/settings", None).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_login_with_session_redirects_home() {
    let cookie = session_cookie();
    let response = get("/login", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_home_is_open_in_any_session_state() {
    assert_eq!(get("/", None).await.status(), StatusCode::OK);
    let cookie = session_cookie();
    assert_eq!(get("/", Some(&cookie)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_page_renders_with_session() {
    let cookie = session_cookie();
    let response = get("/board", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unreadable_token_counts_as_signed_out() {
    // A broken token is not a session: protected pages redirect, auth pages render.
    let response = get("/profile", Some("sb-access-token=garbage")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");

    let response = get("/login", Some("sb-access-token=garbage")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_offline_auth_provider_signs_in_demo_accounts() {
    let config = AppConfig::default();
    let router = create_router(AppState {
        repo: Arc::new(FixtureRepository::seeded()),
        auth: build_auth_service(&config),
        config,
    });

    let (_, email) = fixtures::DEMO_ACCOUNTS[1];
    let body = serde_json::json!({ "email": email, "password": fixtures::DEMO_PASSWORD });
    let sign_in = router
        .clone()
        .oneshot(
            Request::post("/api/auth/sign-in")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(sign_in.status(), StatusCode::OK);

    let cookie = sign_in
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("session cookie")
        .to_string();

    let board = router
        .oneshot(
            Request::get("/board")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(board.status(), StatusCode::OK);
}
