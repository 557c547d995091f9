use community_kit::{
    AppConfig, AppState, FixtureRepository, MockAuthService, create_router,
    models::{Comment, Post, SessionResponse, ToggleLikeResponse},
    repository::RepositoryState,
};
use reqwest::{StatusCode, header, redirect};
use std::sync::Arc;
use tokio::net::TcpListener;

const TEST_SECRET: &str = "api-test-secret";
const MEMBER_EMAIL: &str = "member@example.com";
const MEMBER_PASSWORD: &str = "Secret1!";

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(FixtureRepository::seeded()) as RepositoryState;
    let auth = Arc::new(
        MockAuthService::new(TEST_SECRET).with_account("user-1", MEMBER_EMAIL, MEMBER_PASSWORD),
    );
    let config = AppConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..AppConfig::default()
    };

    let router = create_router(AppState { repo, auth, config });

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Redirects are asserted on, not followed.
    let client = reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();

    TestApp { address, client }
}

/// Signs the fixture member in and returns the `name=value` part of the session cookie.
async fn sign_in(app: &TestApp) -> String {
    let response = app
        .client
        .post(app.url("/api/auth/sign-in"))
        .json(&serde_json::json!({ "email": MEMBER_EMAIL, "password": MEMBER_PASSWORD }))
        .send()
        .await
        .expect("sign-in request");
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie")
        .to_string();
    let session: SessionResponse = response.json().await.unwrap();
    assert_eq!(session.user_id, "user-1");

    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_list_and_read_forum_posts() {
    let app = spawn_app().await;

    let posts: Vec<Post> = app
        .client
        .get(app.url("/api/posts?type=forum"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3"]);

    let comments: Vec<Comment> = app
        .client
        .get(app.url("/api/posts/2/comments"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!comments.is_empty());

    let missing = app.client.get(app.url("/api/posts/42")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let unknown_type = app
        .client
        .get(app.url("/api/posts?type=podcast"))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_type.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = unknown_type.json().await.unwrap();
    assert!(body["fields"]["type"].is_array());
}

#[tokio::test]
async fn test_forum_detail_page_counts_views() {
    let app = spawn_app().await;

    let first: serde_json::Value = app
        .client
        .get(app.url("/template/forum/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["post"]["viewsCount"], serde_json::Value::from(43));

    let second: serde_json::Value = app
        .client
        .get(app.url("/template/forum/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["post"]["viewsCount"], serde_json::Value::from(44));

    let missing = app
        .client
        .get(app.url("/template/forum/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        missing.headers().get(header::LOCATION).unwrap(),
        "/template/forum"
    );
}

#[tokio::test]
async fn test_sign_in_cookie_opens_protected_pages() {
    let app = spawn_app().await;

    let anonymous = app.client.get(app.url("/board")).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::TEMPORARY_REDIRECT);

    let cookie = sign_in(&app).await;
    let board = app
        .client
        .get(app.url("/board"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(board.status(), StatusCode::OK);

    let login = app
        .client
        .get(app.url("/login"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(login.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn test_sign_in_with_wrong_password() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/auth/sign-in"))
        .json(&serde_json::json!({ "email": MEMBER_EMAIL, "password": "not-it-at-all" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_sign_up_reports_errors_per_field() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/auth/sign-up"))
        .json(&serde_json::json!({
            "email": "nope",
            "password": "weak",
            "confirmPassword": "different"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["fields"]["email"].is_array());
    assert!(body["fields"]["password"].is_array());
    assert!(body["fields"]["confirm_password"].is_array());
}

#[tokio::test]
async fn test_sign_up_then_session() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/auth/sign-up"))
        .json(&serde_json::json!({
            "email": "new@example.com",
            "password": "Str0ng!pass",
            "confirmPassword": "Str0ng!pass"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let session: SessionResponse = response.json().await.unwrap();
    let token = session.access_token.expect("immediate session");

    let current: SessionResponse = app
        .client
        .get(app.url("/api/auth/session"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current.email.as_deref(), Some("new@example.com"));
}

#[tokio::test]
async fn test_me_requires_a_session() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/api/me")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = sign_in(&app).await;
    let me: serde_json::Value = app
        .client
        .get(app.url("/api/me"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["id"], serde_json::Value::from("user-1"));
    assert!(me["profile"].is_object());
}

#[tokio::test]
async fn test_like_toggles_and_comments_post() {
    let app = spawn_app().await;
    let cookie = sign_in(&app).await;

    let like = |app: &TestApp| {
        app.client
            .post(app.url("/api/likes"))
            .header(header::COOKIE, &cookie)
            .json(&serde_json::json!({ "targetType": "post", "targetId": "1" }))
            .send()
    };

    let first: ToggleLikeResponse = like(&app).await.unwrap().json().await.unwrap();
    assert!(first.liked);
    let second: ToggleLikeResponse = like(&app).await.unwrap().json().await.unwrap();
    assert!(!second.liked);

    let created = app
        .client
        .post(app.url("/api/posts/1/comments"))
        .header(header::COOKIE, &cookie)
        .json(&serde_json::json!({ "content": "Same problem here." }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let comment: Comment = created.json().await.unwrap();
    assert_eq!(comment.author_id, "user-1");

    let anonymous = app
        .client
        .post(app.url("/api/posts/1/comments"))
        .json(&serde_json::json!({ "content": "Drive-by" }))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_out_clears_cookie() {
    let app = spawn_app().await;
    let cookie = sign_in(&app).await;

    let response = app
        .client
        .post(app.url("/api/auth/sign-out"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cleared.starts_with("sb-access-token="));
    assert!(cleared.contains("Max-Age=0"));
}
