use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
    response::IntoResponse,
};
use community_kit::{
    AppState, MockAuthService,
    auth::{AuthUser, Claims},
    config::{AppConfig, Env},
    models::{
        Category, Comment, NewComment, NewPost, Notification, Post, PostType, Role, Tag,
        TargetType, User, UserSetting,
    },
    repository::Repository,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};

// --- Mock Repository for Auth Logic ---

#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn get_user_by_id(&self, id: &str) -> Option<User> {
        self.user_to_return.clone().filter(|u| u.id == id)
    }
    // Unused by the extractor.
    async fn get_post_by_id(&self, _id: &str) -> Option<Post> {
        None
    }
    async fn get_posts_by_category(&self, _category_id: &str) -> Vec<Post> {
        vec![]
    }
    async fn get_posts_by_type(&self, _post_type: PostType) -> Vec<Post> {
        vec![]
    }
    async fn get_posts_by_tag(&self, _tag: &str) -> Vec<Post> {
        vec![]
    }
    async fn get_posts_by_author(&self, _author_id: &str) -> Vec<Post> {
        vec![]
    }
    async fn increment_post_views(&self, _id: &str) {}
    async fn create_post(&self, _post: NewPost) -> Option<Post> {
        None
    }
    async fn get_comments_by_post_id(&self, _post_id: &str) -> Vec<Comment> {
        vec![]
    }
    async fn create_comment(&self, _comment: NewComment) -> Option<Comment> {
        None
    }
    async fn toggle_like(&self, _user_id: &str, _target_type: TargetType, _target_id: &str) -> bool {
        false
    }
    async fn list_categories(&self) -> Vec<Category> {
        vec![]
    }
    async fn list_tags(&self) -> Vec<Tag> {
        vec![]
    }
    async fn get_notifications(&self, _user_id: &str) -> Vec<Notification> {
        vec![]
    }
    async fn get_user_settings(&self, _user_id: &str) -> Option<UserSetting> {
        None
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: &str = "4f6c1c9e-7d8a-4a57-9d7e-1f2b3c4d5e6f";

fn now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Signs a token expiring `exp_offset` seconds from now (negative for the past).
fn create_token(user_id: &str, exp_offset: i64) -> String {
    let issued = now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: issued as usize,
        exp: (issued + exp_offset) as usize,
        email: Some("test@example.com".to_string()),
        role: Some("authenticated".to_string()),
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn test_user(id: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        username: "tester".to_string(),
        display_name: "Tester".to_string(),
        email: "test@example.com".to_string(),
        avatar: None,
        bio: None,
        role,
        is_verified: true,
        followers: None,
        following: None,
        post_count: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

fn create_app_state(env: Env, repo: MockAuthRepo) -> AppState {
    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };

    AppState {
        repo: Arc::new(repo),
        auth: Arc::new(MockAuthService::new(TEST_JWT_SECRET)),
        config,
    }
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let token = create_token(TEST_USER_ID, 3600);
    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user(TEST_USER_ID, Role::Moderator)),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &token);

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .expect("valid token must authenticate");
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.role, Role::Moderator);
    assert_eq!(user.email.as_deref(), Some("test@example.com"));
}

#[tokio::test]
async fn test_auth_success_with_session_cookie() {
    let token = create_token(TEST_USER_ID, 3600);
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_str(&format!("sb-access-token={}", token)).unwrap(),
    );

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .expect("cookie token must authenticate");
    assert_eq!(user.id, TEST_USER_ID);
    // No profile row yet: plain user.
    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let rejection = auth_user.expect_err("no credentials must be rejected");
    assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    // Well past the default 60 second leeway.
    let token = create_token(TEST_USER_ID, -3600);
    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user(TEST_USER_ID, Role::User)),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &token);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let rejection = auth_user.expect_err("expired token must be rejected");
    assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_foreign_signature() {
    let claims = Claims {
        sub: TEST_USER_ID.to_string(),
        iat: now() as usize,
        exp: (now() + 3600) as usize,
        email: None,
        role: None,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"someone-elses-secret"),
    )
    .unwrap();
    let app_state = create_app_state(Env::Production, MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &token);

    assert!(
        AuthUser::from_request_parts(&mut parts, &app_state)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_local_bypass_success() {
    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user("user-1", Role::Admin)),
    };
    let app_state = create_app_state(Env::Local, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_static("user-1"),
    );

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .expect("known user id must pass the local bypass");
    assert_eq!(user.id, "user-1");
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_local_bypass_requires_known_user() {
    let app_state = create_app_state(Env::Local, MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_static("nobody"),
    );

    assert!(
        AuthUser::from_request_parts(&mut parts, &app_state)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let mock_repo = MockAuthRepo {
        user_to_return: Some(test_user("user-1", Role::Admin)),
    };
    let app_state = create_app_state(Env::Production, mock_repo);

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_static("user-1"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let rejection = auth_user.expect_err("bypass must be ignored in production");
    assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mock_provider_tokens_are_accepted() {
    use community_kit::auth_service::AuthService;

    let provider =
        MockAuthService::new(TEST_JWT_SECRET).with_account(TEST_USER_ID, "a@b.co", "Secret1!");
    let session = provider
        .sign_in_with_password("a@b.co", "Secret1!")
        .await
        .unwrap();
    assert!(provider.sign_in_with_password("a@b.co", "wrong").await.is_err());

    let app_state = create_app_state(Env::Production, MockAuthRepo::default());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &session.access_token);

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(user.id, TEST_USER_ID);
}

#[tokio::test]
async fn test_mock_provider_password_update_and_lookup() {
    use community_kit::auth_service::AuthService;

    let provider =
        MockAuthService::new(TEST_JWT_SECRET).with_account(TEST_USER_ID, "a@b.co", "Secret1!");
    let session = provider
        .sign_in_with_password("a@b.co", "Secret1!")
        .await
        .unwrap();

    let identity = provider.get_user(&session.access_token).await.unwrap();
    assert_eq!(identity.id, TEST_USER_ID);
    assert!(provider.get_user("garbage").await.is_err());

    provider
        .update_password(&session.access_token, "N3w!password")
        .await
        .unwrap();
    assert!(provider.sign_in_with_password("a@b.co", "Secret1!").await.is_err());
    assert!(
        provider
            .sign_in_with_password("a@b.co", "N3w!password")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_mock_provider_confirmation_flow() {
    use community_kit::auth_service::{AuthService, SignUpOutcome};

    let provider = MockAuthService::new(TEST_JWT_SECRET).requiring_confirmation();
    let outcome = provider.sign_up("new@b.co", "Str0ng!pass").await.unwrap();
    assert!(matches!(outcome, SignUpOutcome::ConfirmationPending(_)));

    let again = provider.sign_up("new@b.co", "Str0ng!pass").await;
    let rejection = again.err().expect("duplicate sign-up is rejected");
    assert_eq!(rejection.status_code(), StatusCode::BAD_REQUEST);
}
