use crate::{
    AppState,
    auth::{self, AuthUser},
    auth_service::{AuthSession, OAuthProvider, SignUpOutcome},
    config::{AdMobConfig, AppConfig, Env},
    error::ApiError,
    models::{
        AuthConfigResponse, Category, Comment, CreateCommentRequest, CreatePostRequest,
        ForgotPasswordRequest, MeResponse, MessageResponse, NewComment, Notification,
        OAuthRedirectResponse, Post, PostType, SessionResponse, SignInRequest, SignUpRequest,
        Tag, ToggleLikeRequest, ToggleLikeResponse, UpdatePasswordRequest, User,
    },
    validation::FieldErrors,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use validator::Validate;

// --- Filter Structs ---

/// PostFilter
///
/// Query parameters of GET /api/posts. The first filter present wins, in the order
/// type, category, tag, author. With none, the configured community type is listed.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PostFilter {
    /// One of social, forum, blog, ecommerce.
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub author: Option<String>,
}

// --- Session Cookie ---

fn session_cookie(config: &AppConfig, access_token: String) -> Cookie<'static> {
    Cookie::build((config.session_cookie.clone(), access_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.env == Env::Production)
        .build()
}

fn session_response(session: &AuthSession) -> SessionResponse {
    SessionResponse {
        user_id: session.user.id.clone(),
        email: session.user.email.clone(),
        access_token: Some(session.access_token.clone()),
        expires_in: session.expires_in,
        confirmation_pending: false,
    }
}

// --- Auth Handlers ---

/// get_auth_config
///
/// [Public Route] Where the client should send users to authenticate and where the
/// provider should send them back.
#[utoipa::path(
    get,
    path = "/api/auth",
    responses((status = 200, description = "Auth provider endpoints", body = AuthConfigResponse))
)]
pub async fn get_auth_config(State(state): State<AppState>) -> Json<AuthConfigResponse> {
    Json(AuthConfigResponse {
        url: state.config.supabase_url.clone(),
        redirect: state.config.auth_redirect_url(),
    })
}

/// sign_in
///
/// [Public Route] Email/password sign-in. On success the access token is returned and
/// mirrored into the session cookie, which is what the page guard reads.
#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Invalid form input")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    payload.validate()?;

    let session = state
        .auth
        .sign_in_with_password(&payload.email, &payload.password)
        .await?;
    tracing::info!("user {} signed in", session.user.id);

    let body = session_response(&session);
    let jar = jar.add(session_cookie(&state.config, session.access_token));
    Ok((jar, Json(body)))
}

/// sign_up
///
/// [Public Route] Registers a new account with the auth provider. When the project
/// requires email confirmation no session is created yet and `confirmationPending`
/// is set.
#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Rejected by the auth provider"),
        (status = 422, description = "Invalid form input")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), ApiError> {
    payload.validate()?;

    match state.auth.sign_up(&payload.email, &payload.password).await? {
        SignUpOutcome::Session(session) => {
            tracing::info!("user {} signed up", session.user.id);
            let body = session_response(&session);
            let jar = jar.add(session_cookie(&state.config, session.access_token));
            Ok((StatusCode::CREATED, jar, Json(body)))
        }
        SignUpOutcome::ConfirmationPending(identity) => {
            tracing::info!("user {} signed up, awaiting email confirmation", identity.id);
            let body = SessionResponse {
                user_id: identity.id,
                email: identity.email,
                access_token: None,
                expires_in: None,
                confirmation_pending: true,
            };
            Ok((StatusCode::CREATED, jar, Json(body)))
        }
    }
}

/// sign_out
///
/// [Public Route] Revokes the session at the provider when one is present and always
/// clears the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    responses((status = 200, description = "Signed out", body = MessageResponse))
)]
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    if let Some(token) = auth::extract_token(&headers, &state.config.session_cookie) {
        if let Err(e) = state.auth.sign_out(&token).await {
            tracing::warn!("provider sign-out failed: {}", e);
        }
    }

    let jar = jar.remove(Cookie::build((state.config.session_cookie.clone(), "")).path("/"));
    (
        jar,
        Json(MessageResponse {
            message: "Signed out.".to_string(),
        }),
    )
}

/// forgot_password
///
/// [Public Route] Sends the recovery email. The link lands on the reset-password page.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Recovery email sent", body = MessageResponse),
        (status = 422, description = "Invalid form input")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate()?;

    state
        .auth
        .send_password_reset(&payload.email, &state.config.reset_password_url())
        .await?;
    Ok(Json(MessageResponse {
        message: "Check your inbox for a password reset link.".to_string(),
    }))
}

/// update_password
///
/// [Public Route] Sets a new password using the recovery session from the emailed
/// link. Needs a token (header or cookie) but not a community profile.
#[utoipa::path(
    post,
    path = "/api/auth/update-password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 401, description = "No recovery session"),
        (status = 422, description = "Invalid form input")
    )
)]
pub async fn update_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = auth::extract_token(&headers, &state.config.session_cookie)
        .ok_or(ApiError::Unauthorized)?;
    payload.validate()?;

    state.auth.update_password(&token, &payload.password).await?;
    Ok(Json(MessageResponse {
        message: "Your password has been updated.".to_string(),
    }))
}

/// oauth_redirect
///
/// [Public Route] The provider URL that starts a social sign-in.
#[utoipa::path(
    get,
    path = "/api/auth/oauth/{provider}",
    params(("provider" = String, Path, description = "google, github or facebook")),
    responses(
        (status = 200, description = "Authorize URL", body = OAuthRedirectResponse),
        (status = 404, description = "Unsupported provider")
    )
)]
pub async fn oauth_redirect(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<OAuthRedirectResponse>, ApiError> {
    let provider: OAuthProvider = provider.parse()?;
    let url = state
        .auth
        .oauth_authorize_url(provider, &state.config.auth_redirect_url())?;
    Ok(Json(OAuthRedirectResponse { url }))
}

/// get_session
///
/// [Public Route] Reports the session carried by the request, without contacting the
/// provider. 401 when there is none.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Active session", body = SessionResponse),
        (status = 401, description = "No session")
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let claims = match auth::resolve_session(&headers, &state.config) {
        Ok(Some(claims)) => claims,
        Ok(None) => return Err(ApiError::Unauthorized),
        Err(e) => {
            tracing::debug!("unreadable session token: {:?}", e);
            return Err(ApiError::Unauthorized);
        }
    };

    let remaining = claims.exp as i64 - chrono::Utc::now().timestamp();
    Ok(Json(SessionResponse {
        user_id: claims.sub,
        email: claims.email,
        access_token: None,
        expires_in: Some(remaining.max(0)),
        confirmation_pending: false,
    }))
}

// --- Content Handlers ---

/// list_posts
///
/// [Public Route] Published posts, newest first, narrowed by a single filter.
#[utoipa::path(
    get,
    path = "/api/posts",
    params(PostFilter),
    responses(
        (status = 200, description = "Posts", body = [Post]),
        (status = 422, description = "Unknown post type")
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let repo = &state.repo;
    let posts = if let Some(raw) = filter.post_type.as_deref() {
        let post_type: PostType = raw.parse().map_err(|_| {
            ApiError::Validation(FieldErrors::from([(
                "type".to_string(),
                vec![format!("`{}` is not a post type.", raw)],
            )]))
        })?;
        repo.get_posts_by_type(post_type).await
    } else if let Some(category) = filter.category.as_deref() {
        repo.get_posts_by_category(category).await
    } else if let Some(tag) = filter.tag.as_deref() {
        repo.get_posts_by_tag(tag).await
    } else if let Some(author) = filter.author.as_deref() {
        repo.get_posts_by_author(author).await
    } else {
        repo.get_posts_by_type(state.config.community_type).await
    };
    Ok(Json(posts))
}

/// get_post
///
/// [Public Route] A single post with its author and category.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    state
        .repo
        .get_post_by_id(&id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/comments",
    responses((status = 200, description = "Comments, oldest first", body = [Comment]))
)]
pub async fn get_post_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Comment>> {
    Json(state.repo.get_comments_by_post_id(&id).await)
}

/// record_post_view
///
/// [Public Route] Bumps the view counter. Unknown ids are ignored.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/views",
    responses((status = 204, description = "Recorded"))
)]
pub async fn record_post_view(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.repo.increment_post_views(&id).await;
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    state
        .repo
        .get_user_by_id(&id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.repo.list_categories().await)
}

#[utoipa::path(
    get,
    path = "/api/tags",
    responses((status = 200, description = "Tags", body = [Tag]))
)]
pub async fn list_tags(State(state): State<AppState>) -> Json<Vec<Tag>> {
    Json(state.repo.list_tags().await)
}

/// get_ad_config
///
/// [Public Route] Ad unit ids for the client. Always Google's test units locally.
#[utoipa::path(
    get,
    path = "/api/ads",
    responses((status = 200, description = "Ad units", body = AdMobConfig))
)]
pub async fn get_ad_config(State(state): State<AppState>) -> Json<AdMobConfig> {
    Json(state.config.ads.clone())
}

// --- Authenticated Handlers ---

/// create_post
///
/// [Authenticated Route] Publishes a post authored by the requesting user.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Invalid form input")
    )
)]
pub async fn create_post(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    payload.validate()?;

    let post = state
        .repo
        .create_post(payload.into_new_post(id))
        .await
        .ok_or(ApiError::NotSaved)?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// create_comment
///
/// [Authenticated Route] Answers a post. The author is the requesting user.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Created", body = Comment),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Invalid form input")
    )
)]
pub async fn create_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    payload.validate()?;

    let comment = state
        .repo
        .create_comment(NewComment {
            content: payload.content.trim().to_string(),
            author_id: Some(user_id),
            post_id,
            parent_id: payload.parent_id,
            is_accepted: None,
        })
        .await
        .ok_or(ApiError::NotSaved)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// toggle_like
///
/// [Authenticated Route] Likes the target, or removes the like if it already exists.
/// `liked: false` is also what a failed write reports.
#[utoipa::path(
    post,
    path = "/api/likes",
    request_body = ToggleLikeRequest,
    responses((status = 200, description = "New like state", body = ToggleLikeResponse))
)]
pub async fn toggle_like(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ToggleLikeRequest>,
) -> Json<ToggleLikeResponse> {
    let liked = state
        .repo
        .toggle_like(&id, payload.target_type, &payload.target_id)
        .await;
    Json(ToggleLikeResponse { liked })
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses((status = 200, description = "Notifications, newest first", body = [Notification]))
)]
pub async fn get_notifications(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<Notification>> {
    Json(state.repo.get_notifications(&id).await)
}

/// get_me
///
/// [Authenticated Route] The requesting identity and its profile, if one exists.
#[utoipa::path(
    get,
    path = "/api/me",
    responses((status = 200, description = "Current user", body = MeResponse))
)]
pub async fn get_me(
    AuthUser { id, role, email }: AuthUser,
    State(state): State<AppState>,
) -> Json<MeResponse> {
    let profile = state.repo.get_user_by_id(&id).await;
    Json(MeResponse {
        id,
        role,
        email,
        profile,
    })
}
