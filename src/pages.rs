use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use crate::{
    AppState,
    auth::AuthUser,
    auth_service::OAuthProvider,
    config::CommunityConfig,
    error::ApiError,
    models::{AuthConfigResponse, Comment, Post, PostType, User, UserSetting},
};

// --- View Models ---
//
// Pages are served as JSON view-models; rendering is left to the client.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub community: CommunityConfig,
    /// Banner ad unit for the home slot, absent when none is configured.
    pub banner_ad_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthPage {
    /// Which form to show: login, register, forgot-password or reset-password.
    pub form: &'static str,
    pub providers: Vec<&'static str>,
    pub auth: AuthConfigResponse,
}

#[derive(Debug, Serialize)]
pub struct PostListPage {
    pub community: CommunityConfig,
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct SettingsPage {
    pub settings: Option<UserSetting>,
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub user: Option<User>,
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct ForumPostPage {
    pub post: Post,
    pub comments: Vec<Comment>,
}

const FORUM_TEMPLATE_PATH: &str = "/template/forum";

// --- Handlers ---

pub async fn home(State(state): State<AppState>) -> Json<HomePage> {
    let banner = &state.config.ads.banner_id;
    Json(HomePage {
        community: state.config.community(),
        banner_ad_id: (!banner.is_empty()).then(|| banner.clone()),
    })
}

fn auth_page(state: &AppState, form: &'static str) -> Json<AuthPage> {
    Json(AuthPage {
        form,
        providers: OAuthProvider::ALL.iter().map(|p| p.as_str()).collect(),
        auth: AuthConfigResponse {
            url: state.config.supabase_url.clone(),
            redirect: state.config.auth_redirect_url(),
        },
    })
}

pub async fn login(State(state): State<AppState>) -> Json<AuthPage> {
    auth_page(&state, "login")
}

pub async fn register(State(state): State<AppState>) -> Json<AuthPage> {
    auth_page(&state, "register")
}

pub async fn forgot_password(State(state): State<AppState>) -> Json<AuthPage> {
    auth_page(&state, "forgot-password")
}

pub async fn reset_password(State(state): State<AppState>) -> Json<AuthPage> {
    auth_page(&state, "reset-password")
}

/// The OAuth and email-link landing page. Tokens arrive in the URL fragment and are
/// picked up client-side.
pub async fn auth_callback(State(state): State<AppState>) -> Json<AuthPage> {
    auth_page(&state, "callback")
}

/// board
///
/// The main feed of the configured community.
pub async fn board(State(state): State<AppState>) -> Json<PostListPage> {
    let community = state.config.community();
    let posts = state.repo.get_posts_by_type(community.community_type).await;
    Json(PostListPage { community, posts })
}

pub async fn settings(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Json<SettingsPage> {
    Json(SettingsPage {
        settings: state.repo.get_user_settings(&id).await,
    })
}

pub async fn profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Json<ProfilePage> {
    let user = state.repo.get_user_by_id(&id).await;
    let posts = state.repo.get_posts_by_author(&id).await;
    Json(ProfilePage { user, posts })
}

/// template
///
/// Preview of one of the four community layouts, regardless of the configured type.
pub async fn template(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<PostListPage>, ApiError> {
    let post_type: PostType = kind.parse().map_err(|_| ApiError::NotFound)?;
    let posts = state.repo.get_posts_by_type(post_type).await;
    Ok(Json(PostListPage {
        community: CommunityConfig::for_type(post_type),
        posts,
    }))
}

/// forum_post
///
/// Forum question detail. Counts a view on every visit. Anything that is not a
/// known forum post sends the visitor back to the forum list.
pub async fn forum_post(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut post = match state.repo.get_post_by_id(&id).await {
        Some(post) if post.post_type == PostType::Forum => post,
        _ => {
            tracing::info!("forum post `{}` not found, redirecting", id);
            return Redirect::temporary(FORUM_TEMPLATE_PATH).into_response();
        }
    };

    state.repo.increment_post_views(&id).await;
    post.views_count += 1;

    let comments = state.repo.get_comments_by_post_id(&id).await;
    Json(ForumPostPage { post, comments }).into_response()
}
