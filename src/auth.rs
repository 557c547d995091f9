use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    models::Role,
    repository::RepositoryState,
};

/// Lifetime of tokens minted by the in-memory auth provider, in seconds.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Claims
///
/// The subset of a Supabase access token this service reads. Supabase also sets
/// `aud`, `session_id` and friends; those are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the auth user id, which is also the `users.id` of the profile.
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Provider-level role (`authenticated`, `anon`), unrelated to the community RBAC role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// issue_token
///
/// Mints an HS256 access token shaped like the ones Supabase hands out. Returns the
/// token and its lifetime in seconds.
pub fn issue_token(
    user_id: &str,
    email: Option<&str>,
    secret: &str,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + TOKEN_TTL_SECS) as usize,
        iat: now as usize,
        email: email.map(str::to_string),
        role: Some("authenticated".to_string()),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, TOKEN_TTL_SECS))
}

/// decode_token
///
/// Validates signature and expiry. An expired token is an ordinary signed-out state
/// and yields `Ok(None)`; anything else that fails (bad signature, garbage input) is
/// an error.
pub fn decode_token(
    token: &str,
    secret: &str,
) -> Result<Option<Claims>, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // Supabase tokens carry `aud: authenticated`.
    validation.validate_aud = false;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(Some(data.claims)),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Ok(None),
        Err(e) => Err(e),
    }
}

/// extract_token
///
/// Looks for the access token in the `Authorization: Bearer` header first, then in
/// the session cookie.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// resolve_session
///
/// The session behind a request, if any. `Err` means a token was present but could
/// not be read; callers decide how to treat that.
pub fn resolve_session(
    headers: &HeaderMap,
    config: &AppConfig,
) -> Result<Option<Claims>, jsonwebtoken::errors::Error> {
    match extract_token(headers, &config.session_cookie) {
        Some(token) => decode_token(&token, &config.jwt_secret),
        None => Ok(None),
    }
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Auth user id, shared with `users.id`.
    pub id: String,
    pub role: Role,
    pub email: Option<String>,
}

/// AuthUser Extractor Implementation
///
/// Usable as an argument in any handler that needs a signed-in user.
///
/// 1. Local Bypass: in `Env::Local`, an `x-user-id` header naming a known user is enough.
/// 2. Token Validation: Bearer header or session cookie, decoded as an HS256 JWT.
/// 3. Profile Lookup: the community role comes from the `users` row. Accounts that
///    have signed up but have no profile row yet are treated as plain users.
///
/// Rejection: `ApiError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 1. Local Development Bypass
        if config.env == Env::Local {
            if let Some(user_id) = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
            {
                if let Some(user) = repo.get_user_by_id(user_id).await {
                    return Ok(AuthUser {
                        id: user.id,
                        role: user.role,
                        email: Some(user.email),
                    });
                }
                tracing::debug!("x-user-id `{}` is not a known user, checking token", user_id);
            }
        }

        // 2. Token Validation
        let claims = match resolve_session(&parts.headers, &config) {
            Ok(Some(claims)) => claims,
            Ok(None) => return Err(ApiError::Unauthorized),
            Err(e) => {
                tracing::warn!("rejected session token: {:?}", e);
                return Err(ApiError::Unauthorized);
            }
        };

        // 3. Profile Lookup
        let role = match repo.get_user_by_id(&claims.sub).await {
            Some(user) => user.role,
            None => Role::User,
        };

        Ok(AuthUser {
            id: claims.sub,
            role,
            email: claims.email,
        })
    }
}
