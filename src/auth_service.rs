use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::json;
use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};
use tokio::sync::RwLock;

use crate::{auth, config::AppConfig};

/// AuthError
///
/// Failures of the hosted auth provider, phrased so they can be shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,
    /// The provider refused the request and said why.
    #[error("{0}")]
    Rejected(String),
    #[error("`{0}` is not a supported sign-in provider.")]
    UnsupportedProvider(String),
    #[error("The authentication service is unavailable. Please try again later.")]
    Network(#[from] reqwest::Error),
    #[error("The authentication service is misconfigured.")]
    Misconfigured(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
            AuthError::Rejected(_) => StatusCode::BAD_REQUEST,
            AuthError::UnsupportedProvider(_) => StatusCode::NOT_FOUND,
            AuthError::Network(_) => StatusCode::BAD_GATEWAY,
            AuthError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// AuthIdentity
///
/// The provider-side account behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthIdentity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthIdentity,
}

/// SignUpOutcome
///
/// Projects with email confirmation enabled answer a sign-up with the bare account
/// and no session; the user has to follow the emailed link first.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    Session(AuthSession),
    ConfirmationPending(AuthIdentity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
    Facebook,
}

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 3] = [
        OAuthProvider::Google,
        OAuthProvider::Github,
        OAuthProvider::Facebook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
            OAuthProvider::Facebook => "facebook",
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OAuthProvider::ALL
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| AuthError::UnsupportedProvider(s.to_string()))
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AuthService Trait
///
/// Contract for the hosted identity provider. Sessions live with the provider; this
/// service never stores them.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<AuthSession, AuthError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
    /// Emails a recovery link that lands on `redirect_to`.
    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;
    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError>;
    async fn get_user(&self, access_token: &str) -> Result<AuthIdentity, AuthError>;
    /// Builds the provider URL the browser is sent to for an OAuth sign-in.
    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, AuthError>;
}

pub type AuthServiceState = Arc<dyn AuthService>;

/// Error payloads differ between GoTrue versions; any of these fields may carry the
/// human-readable reason.
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

/// GoTrueClient
///
/// `AuthService` over the Supabase GoTrue REST API.
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: supabase_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.supabase_url, &config.supabase_anon_key)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(path))
            .header("apikey", &self.anon_key)
    }

    /// Sends the request and turns every non-2xx answer into an `AuthError`.
    async fn send(&self, request: RequestBuilder) -> Result<Response, AuthError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .json::<GoTrueErrorBody>()
            .await
            .unwrap_or_default();
        tracing::warn!("auth provider rejected request: {} {:?}", status, body);

        if body.error.as_deref() == Some("invalid_grant") {
            return Err(AuthError::InvalidCredentials);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::SessionExpired);
        }
        let message = body
            .error_description
            .or(body.msg)
            .or(body.message)
            .or(body.error)
            .unwrap_or_else(|| format!("Authentication request failed ({}).", status));
        Err(AuthError::Rejected(message))
    }
}

#[async_trait]
impl AuthService for GoTrueClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let request = self
            .request(Method::POST, "token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        Ok(self.send(request).await?.json::<AuthSession>().await?)
    }

    /// sign_up
    ///
    /// With autoconfirm on, GoTrue answers like the token endpoint. Otherwise the body
    /// is the new account itself.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let request = self
            .request(Method::POST, "signup")
            .json(&json!({ "email": email, "password": password }));
        let body: serde_json::Value = self.send(request).await?.json().await?;

        if body.get("access_token").is_some() {
            let session = serde_json::from_value::<AuthSession>(body)
                .map_err(|e| AuthError::Misconfigured(e.to_string()))?;
            return Ok(SignUpOutcome::Session(session));
        }

        let account = body.get("user").cloned().unwrap_or(body);
        let identity = serde_json::from_value::<AuthIdentity>(account)
            .map_err(|e| AuthError::Misconfigured(e.to_string()))?;
        Ok(SignUpOutcome::ConfirmationPending(identity))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let request = self
            .request(Method::POST, "logout")
            .bearer_auth(access_token);
        self.send(request).await?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let request = self
            .request(Method::POST, "recover")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }));
        self.send(request).await?;
        Ok(())
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError> {
        let request = self
            .request(Method::PUT, "user")
            .bearer_auth(access_token)
            .json(&json!({ "password": password }));
        self.send(request).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthIdentity, AuthError> {
        let request = self.request(Method::GET, "user").bearer_auth(access_token);
        Ok(self.send(request).await?.json::<AuthIdentity>().await?)
    }

    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, AuthError> {
        Url::parse_with_params(
            &self.endpoint("authorize"),
            &[("provider", provider.as_str()), ("redirect_to", redirect_to)],
        )
        .map(String::from)
        .map_err(|e| AuthError::Misconfigured(e.to_string()))
    }
}

// --- In-memory Provider ---

#[derive(Debug, Clone)]
struct MockAccount {
    id: String,
    password: String,
}

/// MockAuthService
///
/// In-memory stand-in for the provider. Issues real HS256 session tokens signed with
/// the configured secret, so the route guard and the `AuthUser` extractor accept them.
pub struct MockAuthService {
    jwt_secret: String,
    accounts: RwLock<HashMap<String, MockAccount>>,
    require_confirmation: bool,
}

const MOCK_AUTHORIZE_URL: &str = "http://localhost:54321/auth/v1/authorize";

impl MockAuthService {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            accounts: RwLock::new(HashMap::new()),
            require_confirmation: false,
        }
    }

    /// Registers an account up front, keyed by email.
    pub fn with_account(mut self, id: &str, email: &str, password: &str) -> Self {
        self.accounts.get_mut().insert(
            email.to_string(),
            MockAccount {
                id: id.to_string(),
                password: password.to_string(),
            },
        );
        self
    }

    /// Makes sign-up answer with a pending confirmation instead of a session.
    pub fn requiring_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    fn issue(&self, id: &str, email: &str) -> Result<AuthSession, AuthError> {
        let (access_token, expires_in) =
            auth::issue_token(id, Some(email), &self.jwt_secret)
                .map_err(|e| AuthError::Misconfigured(e.to_string()))?;
        Ok(AuthSession {
            access_token,
            refresh_token: None,
            expires_in: Some(expires_in),
            user: AuthIdentity {
                id: id.to_string(),
                email: Some(email.to_string()),
            },
        })
    }

    fn identity_from_token(&self, access_token: &str) -> Result<AuthIdentity, AuthError> {
        match auth::decode_token(access_token, &self.jwt_secret) {
            Ok(Some(claims)) => Ok(AuthIdentity {
                id: claims.sub,
                email: claims.email,
            }),
            Ok(None) | Err(_) => Err(AuthError::SessionExpired),
        }
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let accounts = self.accounts.read().await;
        match accounts.get(email) {
            Some(account) if account.password == password => self.issue(&account.id, email),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(AuthError::Rejected("User already registered".to_string()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        accounts.insert(
            email.to_string(),
            MockAccount {
                id: id.clone(),
                password: password.to_string(),
            },
        );

        if self.require_confirmation {
            return Ok(SignUpOutcome::ConfirmationPending(AuthIdentity {
                id,
                email: Some(email.to_string()),
            }));
        }
        Ok(SignUpOutcome::Session(self.issue(&id, email)?))
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        // Unknown addresses succeed too, so the endpoint does not reveal who is registered.
        tracing::info!("mock password reset for {} -> {}", email, redirect_to);
        Ok(())
    }

    async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AuthError> {
        let identity = self.identity_from_token(access_token)?;
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .values_mut()
            .find(|account| account.id == identity.id)
            .ok_or(AuthError::SessionExpired)?;
        account.password = password.to_string();
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthIdentity, AuthError> {
        self.identity_from_token(access_token)
    }

    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, AuthError> {
        Url::parse_with_params(
            MOCK_AUTHORIZE_URL,
            &[("provider", provider.as_str()), ("redirect_to", redirect_to)],
        )
        .map(String::from)
        .map_err(|e| AuthError::Misconfigured(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_parse_from_path_segments() {
        assert_eq!("github".parse::<OAuthProvider>().ok(), Some(OAuthProvider::Github));
        assert!(matches!(
            "myspace".parse::<OAuthProvider>(),
            Err(AuthError::UnsupportedProvider(_))
        ));
    }

    #[test]
    fn authorize_url_carries_provider_and_redirect() {
        let client = GoTrueClient::new("https://xyz.supabase.co/", "anon");
        let url = client
            .oauth_authorize_url(OAuthProvider::Google, "http://localhost:3000/auth/callback")
            .unwrap();
        assert!(url.starts_with("https://xyz.supabase.co/auth/v1/authorize?"));
        assert!(url.contains("provider=google"));
        assert!(url.contains("redirect_to=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"));
    }
}
