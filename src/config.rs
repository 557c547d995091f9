use serde::Serialize;
use std::env;

use crate::models::PostType;

/// AppConfig
///
/// Holds the application's entire configuration state. Read once at startup and
/// immutable afterwards; handlers pull it out of the shared state via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the dev bypass, log format and ad test ids.
    pub env: Env,
    // Which data source serves the Data-Access Shim.
    pub data_source: DataSource,
    // Who issues and checks sessions.
    pub auth_provider: AuthProvider,
    // Postgres connection string. Only required for the live data source.
    pub db_url: Option<String>,
    // Supabase project URL, e.g. https://xyz.supabase.co
    pub supabase_url: String,
    // Public (anon) API key sent as the `apikey` header on every auth call.
    pub supabase_anon_key: String,
    // Secret used to validate session JWTs issued by Supabase.
    pub jwt_secret: String,
    // Public URL of this site, used to build auth redirect targets.
    pub site_url: String,
    // Which of the four community layouts this deployment serves.
    pub community_type: PostType,
    pub ads: AdMobConfig,
    // Name of the cookie that carries the access token.
    pub session_cookie: String,
    pub bind_addr: String,
}

/// Env
///
/// Defines the runtime context: local development or hardened production.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// DataSource
///
/// Strategy for the Data-Access Shim. `Fixture` serves the in-memory demo records,
/// `Live` talks to Postgres.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DataSource {
    Fixture,
    Live,
}

/// AuthProvider
///
/// `Mock` keeps accounts in memory and signs tokens with `jwt_secret`, so a local
/// demo runs without a Supabase stack. `GoTrue` is the hosted auth service.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AuthProvider {
    Mock,
    GoTrue,
}

/// AdMobConfig
///
/// Ad unit identifiers handed to the client. Local runs always get Google's public
/// test units so no real impressions are ever generated during development.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdMobConfig {
    pub app_id: String,
    pub banner_id: String,
    pub interstitial_id: String,
    pub rewarded_id: String,
    pub test_device_id: String,
}

const TEST_APP_ID: &str = "ca-app-pub-3940256099942544~3347511713";
const TEST_BANNER_ID: &str = "ca-app-pub-3940256099942544/6300978111";
const TEST_INTERSTITIAL_ID: &str = "ca-app-pub-3940256099942544/1033173712";
const TEST_REWARDED_ID: &str = "ca-app-pub-3940256099942544/5224354917";

pub const DEFAULT_SESSION_COOKIE: &str = "sb-access-token";
const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

impl AdMobConfig {
    pub fn test_units() -> Self {
        Self {
            app_id: TEST_APP_ID.to_string(),
            banner_id: TEST_BANNER_ID.to_string(),
            interstitial_id: TEST_INTERSTITIAL_ID.to_string(),
            rewarded_id: TEST_REWARDED_ID.to_string(),
            test_device_id: env::var("ADMOB_TEST_DEVICE_ID").unwrap_or_default(),
        }
    }

    fn from_env() -> Self {
        Self {
            app_id: env::var("ADMOB_APP_ID").unwrap_or_default(),
            banner_id: env::var("ADMOB_BANNER_ID").unwrap_or_default(),
            interstitial_id: env::var("ADMOB_INTERSTITIAL_ID").unwrap_or_default(),
            rewarded_id: env::var("ADMOB_REWARDED_ID").unwrap_or_default(),
            test_device_id: env::var("ADMOB_TEST_DEVICE_ID").unwrap_or_default(),
        }
    }
}

/// CommunityConfig
///
/// Display descriptor for one community type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct CommunityConfig {
    #[serde(rename = "type")]
    pub community_type: PostType,
    pub title: String,
    pub description: String,
}

impl CommunityConfig {
    pub fn for_type(community_type: PostType) -> Self {
        let (title, description) = match community_type {
            PostType::Social => (
                "Social Community",
                "A social-media style community where members talk to each other and share content.",
            ),
            PostType::Forum => (
                "Forum Community",
                "A forum built around questions, answers and discussion for sharing knowledge.",
            ),
            PostType::Blog => (
                "Blog Community",
                "A blog-style community where members publish long-form stories and expertise.",
            ),
            PostType::Ecommerce => (
                "Commerce Community",
                "A commerce community centred on trading products and writing reviews.",
            ),
        };
        Self {
            community_type,
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// parse_community_type
///
/// Unknown or missing selectors fall back to `social`.
pub fn parse_community_type(raw: Option<&str>) -> PostType {
    raw.and_then(|value| value.trim().to_ascii_lowercase().parse().ok())
        .unwrap_or(PostType::Social)
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            data_source: DataSource::Fixture,
            auth_provider: AuthProvider::Mock,
            db_url: None,
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "local-anon-key".to_string(),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            site_url: "http://localhost:3000".to_string(),
            community_type: PostType::Social,
            ads: AdMobConfig::test_units(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables, following the fail-fast
    /// principle.
    ///
    /// # Panics
    /// Panics when a variable required by the selected environment or data source is
    /// missing, so the service never starts half-configured.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let data_source = match env::var("DATA_SOURCE").as_deref() {
            Ok("live") => DataSource::Live,
            Ok("fixture") => DataSource::Fixture,
            _ if env == Env::Production => DataSource::Live,
            _ => DataSource::Fixture,
        };

        let db_url = match data_source {
            DataSource::Live => Some(
                env::var("DATABASE_URL")
                    .expect("FATAL: DATABASE_URL is required for the live data source."),
            ),
            DataSource::Fixture => env::var("DATABASE_URL").ok(),
        };

        // Offline demo: fixture data and no Supabase project to talk to.
        let auth_provider = match env::var("AUTH_PROVIDER").as_deref() {
            Ok("mock") => AuthProvider::Mock,
            Ok("gotrue") => AuthProvider::GoTrue,
            _ if env == Env::Local
                && data_source == DataSource::Fixture
                && env::var("SUPABASE_URL").is_err() =>
            {
                AuthProvider::Mock
            }
            _ => AuthProvider::GoTrue,
        };

        let community_type = parse_community_type(env::var("COMMUNITY_TYPE").ok().as_deref());
        let site_url =
            env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let session_cookie =
            env::var("SESSION_COOKIE").unwrap_or_else(|_| DEFAULT_SESSION_COOKIE.to_string());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        match env {
            Env::Local => Self {
                env,
                data_source,
                auth_provider,
                db_url,
                // Default port of the Supabase CLI's local stack.
                supabase_url: env::var("SUPABASE_URL")
                    .unwrap_or_else(|_| "http://localhost:54321".to_string()),
                supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                    .unwrap_or_else(|_| "local-anon-key".to_string()),
                jwt_secret: env::var("SUPABASE_JWT_SECRET")
                    .unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                site_url,
                community_type,
                ads: AdMobConfig::test_units(),
                session_cookie,
                bind_addr,
            },
            Env::Production => Self {
                env,
                data_source,
                auth_provider: match auth_provider {
                    AuthProvider::GoTrue => AuthProvider::GoTrue,
                    AuthProvider::Mock => {
                        panic!("FATAL: AUTH_PROVIDER=mock is not allowed in production.")
                    }
                },
                db_url,
                supabase_url: env::var("SUPABASE_URL")
                    .expect("FATAL: SUPABASE_URL required in production."),
                supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                    .expect("FATAL: SUPABASE_ANON_KEY required in production."),
                jwt_secret: env::var("SUPABASE_JWT_SECRET")
                    .expect("FATAL: SUPABASE_JWT_SECRET must be set in production."),
                site_url,
                community_type,
                ads: AdMobConfig::from_env(),
                session_cookie,
                bind_addr,
            },
        }
    }

    pub fn community(&self) -> CommunityConfig {
        CommunityConfig::for_type(self.community_type)
    }

    /// Where the auth provider sends users back after OAuth or email links.
    pub fn auth_redirect_url(&self) -> String {
        format!("{}/auth/callback", self.site_url.trim_end_matches('/'))
    }

    pub fn reset_password_url(&self) -> String {
        format!("{}/reset-password", self.site_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn community_type_falls_back_to_social() {
        assert_eq!(parse_community_type(None), PostType::Social);
        assert_eq!(parse_community_type(Some("podcast")), PostType::Social);
        assert_eq!(parse_community_type(Some("Forum")), PostType::Forum);
        assert_eq!(parse_community_type(Some("ecommerce")), PostType::Ecommerce);
    }

    #[test]
    fn redirect_urls_ignore_trailing_slash() {
        let config = AppConfig {
            site_url: "https://community.example/".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.auth_redirect_url(),
            "https://community.example/auth/callback"
        );
        assert_eq!(
            config.reset_password_url(),
            "https://community.example/reset-password"
        );
    }
}
