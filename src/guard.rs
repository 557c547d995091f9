use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, auth};

const PROTECTED_PREFIXES: [&str; 3] = ["/profile", "/settings", "/board"];
const AUTH_ONLY_PREFIXES: [&str; 4] = ["/login", "/register", "/forgot-password", "/reset-password"];

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// RouteClass
///
/// What a page path requires of the visitor's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Needs an active session.
    Protected,
    /// Only meaningful while signed out.
    AuthOnly,
    Unrestricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectHome,
    RedirectLogin,
}

/// `/board` matches `/board` and `/board/42`, but not `/boardroom`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn classify(path: &str) -> RouteClass {
    if PROTECTED_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
        RouteClass::Protected
    } else if AUTH_ONLY_PREFIXES.iter().any(|p| matches_prefix(path, p)) {
        RouteClass::AuthOnly
    } else {
        RouteClass::Unrestricted
    }
}

/// decide
///
/// Pure routing rule: signed-out visitors never see protected pages, signed-in
/// visitors are bounced off the sign-in flows.
pub fn decide(path: &str, has_session: bool) -> GuardDecision {
    match (classify(path), has_session) {
        (RouteClass::Protected, false) => GuardDecision::RedirectLogin,
        (RouteClass::AuthOnly, true) => GuardDecision::RedirectHome,
        _ => GuardDecision::Allow,
    }
}

/// route_guard
///
/// Page middleware. Resolves the session from the request and applies `decide`.
/// A token that cannot be read counts as no session at all.
pub async fn route_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();

    let has_session = match auth::resolve_session(request.headers(), &state.config) {
        Ok(session) => session.is_some(),
        Err(e) => {
            tracing::warn!("session check failed for {}: {:?}", path, e);
            false
        }
    };

    match decide(&path, has_session) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::RedirectHome => {
            tracing::info!("{} requires a signed-out visitor, redirecting to {}", path, HOME_PATH);
            Redirect::temporary(HOME_PATH).into_response()
        }
        GuardDecision::RedirectLogin => {
            tracing::info!("{} requires a session, redirecting to {}", path, LOGIN_PATH);
            Redirect::temporary(LOGIN_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_paths_share_the_class_of_their_root() {
        assert_eq!(classify("/board"), RouteClass::Protected);
        assert_eq!(classify("/board/42"), RouteClass::Protected);
        assert_eq!(classify("/boardroom"), RouteClass::Unrestricted);
        assert_eq!(classify("/reset-password/confirm"), RouteClass::AuthOnly);
        assert_eq!(classify("/template/forum"), RouteClass::Unrestricted);
    }
}
