/// Router Module Index
///
/// Splits the surface by who may reach it. Access control is attached per module
/// (via Axum layers) in `create_router`, never inside individual handlers.

/// API routes open to anonymous visitors: reads, auth flows, health.
pub mod public;

/// API routes behind the `AuthUser` extractor middleware. 401 without a session.
pub mod authenticated;

/// Page view-models, wrapped by the route guard (redirects instead of 401).
pub mod pages;
