use community_kit::{
    AppState, FixtureRepository, build_auth_service,
    config::{AppConfig, AuthProvider, DataSource, Env},
    create_router, fixtures,
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, data source, auth provider, HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "community_kit=debug,tower_http=info,axum=trace".into());

    // 3. Logging format follows the environment: pretty locally, JSON in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!(
        "Application starting in {:?} mode with the {:?} data source ({} community)",
        config.env,
        config.data_source,
        config.community_type
    );

    // 4. Data-Access Shim
    let repo: RepositoryState = match (config.data_source, config.db_url.as_deref()) {
        (DataSource::Live, Some(db_url)) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            // LOCAL-ONLY: bring a development database up to the reference schema.
            if config.env == Env::Local {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .expect("FATAL: Failed to apply migrations.");
                tracing::info!("Migrations applied.");
            }

            Arc::new(PostgresRepository::new(pool))
        }
        _ => {
            tracing::info!("Serving in-memory fixture data; nothing will be persisted.");
            Arc::new(FixtureRepository::seeded())
        }
    };

    // 5. Auth Provider
    let auth = build_auth_service(&config);
    if config.auth_provider == AuthProvider::Mock {
        tracing::info!(
            "Using the in-memory auth provider. Demo accounts sign in with password {}: {:?}",
            fixtures::DEMO_PASSWORD,
            fixtures::DEMO_ACCOUNTS.map(|(_, email)| email)
        );
    }

    // 6. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState { repo, auth, config };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
