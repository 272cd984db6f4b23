use std::sync::Arc;

use auth::TokenCodec;
use auth::TokenService;
use chrono::Duration;
use identity_service::config::Config;
use identity_service::domain::user::accounts::AccountService;
use identity_service::domain::user::service::AuthenticationService;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;
use identity_service::outbound::email::smtp::SmtpMailer;
use identity_service::outbound::repositories::user::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        smtp_host = %config.smtp.host,
        verify_base_url = %config.app.verify_base_url,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_service = Arc::new(TokenService::new(
        TokenCodec::new(config.token.secret.as_bytes()),
        Duration::minutes(config.token.access_ttl_minutes),
        Duration::hours(config.token.verification_ttl_hours),
    ));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let mailer = Arc::new(SmtpMailer::new(
        &config.smtp,
        config.app.verify_base_url.clone(),
    )?);

    let auth_service = Arc::new(AuthenticationService::new(
        Arc::clone(&user_repository),
        mailer,
        Arc::clone(&token_service),
    ));
    let account_service = Arc::new(AccountService::new(
        Arc::clone(&user_repository),
        Arc::clone(&token_service),
    ));

    let state = AppState {
        auth_service,
        account_service,
        token_service,
        user_repository,
        cookie_secure: config.app.cookie_secure,
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(state)).await?;

    Ok(())
}
