use anyhow::Context;
use runnerbee::{
    config::{
        session::create_session_store, validate_production_config, ServerConfig, SessionConfig,
    },
    db,
    routes::build_router,
    services, AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "runnerbee=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    validate_production_config();

    let pool = db::create_pool().await.context("opening database")?;
    db::run_migrations(&pool).await.context("running migrations")?;

    let session_store = create_session_store(pool.clone())
        .await
        .context("creating session store")?;
    let session_layer = SessionConfig::from_env().create_layer(session_store);

    let email_service = services::create_email_service();
    tracing::info!(provider = email_service.provider_name(), "Email provider selected");

    let addr = config.socket_addr()?;
    let app_state = AppState::new(pool, config, email_service);
    let app = build_router(app_state, session_layer);

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
