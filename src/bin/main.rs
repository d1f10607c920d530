use std::sync::Arc;

use jornalista360::{
    core::{
        db::{close_pool, init_pool},
        upload::CloudinaryGateway,
    },
    init_openapi_route,
    settings::get_config,
    AppState,
};
use poem::listener::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config();

    // Logging to File
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Logging to Console
    // tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    tracing::info!(
        "run with env={} prefix={:?} enforce_project_ownership={}",
        config.env,
        config.prefix,
        config.enforce_project_ownership
    );

    // Init Database Connection
    tracing::info!("Init Postgres connection");
    let pool = init_pool(&config).await?;
    // Init Redis Connection
    tracing::info!("Init Redis connection");
    let client = redis::Client::open(config.redis_url.clone())?;
    let redis_pool = r2d2::Pool::builder().build(client)?;
    // Init upload gateway
    let upload_gateway = Arc::new(CloudinaryGateway::new(&config)?);
    // Init App State
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
        config: config.clone(),
        upload_gateway,
    });

    let app = init_openapi_route(app_state.clone());
    tracing::info!("run server on {}:{}", config.host, config.port);
    poem::Server::new(TcpListener::bind(format!(
        "{}:{}",
        config.host, config.port
    )))
    .run_with_graceful_shutdown(
        app,
        async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        },
        None,
    )
    .await?;

    close_pool(&app_state.db).await;
    Ok(())
}
