use std::sync::Arc;

use anyhow::Context;
use aws_config::BehaviorVersion;
use learn_service::{
    app,
    config::{AppState, EnvVars},
    photos::S3Photos,
};
use store::db::{self, MongoStore};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        // Log to stdout
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(sentry::integrations::tracing::layer())
        .init();

    info!("Starting server...");
    let env_vars = EnvVars::new();

    let _guard = env_vars.sentry_dsn.clone().map(|sentry_dsn| {
        info!("initializing Sentry");
        // NOTE: Events are only emitted, once the guard goes out of scope.
        sentry::init((
            sentry_dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(env_vars.environment.to_string().into()),
                traces_sample_rate: 1.0,
                ..Default::default()
            },
        ))
    });

    let client = db::client(&env_vars.mongodb_uri, env!("CARGO_PKG_NAME"))
        .await
        .context("Could not connect to MongoDB")?;
    let mongo_store = MongoStore::new(&client).context("Could not open collections")?;
    mongo_store
        .ensure_indexes()
        .await
        .context("Could not create indexes")?;

    let aws = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let photos = S3Photos::new(aws_sdk_s3::Client::new(&aws), env_vars.bucket_name.clone());

    let port = env_vars.port;
    let app_state = AppState::new(Arc::new(mongo_store), Arc::new(photos), env_vars);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .with_context(|| format!("Could not bind port {port}"))?;
    info!("Listening on port {port}");
    let server = axum::serve(listener, app(app_state)).with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!("Server error: {}", err);
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
