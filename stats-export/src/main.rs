use std::time::Duration;

use stats_export::{config::EnvVars, db::export_student_stats};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(sentry::integrations::tracing::layer())
        .with(EnvFilter::from_default_env())
        .init();
    tracing::info!("Starting student stats export...");

    let env_vars = EnvVars::new();

    let _guard = if let Some(sentry_dsn) = env_vars.sentry_dsn.clone() {
        tracing::info!("initializing Sentry");
        // NOTE: Events are only emitted, once the guard goes out of scope.
        Some(sentry::init((
            sentry_dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(env_vars.environment.to_string().into()),
                traces_sample_rate: 1.0,
                ..Default::default()
            },
        )))
    } else {
        None
    };

    let export = export_student_stats(&env_vars);
    let result = match env_vars.timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), export).await {
            Ok(result) => result,
            Err(_elapsed) => {
                tracing::error!("Export did not finish within {secs}s");
                return;
            }
        },
        None => export.await,
    };

    match result {
        Ok(summary) => tracing::info!(
            read = summary.progress_read,
            written = summary.rows_written,
            skipped = summary.skipped,
            "Successfully exported student stats"
        ),
        Err(e) => tracing::error!("Error exporting student stats: {:?}", e),
    }
}
