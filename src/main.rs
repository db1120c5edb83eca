use std::path::Path;

use smartwellness::{app, catalog, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "smartwellness=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    // Rebuild the catalog from the bundled CSV on every start. A failure
    // leaves catalog browsing unavailable for this session but keeps the
    // rest of the service up.
    let csv_path = state.config.catalog_csv.clone();
    if let Err(e) = catalog::importer::import_catalog(&state.db, Path::new(&csv_path)).await {
        tracing::error!(error = %e, "catalog import failed; catalog unavailable this session");
    }

    let app = app::build_app(state);
    app::serve(app).await
}
