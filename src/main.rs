// src/main.rs
use anyhow::{Context, Result};
use churn_lib::audit::AuditSink;
use churn_lib::config::{load_env, ServiceConfig};
use churn_lib::model::ModelArtifact;
use churn_lib::routes::build_router;
use churn_lib::service::ServiceContext;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting churn inference service");
    load_env();

    let config = ServiceConfig::from_env();
    config.log_config();

    let artifact = ModelArtifact::load(Path::new(&config.model_path))
        .context("Failed to load model artifact; run train_churn_model first")?;

    let audit = AuditSink::spawn(PathBuf::from(&config.predictions_log_path));
    let context = Arc::new(ServiceContext::new(
        artifact,
        config.drift_threshold,
        PathBuf::from(&config.predictions_log_path),
        Some(audit),
    ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = build_router(context).layer(cors);

    let addr = config.bind_addr();
    info!(
        "churn_server v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
