mod api;
mod middleware;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;
use wearwell_model::{ModelPaths, PredictionPipeline};
use wearwell_store::CatalogStore;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = wearwell_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = CatalogStore::load_from_path(&config.dataset_path)?;

    let pipeline = PredictionPipeline::new(ModelPaths {
        embeddings: config.embedding_path(),
        classifier: config.classifier_path(),
        vectorizer: config.vectorizer_path(),
    });
    let status = pipeline.artifact_status();
    tracing::info!(
        fasttext = status.fasttext,
        classifier = status.classifier,
        tfidf_vectorizer = status.tfidf_vectorizer,
        "model artifacts located"
    );

    let app = build_app(AppState {
        store: Arc::new(RwLock::new(store)),
        pipeline: Arc::new(pipeline),
    });

    tracing::info!(addr = %config.bind_addr, env = %config.env, "listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
