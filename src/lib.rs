pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod enrichment; // LLM refinement of predictions and allocations
pub mod escalation; // Escalation policy, staff advice, background monitor
pub mod estimation; // Wait time, allocation, queue statistics
pub mod models;
pub mod service;
pub mod triage; // Triage scoring, protocols, prioritization

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::ServiceConfig;
use crate::core_state::{CoreError, CoreState};
use crate::db::{DatabaseError, InMemoryQueueStore};
use crate::enrichment::{Enricher, EnrichmentError, LlmEnricher, OllamaClient};
use crate::escalation::EscalationPolicy;
use crate::service::QueueService;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to build async runtime: {0}")]
    Runtime(std::io::Error),

    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(std::io::Error),

    #[error(transparent)]
    Server(#[from] api::server::ServerError),

    #[error("Failed to load queue data: {0}")]
    Database(#[from] DatabaseError),

    #[error("Failed to set up enrichment: {0}")]
    Enrichment(#[from] EnrichmentError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Start the queue server and block until Ctrl-C.
pub fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ServiceConfig::from_env();

    // The blocking HTTP client must be created (and dropped) outside the runtime.
    let core = Arc::new(build_state(&config)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)?;
    let result = runtime.block_on(serve(core.clone(), &config));
    drop(runtime);
    drop(core);

    result
}

/// Assemble store, enricher and service from configuration.
pub fn build_state(config: &ServiceConfig) -> Result<CoreState, StartupError> {
    let store = if config.seed_demo {
        db::seed::demo_store(chrono::Local::now().naive_local())?
    } else {
        InMemoryQueueStore::new()
    };

    let mut service = QueueService::new(Arc::new(store)).with_policy(EscalationPolicy {
        max_priority: config.escalation_max_priority,
    });

    if config.enrichment_enabled {
        let client = OllamaClient::new(&config.ollama_host, config.enrichment_timeout.as_secs())?;
        let enricher: Arc<dyn Enricher> =
            Arc::new(LlmEnricher::new(Box::new(client), &config.enrichment_model));
        tracing::info!(
            host = %config.ollama_host,
            model = %config.enrichment_model,
            "Enrichment enabled"
        );
        service = service.with_enricher(enricher);
    }

    Ok(CoreState::new(service))
}

async fn serve(core: Arc<CoreState>, config: &ServiceConfig) -> Result<(), StartupError> {
    core.start_monitor(config.monitor_interval)?;

    let mut server = api::start_api_server(core.clone(), config.socket_addr()).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    tokio::signal::ctrl_c().await.map_err(StartupError::Signal)?;
    tracing::info!("Shutdown requested");

    server.shutdown();
    if let Some(monitor) = core.take_monitor()? {
        monitor.stop().await;
    }
    server.wait().await;
    Ok(())
}
