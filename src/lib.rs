pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod remote;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;
pub use api::AppContext;

// Export the logic services
pub use logic::{
    ApplicationsService, CatalogService, InstancesService, ScoringEngineService, StepTrace,
};

// Export all model types
pub use model::*;

// Export collaborator interfaces and implementations
pub use error::Error;
pub use remote::{
    CatalogOperations, ControllerClientFactory, ControllerOperations, HttpCatalogClient,
    HttpControllerClient, HttpControllerClientFactory,
};
pub use store::{FileStore, KeyValueStore, ServiceInstanceRegistry};

use std::path::PathBuf;
use std::sync::Arc;

/// Assemble the shared collaborators from configuration.
pub fn build_context(config: &crate::config::AppConfig) -> anyhow::Result<Arc<AppContext>> {
    let http = reqwest::Client::new();

    let clients = Arc::new(HttpControllerClientFactory::new(
        http.clone(),
        config.controller.api_url.clone(),
    ));
    let privileged = Arc::new(HttpControllerClient::new(
        http.clone(),
        config.controller.api_url.clone(),
        config.controller.privileged_token.clone().unwrap_or_default(),
    ));
    let catalog = Arc::new(HttpCatalogClient::new(http, config.catalog.api_url.clone()));

    let store = FileStore::open(config.storage.metadata_path.clone().map(PathBuf::from))?;
    let registry = Arc::new(ServiceInstanceRegistry::new(Arc::new(store)));

    Ok(Arc::new(AppContext {
        clients,
        privileged,
        catalog,
        registry,
    }))
}

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    use axum::serve;
    use tokio::net::TcpListener;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with INFO level only (suppress DEBUG logs)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    // Load configuration
    let config = crate::config::AppConfig::load()?;
    let context = build_context(&config)?;

    // Create router with state
    let app = crate::api::routes::create_router().with_state(context);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;

    serve(listener, app).await?;

    Ok(())
}
