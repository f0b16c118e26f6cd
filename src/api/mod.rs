pub mod auth;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use crate::remote::{CatalogOperations, ControllerClientFactory, ControllerOperations};
use crate::store::ServiceInstanceRegistry;

/// Shared collaborators handed to every request handler. User-scoped
/// controller clients are built per request from the factory; the
/// privileged client carries the service's own credentials.
pub struct AppContext {
    pub clients: Arc<dyn ControllerClientFactory>,
    pub privileged: Arc<dyn ControllerOperations>,
    pub catalog: Arc<dyn CatalogOperations>,
    pub registry: Arc<ServiceInstanceRegistry>,
}
