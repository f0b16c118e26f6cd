pub mod http;
pub mod traits;

pub use http::{HttpCatalogClient, HttpControllerClient, HttpControllerClientFactory};
pub use traits::{CatalogOperations, ControllerClientFactory, ControllerOperations};
