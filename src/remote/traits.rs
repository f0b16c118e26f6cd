use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use crate::model::{
    AppStatus, AppSummary, Catalog, CreatedServiceInstance, NewServiceBinding, NewServiceInstance,
    NewServiceKey, Offering, OfferingRegistrationRequest, Organization, Plan, PlanVisibility,
    ServiceBinding, ServiceKey, SpaceSummary,
};

/// Remote control-plane interface. One logical dependency; every call
/// is a blocking step from the caller's perspective — a workflow does
/// not proceed until the previous call's result is available.
#[async_trait::async_trait]
pub trait ControllerOperations: Send + Sync {
    async fn space_summary(&self, space: Uuid) -> Result<SpaceSummary>;

    async fn app_summary(&self, app: Uuid) -> Result<AppSummary>;
    async fn restage_app(&self, app: Uuid) -> Result<()>;
    async fn switch_app(&self, app: Uuid, status: &AppStatus) -> Result<()>;
    async fn delete_app(&self, app: Uuid) -> Result<()>;

    async fn create_service_instance(
        &self,
        instance: &NewServiceInstance,
    ) -> Result<CreatedServiceInstance>;
    async fn delete_service_instance(&self, instance: Uuid) -> Result<()>;

    /// Bindings of an app, optionally narrowed to one service instance.
    async fn app_bindings(&self, app: Uuid, instance: Option<Uuid>)
        -> Result<Vec<ServiceBinding>>;
    async fn create_service_binding(&self, binding: &NewServiceBinding)
        -> Result<ServiceBinding>;
    async fn delete_service_binding(&self, binding: Uuid) -> Result<()>;

    async fn service_keys(&self) -> Result<Vec<ServiceKey>>;
    async fn create_service_key(&self, key: &NewServiceKey) -> Result<ServiceKey>;
    async fn delete_service_key(&self, key: Uuid) -> Result<()>;

    async fn offerings(&self) -> Result<Vec<Offering>>;
    async fn offerings_by_label(&self, label: &str) -> Result<Vec<Offering>>;
    async fn offering(&self, offering: Uuid) -> Result<Offering>;
    async fn space_offerings(&self, space: Uuid) -> Result<Vec<Offering>>;
    async fn offering_plans(&self, offering: Uuid) -> Result<Vec<Plan>>;

    async fn plan_visibilities(&self, plan: Uuid) -> Result<Vec<PlanVisibility>>;
    async fn set_plan_visibility(&self, plan: Uuid, organization: Uuid) -> Result<()>;
    async fn organizations(&self) -> Result<Vec<Organization>>;
}

/// Marketplace registration API.
#[async_trait::async_trait]
pub trait CatalogOperations: Send + Sync {
    async fn catalog(&self) -> Result<Catalog>;
    async fn register(&self, request: &OfferingRegistrationRequest) -> Result<()>;
    async fn deregister(&self, unique_id: &str) -> Result<()>;
}

/// Builds a controller client scoped to one caller's token. Clients are
/// constructed per request and injected into the logic services; there
/// is no shared ambient client.
pub trait ControllerClientFactory: Send + Sync {
    fn user_client(&self, token: &str) -> Arc<dyn ControllerOperations>;
}
