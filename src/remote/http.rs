use anyhow::Result;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::UpstreamFailure;
use crate::model::{
    AppStatus, AppSummary, Catalog, CreatedServiceInstance, NewServiceBinding, NewServiceInstance,
    NewServiceKey, Offering, OfferingRegistrationRequest, Organization, Plan, PlanVisibility,
    ServiceBinding, ServiceKey, SpaceSummary,
};
use crate::remote::traits::{
    CatalogOperations, ControllerClientFactory, ControllerOperations,
};

/// Resource envelope used by the controller's list/detail endpoints.
#[derive(Debug, Deserialize)]
struct Resource<E> {
    metadata: ResourceMetadata,
    entity: E,
}

#[derive(Debug, Deserialize)]
struct ResourceMetadata {
    guid: Uuid,
}

#[derive(Debug, Deserialize)]
struct ResourceList<E> {
    #[serde(default = "Vec::new")]
    resources: Vec<Resource<E>>,
}

/// Create responses may arrive without an envelope when the controller
/// output is malformed; keep everything optional and let the caller
/// enforce its invariants.
#[derive(Debug, Deserialize)]
struct CreatedResource<E> {
    metadata: Option<ResourceMetadata>,
    entity: Option<E>,
}

#[derive(Debug, Deserialize)]
struct OfferingEntity {
    label: String,
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    unique_id: Option<String>,
    active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PlanEntity {
    name: String,
    #[serde(default)]
    public: bool,
    free: Option<bool>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VisibilityEntity {
    service_plan_guid: Uuid,
    organization_guid: Uuid,
}

#[derive(Debug, Deserialize)]
struct OrganizationEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BindingEntity {
    app_guid: Uuid,
    service_instance_guid: Uuid,
}

#[derive(Debug, Deserialize)]
struct KeyEntity {
    name: String,
    #[serde(default)]
    credentials: Value,
    service_instance_guid: Uuid,
}

#[derive(Debug, Deserialize)]
struct InstanceEntity {
    name: Option<String>,
    dashboard_url: Option<String>,
    service_plan_guid: Option<Uuid>,
}

fn offering_from(resource: Resource<OfferingEntity>) -> Offering {
    Offering {
        guid: resource.metadata.guid,
        label: resource.entity.label,
        description: resource.entity.description,
        tags: resource.entity.tags,
        unique_id: resource.entity.unique_id,
        active: resource.entity.active,
    }
}

fn plan_from(resource: Resource<PlanEntity>) -> Plan {
    Plan {
        guid: resource.metadata.guid,
        name: resource.entity.name,
        public: resource.entity.public,
        free: resource.entity.free,
        description: resource.entity.description,
    }
}

fn binding_from(resource: Resource<BindingEntity>) -> ServiceBinding {
    ServiceBinding {
        guid: resource.metadata.guid,
        app_guid: resource.entity.app_guid,
        service_instance_guid: resource.entity.service_instance_guid,
    }
}

fn key_from(resource: Resource<KeyEntity>) -> ServiceKey {
    ServiceKey {
        guid: resource.metadata.guid,
        name: resource.entity.name,
        credentials: resource.entity.credentials,
        service_instance_guid: resource.entity.service_instance_guid,
    }
}

/// Turn a non-success controller response into an `UpstreamFailure`,
/// extracting the human-readable `description` from the JSON error
/// body when one is present.
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let description = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| value.get("description").and_then(Value::as_str).map(String::from));
    let message = description.unwrap_or_else(|| {
        if body.is_empty() {
            format!("upstream request failed with status {status}")
        } else {
            body
        }
    });

    Err(anyhow::Error::new(UpstreamFailure {
        status: Some(status.as_u16()),
        message,
    }))
}

fn transport(err: reqwest::Error) -> anyhow::Error {
    anyhow::Error::new(UpstreamFailure::from(err))
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = check(request.send().await.map_err(transport)?).await?;
    response.json().await.map_err(transport)
}

async fn send_unit(request: RequestBuilder) -> Result<()> {
    check(request.send().await.map_err(transport)?).await?;
    Ok(())
}

/// Controller client bound to one caller's token.
pub struct HttpControllerClient {
    http: Client,
    base_url: String,
    token: String,
}

impl HttpControllerClient {
    pub fn new(http: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        send_json(self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        send_json(self.request(Method::POST, path).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        send_unit(self.request(Method::DELETE, path)).await
    }
}

#[async_trait::async_trait]
impl ControllerOperations for HttpControllerClient {
    async fn space_summary(&self, space: Uuid) -> Result<SpaceSummary> {
        self.get(&format!("/v2/spaces/{space}/summary")).await
    }

    async fn app_summary(&self, app: Uuid) -> Result<AppSummary> {
        self.get(&format!("/v2/apps/{app}/summary")).await
    }

    async fn restage_app(&self, app: Uuid) -> Result<()> {
        send_unit(self.request(Method::POST, &format!("/v2/apps/{app}/restage"))).await
    }

    async fn switch_app(&self, app: Uuid, status: &AppStatus) -> Result<()> {
        send_unit(
            self.request(Method::PUT, &format!("/v2/apps/{app}"))
                .json(status),
        )
        .await
    }

    async fn delete_app(&self, app: Uuid) -> Result<()> {
        self.delete(&format!("/v2/apps/{app}")).await
    }

    async fn create_service_instance(
        &self,
        instance: &NewServiceInstance,
    ) -> Result<CreatedServiceInstance> {
        let created: CreatedResource<InstanceEntity> = self
            .post("/v2/service_instances?accepts_incomplete=true", instance)
            .await?;
        let entity = created.entity;
        Ok(CreatedServiceInstance {
            guid: created.metadata.map(|m| m.guid),
            name: entity.as_ref().and_then(|e| e.name.clone()),
            dashboard_url: entity.as_ref().and_then(|e| e.dashboard_url.clone()),
            service_plan_guid: entity.as_ref().and_then(|e| e.service_plan_guid),
        })
    }

    async fn delete_service_instance(&self, instance: Uuid) -> Result<()> {
        self.delete(&format!("/v2/service_instances/{instance}")).await
    }

    async fn app_bindings(
        &self,
        app: Uuid,
        instance: Option<Uuid>,
    ) -> Result<Vec<ServiceBinding>> {
        let path = match instance {
            Some(guid) => {
                format!("/v2/apps/{app}/service_bindings?q=service_instance_guid:{guid}")
            }
            None => format!("/v2/apps/{app}/service_bindings"),
        };
        let list: ResourceList<BindingEntity> = self.get(&path).await?;
        Ok(list.resources.into_iter().map(binding_from).collect())
    }

    async fn create_service_binding(
        &self,
        binding: &NewServiceBinding,
    ) -> Result<ServiceBinding> {
        let created: Resource<BindingEntity> =
            self.post("/v2/service_bindings", binding).await?;
        Ok(binding_from(created))
    }

    async fn delete_service_binding(&self, binding: Uuid) -> Result<()> {
        self.delete(&format!("/v2/service_bindings/{binding}")).await
    }

    async fn service_keys(&self) -> Result<Vec<ServiceKey>> {
        let list: ResourceList<KeyEntity> = self.get("/v2/service_keys").await?;
        Ok(list.resources.into_iter().map(key_from).collect())
    }

    async fn create_service_key(&self, key: &NewServiceKey) -> Result<ServiceKey> {
        let created: Resource<KeyEntity> = self.post("/v2/service_keys", key).await?;
        Ok(key_from(created))
    }

    async fn delete_service_key(&self, key: Uuid) -> Result<()> {
        self.delete(&format!("/v2/service_keys/{key}")).await
    }

    async fn offerings(&self) -> Result<Vec<Offering>> {
        let list: ResourceList<OfferingEntity> = self.get("/v2/services").await?;
        Ok(list.resources.into_iter().map(offering_from).collect())
    }

    async fn offerings_by_label(&self, label: &str) -> Result<Vec<Offering>> {
        let list: ResourceList<OfferingEntity> =
            self.get(&format!("/v2/services?q=label:{label}")).await?;
        Ok(list.resources.into_iter().map(offering_from).collect())
    }

    async fn offering(&self, offering: Uuid) -> Result<Offering> {
        let resource: Resource<OfferingEntity> =
            self.get(&format!("/v2/services/{offering}")).await?;
        Ok(offering_from(resource))
    }

    async fn space_offerings(&self, space: Uuid) -> Result<Vec<Offering>> {
        let list: ResourceList<OfferingEntity> =
            self.get(&format!("/v2/spaces/{space}/services")).await?;
        Ok(list.resources.into_iter().map(offering_from).collect())
    }

    async fn offering_plans(&self, offering: Uuid) -> Result<Vec<Plan>> {
        let list: ResourceList<PlanEntity> = self
            .get(&format!("/v2/services/{offering}/service_plans"))
            .await?;
        Ok(list.resources.into_iter().map(plan_from).collect())
    }

    async fn plan_visibilities(&self, plan: Uuid) -> Result<Vec<PlanVisibility>> {
        let list: ResourceList<VisibilityEntity> = self
            .get(&format!(
                "/v2/service_plan_visibilities?q=service_plan_guid:{plan}"
            ))
            .await?;
        Ok(list
            .resources
            .into_iter()
            .map(|resource| PlanVisibility {
                guid: resource.metadata.guid,
                service_plan_guid: resource.entity.service_plan_guid,
                organization_guid: resource.entity.organization_guid,
            })
            .collect())
    }

    async fn set_plan_visibility(&self, plan: Uuid, organization: Uuid) -> Result<()> {
        send_unit(
            self.request(Method::POST, "/v2/service_plan_visibilities")
                .json(&serde_json::json!({
                    "service_plan_guid": plan,
                    "organization_guid": organization,
                })),
        )
        .await
    }

    async fn organizations(&self) -> Result<Vec<Organization>> {
        let list: ResourceList<OrganizationEntity> = self.get("/v2/organizations").await?;
        Ok(list
            .resources
            .into_iter()
            .map(|resource| Organization {
                guid: resource.metadata.guid,
                name: resource.entity.name,
            })
            .collect())
    }
}

/// Produces per-request controller clients from forwarded tokens.
pub struct HttpControllerClientFactory {
    http: Client,
    base_url: String,
}

impl HttpControllerClientFactory {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl ControllerClientFactory for HttpControllerClientFactory {
    fn user_client(&self, token: &str) -> Arc<dyn ControllerOperations> {
        Arc::new(HttpControllerClient::new(
            self.http.clone(),
            self.base_url.clone(),
            token,
        ))
    }
}

/// Catalog registration client.
pub struct HttpCatalogClient {
    http: Client,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl CatalogOperations for HttpCatalogClient {
    async fn catalog(&self) -> Result<Catalog> {
        send_json(self.http.get(self.url("/v2/catalog"))).await
    }

    async fn register(&self, request: &OfferingRegistrationRequest) -> Result<()> {
        send_unit(self.http.post(self.url("/v2/catalog")).json(request)).await
    }

    async fn deregister(&self, unique_id: &str) -> Result<()> {
        send_unit(self.http.delete(self.url(&format!("/v2/catalog/{unique_id}")))).await
    }
}

impl From<reqwest::Error> for UpstreamFailure {
    fn from(err: reqwest::Error) -> Self {
        UpstreamFailure {
            status: err.status().map(|status| status.as_u16()),
            message: err.to_string(),
        }
    }
}
