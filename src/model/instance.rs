use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::model::{AppRef, InstanceMetadata};

/// Reference to the offering a plan belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferingRef {
    pub guid: Uuid,
    pub label: String,
}

/// Plan reference carried by a service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePlan {
    pub guid: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<OfferingRef>,
}

/// Status of the most recent provisioning operation on an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastOperation {
    #[serde(rename = "type")]
    pub kind: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Raw service-instance row from a space summary snapshot.
///
/// `service_plan` is absent for instances of unresolved or legacy plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub guid: Uuid,
    pub name: String,
    #[serde(default)]
    pub bound_app_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_plan: Option<ServicePlan>,
    /// Owning offering identifier; used by the broker filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_guid: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<LastOperation>,
}

/// Service instance enriched with cross-referenced data.
///
/// `bound_apps` is derived from the snapshot join and is always present
/// (empty when no app references the instance); the remaining optional
/// fields are attached lazily and omitted from JSON when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstanceView {
    pub guid: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_plan: Option<ServicePlan>,
    #[serde(default)]
    pub bound_apps: Vec<AppRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_keys: Option<Vec<ServiceKey>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<LastOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InstanceMetadata>,
}

impl ServiceInstanceView {
    /// Build a view row from a snapshot instance and its bound apps.
    pub fn from_instance(instance: &ServiceInstance, bound_apps: Vec<AppRef>) -> Self {
        Self {
            guid: instance.guid,
            name: instance.name.clone(),
            service: instance.service_guid,
            service_plan: instance.service_plan.clone(),
            bound_apps,
            dashboard_url: instance.dashboard_url.clone(),
            service_keys: None,
            last_operation: instance.last_operation.clone(),
            metadata: None,
        }
    }
}

/// Provisioning request for a new service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceInstance {
    pub name: String,
    pub organization_guid: Uuid,
    pub space_guid: Uuid,
    pub service_plan_guid: Uuid,
}

/// Controller confirmation of an instance create.
///
/// The identifier may be missing when the controller response is
/// malformed; callers must treat that as a hard failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedServiceInstance {
    pub guid: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_plan_guid: Option<Uuid>,
}

/// Standalone credential set for a service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceKey {
    pub guid: Uuid,
    pub name: String,
    pub credentials: Value,
    pub service_instance_guid: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceKey {
    pub name: String,
    pub service_instance_guid: Uuid,
}

/// Link granting an app access to a service instance's credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBinding {
    pub guid: Uuid,
    pub app_guid: Uuid,
    pub service_instance_guid: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewServiceBinding {
    pub app_guid: Uuid,
    pub service_instance_guid: Uuid,
}

/// Scoring-engine provisioning request (clone-and-rebind workflow input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringEngineRequest {
    pub instance_name: String,
    pub organization_guid: Uuid,
    pub space_guid: Uuid,
    pub service_plan_guid: Uuid,
}
