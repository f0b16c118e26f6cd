use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ServiceInstanceView;

/// Marketplace offering (broker catalog entry) as seen by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    pub guid: Uuid,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// External identifier used by the catalog registration API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Service plan with visibility status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub guid: Uuid,
    pub name: String,
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Organization-scoped visibility record for a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanVisibility {
    pub guid: Uuid,
    pub service_plan_guid: Uuid,
    pub organization_guid: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub guid: Uuid,
    pub name: String,
}

/// Offering detail with the deletability flag attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferingDetails {
    #[serde(flatten)]
    pub offering: Offering,
    pub can_delete: bool,
}

/// Plan lookup result; `guid` stays null when label or plan is unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanGuidResponse {
    pub guid: Option<Uuid>,
}

/// Offering enriched with the instances provisioned from it in a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferingSummary {
    pub guid: Uuid,
    pub label: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub instances: Vec<ServiceInstanceView>,
}

impl OfferingSummary {
    pub fn new(offering: &Offering, instances: Vec<ServiceInstanceView>) -> Self {
        Self {
            guid: offering.guid,
            label: offering.label.clone(),
            tags: offering.tags.clone(),
            instances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_flatten_offering_fields() {
        let details = OfferingDetails {
            offering: Offering {
                guid: Uuid::new_v4(),
                label: "db".to_string(),
                description: None,
                tags: vec!["sql".to_string()],
                unique_id: Some("ext-1".to_string()),
                active: None,
            },
            can_delete: true,
        };

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["label"], "db");
        assert_eq!(json["can_delete"], true);
    }

    #[test]
    fn plan_guid_response_defaults_to_null() {
        let json = serde_json::to_value(PlanGuidResponse::default()).unwrap();
        assert!(json["guid"].is_null());
    }
}
