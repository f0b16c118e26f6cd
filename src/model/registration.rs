use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Originating application of a registered offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredApp {
    pub guid: Uuid,
}

/// Registration record for a marketplace offering.
///
/// Doubles as the catalog's stored entry; `id` is assigned by the
/// catalog registration API and matches the controller-side
/// `unique_id` of the resulting offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferingRegistrationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<RegisteredApp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_guid: Option<Uuid>,
}

/// Catalog held by the registration API: an ordered list of
/// registration records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub services: Vec<OfferingRegistrationRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_deserializes_from_empty_object() {
        let catalog: Catalog = serde_json::from_str("{}").unwrap();
        assert!(catalog.services.is_empty());
    }

    #[test]
    fn registration_round_trips() {
        let request = OfferingRegistrationRequest {
            id: Some(Uuid::new_v4()),
            name: "cloned-app".to_string(),
            description: Some("offering made from an app".to_string()),
            tags: vec!["clone".to_string()],
            app: Some(RegisteredApp {
                guid: Uuid::new_v4(),
            }),
            organization_guid: Some(Uuid::new_v4()),
        };

        let json = serde_json::to_string(&request).unwrap();
        let parsed: OfferingRegistrationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, request);
    }
}
