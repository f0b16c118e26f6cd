use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Application lifecycle states as reported by the cloud controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppState {
    Started,
    Stopped,
    Staging,
    Restaging,
    Restarting,
}

/// Application entry from a space summary snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub guid: Uuid,
    pub name: String,
    /// Names of the service instances this app is bound to.
    #[serde(default)]
    pub service_names: Vec<String>,
    pub running_instances: i32,
    pub state: AppState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
}

/// Minimal app reference used in bound-app lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRef {
    pub guid: Uuid,
    pub name: String,
}

impl AppRef {
    pub fn new(guid: Uuid, name: impl Into<String>) -> Self {
        Self {
            guid,
            name: name.into(),
        }
    }
}

/// Detailed single-app view returned by the controller.
///
/// The running-instance count is absent while the app is staging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<Uuid>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_instances: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AppState>,
    #[serde(default)]
    pub services: Vec<crate::model::ServiceInstance>,
}

/// Requested state transition for an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppStatus {
    pub state: Option<AppState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_state_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&AppState::Restaging).unwrap(),
            "\"RESTAGING\""
        );
        let state: AppState = serde_json::from_str("\"STARTED\"").unwrap();
        assert_eq!(state, AppState::Started);
    }

    #[test]
    fn app_status_accepts_missing_state() {
        let status: AppStatus = serde_json::from_str("{\"state\": null}").unwrap();
        assert_eq!(status.state, None);
    }
}
