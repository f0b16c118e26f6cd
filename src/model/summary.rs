use serde::{Deserialize, Serialize};

use crate::model::{App, ServiceInstance, ServiceInstanceView};

/// Flat point-in-time snapshot of one space, as returned by the
/// controller. Sole input of the summary join; never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceSummary {
    #[serde(default)]
    pub apps: Vec<App>,
    #[serde(rename = "services", default)]
    pub service_instances: Vec<ServiceInstance>,
}

/// Space summary with sidecar metadata injected into each instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedSummary {
    pub service_instances: Vec<ServiceInstanceView>,
    pub apps: Vec<App>,
}
