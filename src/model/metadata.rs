use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Out-of-band creator record kept in the sidecar store, keyed by
/// service-instance identifier. Lives independently of the
/// controller's instance record and may diverge from it when either
/// side fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceMetadata {
    pub creator_guid: Uuid,
    pub creator_name: String,
}

impl InstanceMetadata {
    pub fn new(creator_guid: Uuid, creator_name: impl Into<String>) -> Self {
        Self {
            creator_guid,
            creator_name: creator_name.into(),
        }
    }
}
