use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use crate::model::InstanceMetadata;
use crate::store::traits::KeyValueStore;

/// Typed façade over the sidecar store, keyed by service-instance
/// identifier.
pub struct ServiceInstanceRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl ServiceInstanceRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn add_instance_creator(
        &self,
        instance: Uuid,
        metadata: InstanceMetadata,
    ) -> Result<()> {
        self.store
            .put(&instance.to_string(), serde_json::to_value(metadata)?)
            .await
    }

    pub async fn delete_instance_creator(&self, instance: Uuid) -> Result<()> {
        self.store.remove(&instance.to_string()).await
    }

    pub async fn instance_creator(&self, instance: Uuid) -> Result<Option<InstanceMetadata>> {
        match self.store.get(&instance.to_string()).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
