//! Service-instance operations: listing with bound-app and metadata
//! enrichment, the name-uniqueness guard around creation, and delete
//! with sidecar cleanup.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::Error;
use crate::logic::join;
use crate::model::{
    CreatedServiceInstance, ExtendedSummary, InstanceMetadata, NewServiceInstance,
    OfferingSummary, ServiceInstanceView, UserContext,
};
use crate::remote::ControllerOperations;
use crate::store::ServiceInstanceRegistry;

pub struct InstancesService {
    controller: Arc<dyn ControllerOperations>,
    registry: Arc<ServiceInstanceRegistry>,
}

impl InstancesService {
    pub fn new(
        controller: Arc<dyn ControllerOperations>,
        registry: Arc<ServiceInstanceRegistry>,
    ) -> Self {
        Self {
            controller,
            registry,
        }
    }

    /// Instances in a space, optionally narrowed to one offering, with
    /// bound apps joined in and creator metadata attached.
    pub async fn list(
        &self,
        space: Uuid,
        offering: Option<Uuid>,
    ) -> Result<Vec<ServiceInstanceView>, Error> {
        let summary = self.controller.space_summary(space).await?;
        let mut views = join::instances_with_bound_apps(&summary, offering);
        self.enrich(&mut views).await;
        Ok(views)
    }

    /// Reject the requested name if any instance in the space already
    /// carries it. Check-then-act: a concurrent creator can still race
    /// past this; the backing controller enforces nothing.
    pub async fn check_name_free(&self, space: Uuid, name: &str) -> Result<(), Error> {
        let summary = self.controller.space_summary(space).await?;
        let taken = summary
            .service_instances
            .iter()
            .any(|instance| instance.name == name);
        if taken {
            return Err(Error::Conflict(format!(
                "provided name {name} is already in use by another instance"
            )));
        }
        Ok(())
    }

    /// Create an instance and record its creator in the sidecar. The
    /// sidecar write happens only once the controller has confirmed an
    /// identifier; a confirmation without one fails loudly.
    pub async fn create(
        &self,
        instance: &NewServiceInstance,
        user: &UserContext,
    ) -> Result<CreatedServiceInstance, Error> {
        self.check_name_free(instance.space_guid, &instance.name).await?;

        let created = self.controller.create_service_instance(instance).await?;
        let guid = created.guid.ok_or_else(|| {
            Error::Invariant("controller confirmed the create without an identifier".to_string())
        })?;

        self.registry
            .add_instance_creator(
                guid,
                InstanceMetadata::new(user.user_guid, user.user_name.clone()),
            )
            .await?;
        log::info!("created service instance {guid} for {}", user.user_name);

        Ok(created)
    }

    /// Delete an instance and drop its sidecar record. The record is
    /// removed right after the delete request returns, whether or not
    /// the controller accepted it.
    pub async fn delete(&self, instance: Uuid) -> Result<(), Error> {
        let deletion = self.controller.delete_service_instance(instance).await;
        self.registry.delete_instance_creator(instance).await?;
        Ok(deletion?)
    }

    /// Attach creator metadata where the sidecar has it. Absence is
    /// normal, and a sidecar read failure only logs — this is the one
    /// place an upstream error is deliberately swallowed.
    pub async fn enrich(&self, instances: &mut [ServiceInstanceView]) {
        for instance in instances {
            match self.registry.instance_creator(instance.guid).await {
                Ok(metadata) => instance.metadata = metadata,
                Err(err) => {
                    log::warn!("metadata lookup for {} failed: {err:#}", instance.guid)
                }
            }
        }
    }

    /// Offerings of a space with their provisioned instances,
    /// optionally including each instance's service keys.
    pub async fn offering_summaries(
        &self,
        space: Uuid,
        fetch_keys: bool,
    ) -> Result<Vec<OfferingSummary>, Error> {
        let summary = self.controller.space_summary(space).await?;
        let mut instances = join::plan_resolved_instances(&summary);

        if fetch_keys {
            let keys = self.controller.service_keys().await?;
            join::merge_service_keys(&mut instances, keys);
        }

        let offerings = self.controller.offerings().await?;
        Ok(join::offerings_with_instances(offerings, instances))
    }

    /// Space summary with creator metadata injected into every
    /// plan-resolved instance.
    pub async fn extended_summary(&self, space: Uuid) -> Result<ExtendedSummary, Error> {
        let summary = self.controller.space_summary(space).await?;
        let mut instances = join::plan_resolved_instances(&summary);
        self.enrich(&mut instances).await;

        Ok(ExtendedSummary {
            service_instances: instances,
            apps: summary.apps,
        })
    }
}
