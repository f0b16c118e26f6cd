//! Marketplace catalog management: offering registration and
//! visibility, deregistration guards and the deletability rule.

use itertools::Itertools;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Error;
use crate::model::{
    Offering, OfferingDetails, OfferingRegistrationRequest, Plan, PlanGuidResponse, UserContext,
};
use crate::remote::{CatalogOperations, ControllerOperations};

const ADMIN_ROLE: &str = "console.admin";

/// Catalog and visibility manager. The privileged client runs with
/// elevated credentials and sees offerings before any visibility has
/// been granted; the user client is scoped to the caller's token.
pub struct CatalogService {
    controller: Arc<dyn ControllerOperations>,
    privileged: Arc<dyn ControllerOperations>,
    catalog: Arc<dyn CatalogOperations>,
}

impl CatalogService {
    pub fn new(
        controller: Arc<dyn ControllerOperations>,
        privileged: Arc<dyn ControllerOperations>,
        catalog: Arc<dyn CatalogOperations>,
    ) -> Self {
        Self {
            controller,
            privileged,
            catalog,
        }
    }

    /// Register an offering and expose each of its plans to the
    /// requesting organization. The caller must be a member of that
    /// organization. Returns the offering as resolved through the
    /// privileged view (absent when the label has not become visible
    /// yet).
    pub async fn register_offering(
        &self,
        request: &OfferingRegistrationRequest,
    ) -> Result<Option<Offering>, Error> {
        let organization = request.organization_guid.ok_or_else(|| {
            Error::BadRequest("registration request is missing an organization".to_string())
        })?;

        let member = self
            .controller
            .organizations()
            .await?
            .iter()
            .any(|org| org.guid == organization);
        if !member {
            return Err(Error::Forbidden(format!(
                "permission denied to access organization: {organization}"
            )));
        }

        self.catalog.register(request).await?;

        let offering = self
            .privileged
            .offerings()
            .await?
            .into_iter()
            .find(|offering| offering.label == request.name);

        if let Some(offering) = &offering {
            for plan in self.privileged.offering_plans(offering.guid).await? {
                log::info!(
                    "granting visibility of plan {} to organization {organization}",
                    plan.guid
                );
                self.privileged
                    .set_plan_visibility(plan.guid, organization)
                    .await?;
            }
        }

        Ok(offering)
    }

    /// Deregister an offering from the marketplace. The last remaining
    /// offering is protected, and the caller must pass the
    /// deletability check.
    pub async fn deregister_offering(
        &self,
        offering: Uuid,
        user: &UserContext,
    ) -> Result<(), Error> {
        let listing = self.catalog.catalog().await?;
        if listing.services.len() < 2 {
            return Err(Error::Forbidden(
                "catalog is empty or has only one offering left".to_string(),
            ));
        }

        let resolved = self.controller.offering(offering).await?;
        if !self.can_delete(resolved.guid, user).await? {
            return Err(Error::Forbidden(
                "user is not authorized to delete this offering".to_string(),
            ));
        }

        for entry in &listing.services {
            let matches = match (&entry.id, &resolved.unique_id) {
                (Some(id), Some(unique_id)) => id.to_string() == *unique_id,
                _ => false,
            };
            if matches {
                let unique_id = resolved.unique_id.as_deref().unwrap_or_default();
                log::info!("deregistering offering {unique_id}");
                self.catalog.deregister(unique_id).await?;
            }
        }

        Ok(())
    }

    /// An offering is deletable without elevated privilege when none
    /// of its plans is public and its visibility is scoped to at most
    /// one organization; otherwise the admin role is required. A
    /// missing role yields `false`, not an error.
    pub async fn can_delete(&self, offering: Uuid, user: &UserContext) -> Result<bool, Error> {
        let is_public = self
            .privileged
            .offering_plans(offering)
            .await?
            .iter()
            .any(|plan| plan.public);

        // Visibility records are queried by the offering identifier,
        // mirroring the upstream API's filter key.
        let in_another_org = self
            .privileged
            .plan_visibilities(offering)
            .await?
            .iter()
            .map(|visibility| visibility.organization_guid)
            .unique()
            .count()
            > 1;

        if !is_public && !in_another_org {
            return Ok(true);
        }

        Ok(user.has_role(ADMIN_ROLE))
    }

    /// Offering detail with the deletability flag. Offerings that are
    /// not catalog-registered report `can_delete = false`.
    pub async fn offering_details(
        &self,
        offering: Uuid,
        user: &UserContext,
    ) -> Result<OfferingDetails, Error> {
        let resolved = self.controller.offering(offering).await?;

        let registered = self.catalog.catalog().await?.services.iter().any(|entry| {
            match (&entry.id, &resolved.unique_id) {
                (Some(id), Some(unique_id)) => id.to_string() == *unique_id,
                _ => false,
            }
        });

        let can_delete = if registered {
            self.can_delete(resolved.guid, user).await?
        } else {
            false
        };

        Ok(OfferingDetails {
            offering: resolved,
            can_delete,
        })
    }

    /// Live offerings that were cloned from the given application:
    /// catalog entries whose originating app matches, resolved by
    /// label through the controller.
    pub async fn cloned_offerings(&self, app: Uuid) -> Result<Vec<Offering>, Error> {
        let listing = self.catalog.catalog().await?;

        let mut result = Vec::new();
        for entry in &listing.services {
            if entry.app.as_ref().map(|a| a.guid) != Some(app) {
                continue;
            }
            let offering = self
                .controller
                .offerings_by_label(&entry.name)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    Error::Invariant(format!(
                        "registered offering {} is not visible in the marketplace",
                        entry.name
                    ))
                })?;
            result.push(offering);
        }
        Ok(result)
    }

    /// Plan identifier lookup by offering label and plan name. The
    /// guid stays null when either does not resolve.
    pub async fn plan_guid(&self, label: &str, plan: &str) -> Result<PlanGuidResponse, Error> {
        let offering = self
            .controller
            .offerings()
            .await?
            .into_iter()
            .find(|offering| offering.label == label);
        let Some(offering) = offering else {
            return Ok(PlanGuidResponse::default());
        };

        let guid = self
            .controller
            .offering_plans(offering.guid)
            .await?
            .into_iter()
            .find(|candidate| candidate.name == plan)
            .map(|candidate| candidate.guid);
        Ok(PlanGuidResponse { guid })
    }

    /// Plans of the labeled offering; empty when the label is unknown.
    pub async fn plans_by_label(&self, label: &str) -> Result<Vec<Plan>, Error> {
        let offering = self
            .controller
            .offerings()
            .await?
            .into_iter()
            .find(|offering| offering.label == label);

        match offering {
            Some(offering) => Ok(self.controller.offering_plans(offering.guid).await?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn space_offerings(&self, space: Uuid) -> Result<Vec<Offering>, Error> {
        Ok(self.controller.space_offerings(space).await?)
    }
}
