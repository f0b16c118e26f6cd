//! Scoring-engine provisioning: the clone-and-rebind workflow.
//!
//! A deployment pairs a server group with a scoring-engine group. Each
//! group is an application plus three companion service instances,
//! located in the space by a naming convention: every member carries
//! the group's mode tag and a shared name fragment derived from the
//! identifier of the group's anchor instance. The workflow provisions
//! the scoring-engine instance, then repoints the engine app's
//! data-store binding from its own postgres instance to the server's,
//! and restages the app.
//!
//! Steps run strictly in sequence with no retries. A failure after the
//! initial create leaves that instance (or a deleted-but-unrebound
//! binding) behind; the step trace records how far the workflow got.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::Error;
use crate::logic::StepTrace;
use crate::model::{NewServiceBinding, NewServiceInstance, ScoringEngineRequest, SpaceSummary};
use crate::remote::ControllerOperations;

const POSTGRES_PREFIX: &str = "postgresql93";
const CDH_PREFIX: &str = "cdh";
const ZOOKEEPER_PREFIX: &str = "zookeeper";

/// Role of a resource group within a deployment pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    Server,
    ScoringEngine,
}

impl GroupMode {
    /// Tag embedded in every member name of a group.
    pub fn tag(&self) -> &'static str {
        match self {
            GroupMode::Server => "atk",
            GroupMode::ScoringEngine => "se",
        }
    }
}

/// Resolved members of one resource group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceGroup {
    pub app: Uuid,
    pub postgres: Uuid,
    pub cdh: Uuid,
    pub zookeeper: Uuid,
}

impl ServiceGroup {
    /// Locate a group's members in a space snapshot. `anchor_name` is
    /// the name of the group's own service instance; the shared name
    /// fragment is the first four `-`-separated segments of that
    /// instance's identifier. Any member that cannot be found aborts
    /// resolution.
    pub fn resolve(
        summary: &SpaceSummary,
        anchor_name: &str,
        mode: GroupMode,
    ) -> Result<Self, Error> {
        let common = common_part(summary, anchor_name)?;
        let tag = mode.tag();

        Ok(Self {
            app: app_by_name(summary, &format!("{tag}-{common}"))?,
            postgres: service_by_name(summary, &format!("{POSTGRES_PREFIX}-{tag}-{common}"))?,
            cdh: service_by_name(summary, &format!("{CDH_PREFIX}-{tag}-{common}"))?,
            zookeeper: service_by_name(summary, &format!("{ZOOKEEPER_PREFIX}-{tag}-{common}"))?,
        })
    }
}

fn common_part(summary: &SpaceSummary, anchor_name: &str) -> Result<String, Error> {
    let guid = service_by_name(summary, anchor_name)?;
    Ok(guid
        .to_string()
        .split('-')
        .take(4)
        .collect::<Vec<_>>()
        .join("-"))
}

fn app_by_name(summary: &SpaceSummary, name: &str) -> Result<Uuid, Error> {
    summary
        .apps
        .iter()
        .find(|app| app.name.eq_ignore_ascii_case(name))
        .map(|app| app.guid)
        .ok_or_else(|| Error::Invariant(format!("application not found: {name}")))
}

fn service_by_name(summary: &SpaceSummary, name: &str) -> Result<Uuid, Error> {
    summary
        .service_instances
        .iter()
        .find(|instance| instance.name.eq_ignore_ascii_case(name))
        .map(|instance| instance.guid)
        .ok_or_else(|| Error::Invariant(format!("service not found: {name}")))
}

pub struct ScoringEngineService {
    controller: Arc<dyn ControllerOperations>,
}

impl ScoringEngineService {
    pub fn new(controller: Arc<dyn ControllerOperations>) -> Self {
        Self { controller }
    }

    /// Provision a scoring engine paired with an existing server and
    /// repoint its data-store binding at the server's instance.
    pub async fn provision(&self, request: &ScoringEngineRequest) -> Result<(), Error> {
        let mut trace = StepTrace::new("scoring-engine-provision");

        let new_instance = NewServiceInstance {
            name: format!("{}-{}", GroupMode::ScoringEngine.tag(), request.instance_name),
            organization_guid: request.organization_guid,
            space_guid: request.space_guid,
            service_plan_guid: request.service_plan_guid,
        };

        log::info!("creating scoring engine instance {}", new_instance.name);
        self.controller.create_service_instance(&new_instance).await?;
        trace.complete(format!("created instance {}", new_instance.name));

        let summary = self.controller.space_summary(request.space_guid).await?;
        trace.complete("fetched space summary");

        let server = ServiceGroup::resolve(&summary, &request.instance_name, GroupMode::Server)?;
        let engine =
            ServiceGroup::resolve(&summary, &new_instance.name, GroupMode::ScoringEngine)?;
        trace.complete("resolved server and scoring engine groups");

        self.rebind(&mut trace, engine.app, engine.postgres, server.postgres)
            .await?;

        log::info!("restaging application {}", engine.app);
        self.controller.restage_app(engine.app).await?;
        trace.complete(format!("restaged app {}", engine.app));

        Ok(())
    }

    /// Repoint the app's binding on `from` to `to`, then drop the
    /// now-unused `from` instance. Exactly one binding is expected;
    /// the first one returned is used.
    async fn rebind(
        &self,
        trace: &mut StepTrace,
        app: Uuid,
        from: Uuid,
        to: Uuid,
    ) -> Result<(), Error> {
        log::info!("rebinding app {app} from instance {from} to {to}");

        let binding = self
            .controller
            .app_bindings(app, Some(from))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Invariant(format!("binding not found for app: {app}")))?;

        self.controller.delete_service_binding(binding.guid).await?;
        trace.complete(format!("deleted binding {}", binding.guid));

        self.controller
            .create_service_binding(&NewServiceBinding {
                app_guid: app,
                service_instance_guid: to,
            })
            .await?;
        trace.complete(format!("bound app {app} to instance {to}"));

        self.controller.delete_service_instance(from).await?;
        trace.complete(format!("deleted instance {from}"));

        Ok(())
    }
}
