//! Application lifecycle orchestration: observable-state
//! normalization, state-transition dispatch and the cascading delete.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::Error;
use crate::logic::StepTrace;
use crate::model::{App, AppState, AppStatus, AppSummary, ServiceInstance};
use crate::remote::ControllerOperations;

/// An instance bound to exactly one app has no other consumer.
pub fn is_orphan(instance: &ServiceInstance) -> bool {
    instance.bound_app_count == 1
}

/// The controller reports running_instances=-1 while an app is
/// staging, and state STARTED even when nothing is running. Both are
/// corrected in externally observable views only; the underlying
/// resource is left as-is.
fn normalize_app(app: &mut App) {
    app.running_instances = app.running_instances.max(0);
    if app.running_instances == 0 && app.state == AppState::Started {
        app.state = AppState::Stopped;
    }
}

fn normalize_summary(summary: &mut AppSummary) {
    if let Some(running) = summary.running_instances {
        let running = running.max(0);
        summary.running_instances = Some(running);
        if running == 0 && summary.state == Some(AppState::Started) {
            summary.state = Some(AppState::Stopped);
        }
    }
}

pub struct ApplicationsService {
    controller: Arc<dyn ControllerOperations>,
}

impl ApplicationsService {
    pub fn new(controller: Arc<dyn ControllerOperations>) -> Self {
        Self { controller }
    }

    /// Applications in a space, normalized.
    pub async fn space_apps(&self, space: Uuid) -> Result<Vec<App>, Error> {
        let mut apps = self.controller.space_summary(space).await?.apps;
        apps.iter_mut().for_each(normalize_app);
        Ok(apps)
    }

    /// Applications bound to at least one instance of the labeled
    /// offering. Instances with an unresolved plan never match.
    pub async fn space_apps_by_offering(
        &self,
        space: Uuid,
        label: &str,
    ) -> Result<Vec<App>, Error> {
        let summary = self.controller.space_summary(space).await?;

        let matching: std::collections::HashSet<&str> = summary
            .service_instances
            .iter()
            .filter(|instance| {
                instance
                    .service_plan
                    .as_ref()
                    .and_then(|plan| plan.service.as_ref())
                    .map(|service| service.label == label)
                    .unwrap_or(false)
            })
            .map(|instance| instance.name.as_str())
            .collect();

        Ok(summary
            .apps
            .into_iter()
            .filter(|app| {
                app.service_names
                    .iter()
                    .any(|name| matching.contains(name.as_str()))
            })
            .collect())
    }

    pub async fn app_summary(&self, app: Uuid) -> Result<AppSummary, Error> {
        let mut summary = self.controller.app_summary(app).await?;
        normalize_summary(&mut summary);
        Ok(summary)
    }

    /// Service instances of an app matching the predicate.
    pub async fn app_services<F>(
        &self,
        app: Uuid,
        filter: F,
    ) -> Result<Vec<ServiceInstance>, Error>
    where
        F: Fn(&ServiceInstance) -> bool,
    {
        let summary = self.controller.app_summary(app).await?;
        Ok(summary.services.into_iter().filter(|s| filter(s)).collect())
    }

    pub async fn orphan_services(&self, app: Uuid) -> Result<Vec<ServiceInstance>, Error> {
        self.app_services(app, is_orphan).await
    }

    /// Route a requested state transition. The dispatch is a closed
    /// table over the request state; anything outside it is rejected.
    pub async fn switch_state(&self, app: Uuid, status: &AppStatus) -> Result<(), Error> {
        match status.state {
            Some(AppState::Restaging) => Ok(self.controller.restage_app(app).await?),
            Some(AppState::Started) | Some(AppState::Stopped) => {
                log::info!("switching app {app} to {:?}", status.state);
                Ok(self.controller.switch_app(app, status).await?)
            }
            Some(AppState::Restarting) => Err(Error::NotImplemented(
                "restart transitions are not supported".to_string(),
            )),
            Some(AppState::Staging) | None => Err(Error::BadRequest(
                "request is missing a recognized target state".to_string(),
            )),
        }
    }

    pub async fn delete(&self, app: Uuid) -> Result<(), Error> {
        log::info!("deleting app {app}");
        Ok(self.controller.delete_app(app).await?)
    }

    /// Delete an app together with the service instances only it was
    /// bound to. The app delete aborts the whole operation on failure;
    /// each orphan delete is independent and a failure does not stop
    /// the remaining attempts. Nothing is rolled back.
    pub async fn delete_cascade(&self, app: Uuid) -> Result<(), Error> {
        let mut trace = StepTrace::new("delete-app-cascade");

        let orphans = self.orphan_services(app).await?;
        trace.complete(format!("selected {} orphan instance(s)", orphans.len()));

        self.delete(app).await?;
        trace.complete(format!("deleted app {app}"));

        for orphan in &orphans {
            match self.controller.delete_service_instance(orphan.guid).await {
                Ok(()) => trace.complete(format!("deleted instance {}", orphan.guid)),
                Err(err) => log::error!(
                    "cascade delete of instance {} failed, continuing: {err:#}",
                    orphan.guid
                ),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpaceSummary;
    use crate::remote::testing::StubController;

    fn app(name: &str, running: i32, state: AppState) -> App {
        App {
            guid: Uuid::new_v4(),
            name: name.to_string(),
            service_names: Vec::new(),
            running_instances: running,
            state,
            urls: None,
        }
    }

    fn instance(name: &str, bound_app_count: u32) -> ServiceInstance {
        ServiceInstance {
            guid: Uuid::new_v4(),
            name: name.to_string(),
            bound_app_count,
            dashboard_url: None,
            service_plan: None,
            service_guid: None,
            last_operation: None,
        }
    }

    #[tokio::test]
    async fn negative_running_count_is_clamped() {
        let space = Uuid::new_v4();
        let controller = Arc::new(StubController::with_summary(SpaceSummary {
            apps: vec![app("staging", -1, AppState::Staging)],
            service_instances: Vec::new(),
        }));

        let apps = ApplicationsService::new(controller)
            .space_apps(space)
            .await
            .unwrap();
        assert_eq!(apps[0].running_instances, 0);
        assert_eq!(apps[0].state, AppState::Staging);
    }

    #[tokio::test]
    async fn started_with_no_instances_reads_stopped() {
        let space = Uuid::new_v4();
        let controller = Arc::new(StubController::with_summary(SpaceSummary {
            apps: vec![
                app("idle", 0, AppState::Started),
                app("busy", 2, AppState::Started),
            ],
            service_instances: Vec::new(),
        }));

        let apps = ApplicationsService::new(controller)
            .space_apps(space)
            .await
            .unwrap();
        assert_eq!(apps[0].state, AppState::Stopped);
        assert_eq!(apps[1].state, AppState::Started);
    }

    #[tokio::test]
    async fn summary_without_running_count_passes_through() {
        let app_guid = Uuid::new_v4();
        let controller = Arc::new(StubController::default());
        controller.app_summaries.lock().insert(
            app_guid,
            AppSummary {
                guid: Some(app_guid),
                name: "staging".to_string(),
                running_instances: None,
                state: Some(AppState::Started),
                services: Vec::new(),
            },
        );

        let summary = ApplicationsService::new(controller)
            .app_summary(app_guid)
            .await
            .unwrap();
        assert_eq!(summary.state, Some(AppState::Started));
    }

    #[tokio::test]
    async fn dispatch_routes_restaging_to_restage() {
        let app_guid = Uuid::new_v4();
        let controller = Arc::new(StubController::default());
        let service = ApplicationsService::new(controller.clone());

        service
            .switch_state(
                app_guid,
                &AppStatus {
                    state: Some(AppState::Restaging),
                },
            )
            .await
            .unwrap();

        assert_eq!(
            controller.recorded_calls(),
            vec![format!("restage_app {app_guid}")]
        );
    }

    #[tokio::test]
    async fn dispatch_rejects_restarting_and_missing_state() {
        let service = ApplicationsService::new(Arc::new(StubController::default()));

        let restart = service
            .switch_state(
                Uuid::new_v4(),
                &AppStatus {
                    state: Some(AppState::Restarting),
                },
            )
            .await;
        assert!(matches!(restart, Err(Error::NotImplemented(_))));

        let missing = service
            .switch_state(Uuid::new_v4(), &AppStatus { state: None })
            .await;
        assert!(matches!(missing, Err(Error::BadRequest(_))));
    }

    #[tokio::test]
    async fn cascade_deletes_app_and_orphans_only() {
        let app_guid = Uuid::new_v4();
        let orphan = instance("only-mine", 1);
        let shared = instance("shared", 2);
        let orphan_guid = orphan.guid;
        let shared_guid = shared.guid;

        let controller = Arc::new(StubController::default());
        controller.app_summaries.lock().insert(
            app_guid,
            AppSummary {
                guid: Some(app_guid),
                name: "doomed".to_string(),
                running_instances: Some(1),
                state: Some(AppState::Started),
                services: vec![orphan, shared],
            },
        );

        ApplicationsService::new(controller.clone())
            .delete_cascade(app_guid)
            .await
            .unwrap();

        let calls = controller.recorded_calls();
        assert!(calls.contains(&format!("delete_app {app_guid}")));
        assert!(calls.contains(&format!("delete_service_instance {orphan_guid}")));
        assert!(!calls.contains(&format!("delete_service_instance {shared_guid}")));
    }

    #[tokio::test]
    async fn cascade_aborts_when_app_delete_fails() {
        let app_guid = Uuid::new_v4();
        let orphan = instance("only-mine", 1);
        let orphan_guid = orphan.guid;

        let controller = Arc::new(StubController::default().fail_on("delete_app"));
        controller.app_summaries.lock().insert(
            app_guid,
            AppSummary {
                guid: Some(app_guid),
                name: "survivor".to_string(),
                running_instances: Some(1),
                state: Some(AppState::Started),
                services: vec![orphan],
            },
        );

        let result = ApplicationsService::new(controller.clone())
            .delete_cascade(app_guid)
            .await;
        assert!(result.is_err());
        assert!(!controller
            .recorded_calls()
            .contains(&format!("delete_service_instance {orphan_guid}")));
    }

    #[tokio::test]
    async fn cascade_continues_past_failed_instance_delete() {
        let app_guid = Uuid::new_v4();
        let first = instance("first", 1);
        let second = instance("second", 1);
        let second_guid = second.guid;

        let controller = Arc::new(StubController::default().fail_on("delete_service_instance"));
        controller.app_summaries.lock().insert(
            app_guid,
            AppSummary {
                guid: Some(app_guid),
                name: "doomed".to_string(),
                running_instances: Some(1),
                state: Some(AppState::Started),
                services: vec![first, second],
            },
        );

        ApplicationsService::new(controller.clone())
            .delete_cascade(app_guid)
            .await
            .unwrap();

        // Both deletes were attempted even though each failed.
        assert!(controller
            .recorded_calls()
            .contains(&format!("delete_service_instance {second_guid}")));
    }

    #[tokio::test]
    async fn label_filter_selects_bound_apps() {
        let space = Uuid::new_v4();
        let mut bound = app("bound", 1, AppState::Started);
        bound.service_names = vec!["pg-1".to_string()];
        let loose = app("loose", 1, AppState::Started);

        let mut pg = instance("pg-1", 1);
        pg.service_plan = Some(crate::model::ServicePlan {
            guid: Uuid::new_v4(),
            name: "shared".to_string(),
            service: Some(crate::model::OfferingRef {
                guid: Uuid::new_v4(),
                label: "postgresql".to_string(),
            }),
        });

        let controller = Arc::new(StubController::with_summary(SpaceSummary {
            apps: vec![bound, loose],
            service_instances: vec![pg],
        }));

        let apps = ApplicationsService::new(controller)
            .space_apps_by_offering(space, "postgresql")
            .await
            .unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "bound");
    }
}
