//! Summary join engine: pure transformations from a flat space
//! snapshot into cross-referenced views.
//!
//! The app↔instance relation is reconstructed by matching instance
//! *names* against each app's bound-service-name list; the snapshot
//! carries no identifier-based relation. Inherited consequence: if two
//! instances of different offerings share a name at the space level,
//! their bound-app lists are merged. Kept for behavioral parity.

use std::collections::HashMap;
use uuid::Uuid;

use crate::model::{
    App, AppRef, Offering, OfferingSummary, ServiceInstanceView, ServiceKey, SpaceSummary,
};

/// Map from service-instance name to the apps bound to that name. An
/// app appears under every name in its bound set; names no app
/// references are absent from the map.
pub fn group_apps_by_service_name(apps: &[App]) -> HashMap<String, Vec<AppRef>> {
    let mut grouped: HashMap<String, Vec<AppRef>> = HashMap::new();
    for app in apps {
        for service_name in &app.service_names {
            grouped
                .entry(service_name.clone())
                .or_default()
                .push(AppRef::new(app.guid, &app.name));
        }
    }
    grouped
}

fn accepts(filter: Option<Uuid>, service_guid: Option<Uuid>) -> bool {
    match filter {
        None => true,
        // Identifier comparison is case-insensitive at the string
        // level, matching what the upstream API tolerates.
        Some(wanted) => service_guid
            .map(|guid| {
                guid.to_string()
                    .eq_ignore_ascii_case(&wanted.to_string())
            })
            .unwrap_or(false),
    }
}

/// Instances of the given offering (all, when unfiltered), each
/// enriched with the apps bound to its name. Snapshot order is
/// preserved; an unreferenced instance gets an empty bound-app list.
pub fn instances_with_bound_apps(
    summary: &SpaceSummary,
    offering: Option<Uuid>,
) -> Vec<ServiceInstanceView> {
    let grouped = group_apps_by_service_name(&summary.apps);

    summary
        .service_instances
        .iter()
        .filter(|instance| accepts(offering, instance.service_guid))
        .map(|instance| {
            let bound_apps = grouped.get(&instance.name).cloned().unwrap_or_default();
            ServiceInstanceView::from_instance(instance, bound_apps)
        })
        .collect()
}

/// Instances whose plan resolved, without the bound-app join. Rows
/// with an absent plan are dropped (legacy/unresolved plans cannot be
/// grouped under an offering).
pub fn plan_resolved_instances(summary: &SpaceSummary) -> Vec<ServiceInstanceView> {
    summary
        .service_instances
        .iter()
        .filter(|instance| instance.service_plan.is_some())
        .map(|instance| ServiceInstanceView::from_instance(instance, Vec::new()))
        .collect()
}

/// Group instances under their owning offerings (by the plan's service
/// reference). Offerings nothing was provisioned from are dropped.
pub fn offerings_with_instances(
    offerings: Vec<Offering>,
    instances: Vec<ServiceInstanceView>,
) -> Vec<OfferingSummary> {
    let mut index: HashMap<Uuid, Vec<ServiceInstanceView>> = HashMap::new();
    for instance in instances {
        let owner = instance
            .service_plan
            .as_ref()
            .and_then(|plan| plan.service.as_ref())
            .map(|service| service.guid);
        if let Some(owner) = owner {
            index.entry(owner).or_default().push(instance);
        }
    }

    offerings
        .iter()
        .map(|offering| {
            let members = index.remove(&offering.guid).unwrap_or_default();
            OfferingSummary::new(offering, members)
        })
        .filter(|summary| !summary.instances.is_empty())
        .collect()
}

/// Attach each instance's service keys; instances without keys get an
/// empty list (present, not null).
pub fn merge_service_keys(instances: &mut [ServiceInstanceView], keys: Vec<ServiceKey>) {
    let mut index: HashMap<Uuid, Vec<ServiceKey>> = HashMap::new();
    for key in keys {
        index.entry(key.service_instance_guid).or_default().push(key);
    }

    for instance in instances {
        instance.service_keys = Some(index.remove(&instance.guid).unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppState, OfferingRef, ServiceInstance, ServicePlan};

    fn app(name: &str, bound: &[&str]) -> App {
        App {
            guid: Uuid::new_v4(),
            name: name.to_string(),
            service_names: bound.iter().map(|s| s.to_string()).collect(),
            running_instances: 1,
            state: AppState::Started,
            urls: None,
        }
    }

    fn instance(name: &str, offering: Option<Uuid>) -> ServiceInstance {
        ServiceInstance {
            guid: Uuid::new_v4(),
            name: name.to_string(),
            bound_app_count: 0,
            dashboard_url: None,
            service_plan: None,
            service_guid: offering,
            last_operation: None,
        }
    }

    #[test]
    fn groups_apps_under_every_bound_name() {
        let apps = vec![app("a1", &["s1", "s2"]), app("a2", &["s2"]), app("a3", &[])];
        let grouped = group_apps_by_service_name(&apps);

        assert_eq!(grouped["s1"].len(), 1);
        assert_eq!(grouped["s2"].len(), 2);
        assert!(!grouped.contains_key("s3"));
    }

    #[test]
    fn join_attributes_bound_apps_by_name() {
        let offering = Uuid::new_v4();
        let summary = SpaceSummary {
            apps: vec![app("a1", &["s1"]), app("a2", &[])],
            service_instances: vec![instance("s1", Some(offering))],
        };

        let views = instances_with_bound_apps(&summary, Some(offering));
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].name, "s1");
        assert_eq!(views[0].bound_apps.len(), 1);
        assert_eq!(views[0].bound_apps[0].name, "a1");
    }

    #[test]
    fn join_with_unmatched_offering_is_empty() {
        let summary = SpaceSummary {
            apps: vec![app("a1", &["s1"])],
            service_instances: vec![instance("s1", Some(Uuid::new_v4()))],
        };

        let views = instances_with_bound_apps(&summary, Some(Uuid::new_v4()));
        assert!(views.is_empty());
    }

    #[test]
    fn unfiltered_join_keeps_instances_without_offering() {
        let summary = SpaceSummary {
            apps: Vec::new(),
            service_instances: vec![instance("s1", None), instance("s2", Some(Uuid::new_v4()))],
        };

        let views = instances_with_bound_apps(&summary, None);
        assert_eq!(views.len(), 2);
        assert!(views[0].bound_apps.is_empty());
    }

    #[test]
    fn filtered_join_drops_instances_without_offering() {
        let offering = Uuid::new_v4();
        let summary = SpaceSummary {
            apps: Vec::new(),
            service_instances: vec![instance("s1", None), instance("s2", Some(offering))],
        };

        let views = instances_with_bound_apps(&summary, Some(offering));
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].name, "s2");
    }

    #[test]
    fn offerings_without_instances_are_dropped() {
        let used = Offering {
            guid: Uuid::new_v4(),
            label: "db".to_string(),
            description: None,
            tags: Vec::new(),
            unique_id: None,
            active: None,
        };
        let unused = Offering {
            guid: Uuid::new_v4(),
            label: "queue".to_string(),
            description: None,
            tags: Vec::new(),
            unique_id: None,
            active: None,
        };

        let mut row = instance("db-1", None);
        row.service_plan = Some(ServicePlan {
            guid: Uuid::new_v4(),
            name: "shared".to_string(),
            service: Some(OfferingRef {
                guid: used.guid,
                label: "db".to_string(),
            }),
        });
        let views = vec![ServiceInstanceView::from_instance(&row, Vec::new())];

        let summaries = offerings_with_instances(vec![used.clone(), unused], views);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].guid, used.guid);
        assert_eq!(summaries[0].instances.len(), 1);
    }

    #[test]
    fn key_merge_defaults_to_empty_list() {
        let with_keys = instance("a", None);
        let without_keys = instance("b", None);
        let mut views = vec![
            ServiceInstanceView::from_instance(&with_keys, Vec::new()),
            ServiceInstanceView::from_instance(&without_keys, Vec::new()),
        ];

        let keys = vec![ServiceKey {
            guid: Uuid::new_v4(),
            name: "k1".to_string(),
            credentials: serde_json::json!({"uri": "postgres://"}),
            service_instance_guid: with_keys.guid,
        }];

        merge_service_keys(&mut views, keys);
        assert_eq!(views[0].service_keys.as_ref().unwrap().len(), 1);
        assert_eq!(views[1].service_keys.as_ref().unwrap().len(), 0);
    }

    #[test]
    fn name_collision_merges_bound_apps_across_offerings() {
        // Two offerings, one shared instance name: attribution merges.
        // Inherited behavior of the name-keyed join.
        let o1 = Uuid::new_v4();
        let o2 = Uuid::new_v4();
        let summary = SpaceSummary {
            apps: vec![app("a1", &["shared"])],
            service_instances: vec![instance("shared", Some(o1)), instance("shared", Some(o2))],
        };

        let views = instances_with_bound_apps(&summary, Some(o2));
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].bound_apps.len(), 1);
    }
}
