use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::api::{handlers, AppContext};

pub fn create_router() -> Router<Arc<AppContext>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Applications
        .route("/rest/apps", get(handlers::list_apps))
        .route(
            "/rest/apps/:app",
            get(handlers::get_app).delete(handlers::delete_app),
        )
        .route("/rest/apps/:app/status", post(handlers::switch_app_state))
        .route(
            "/rest/apps/:app/orphan_services",
            get(handlers::get_app_orphan_services),
        )
        // Service bindings
        .route(
            "/rest/apps/:app/service_bindings",
            get(handlers::get_app_bindings).post(handlers::create_service_binding),
        )
        .route(
            "/rest/service_bindings/:binding",
            delete(handlers::delete_service_binding),
        )
        // Service instances
        .route(
            "/rest/service_instances",
            get(handlers::list_service_instances).post(handlers::create_service_instance),
        )
        .route(
            "/rest/service_instances/summary",
            get(handlers::get_instances_summary),
        )
        .route(
            "/rest/service_instances/extended_summary",
            get(handlers::get_extended_summary),
        )
        .route(
            "/rest/service_instances/:instance",
            delete(handlers::delete_service_instance),
        )
        // Service keys
        .route(
            "/rest/service_keys",
            get(handlers::list_service_keys).post(handlers::create_service_key),
        )
        .route(
            "/rest/service_keys/:key",
            delete(handlers::delete_service_key),
        )
        // Offerings
        .route("/rest/services", get(handlers::list_offerings))
        .route("/rest/service_plan", get(handlers::get_plan_guid))
        .route(
            "/rest/services/:service/service_plans",
            get(handlers::get_service_plans),
        )
        .route("/rest/services/:service", get(handlers::get_offering))
        // Marketplace registration
        .route(
            "/rest/marketplace/application",
            post(handlers::register_offering),
        )
        .route(
            "/rest/marketplace/application/:offering",
            get(handlers::get_cloned_offerings).delete(handlers::deregister_offering),
        )
        // Space summary pass-through
        .route("/rest/summaries", get(handlers::get_space_summary))
        // Scoring engine provisioning
        .route(
            "/rest/scoring-engine",
            post(handlers::create_scoring_engine),
        )
}
