use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::AppContext;
use crate::error::Error;
use crate::logic::{ApplicationsService, CatalogService, InstancesService, ScoringEngineService};
use crate::model::{
    App, AppStatus, AppSummary, CreatedServiceInstance, ExtendedSummary, NewServiceBinding,
    NewServiceInstance, NewServiceKey, Offering, OfferingDetails, OfferingRegistrationRequest,
    OfferingSummary, Plan, PlanGuidResponse, ScoringEngineRequest, ServiceBinding, ServiceInstance,
    ServiceInstanceView, ServiceKey, SpaceSummary, UserContext,
};
use crate::remote::ControllerOperations;

pub type AppState = Arc<AppContext>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Deserialize)]
pub struct AppsQuery {
    pub space: Option<Uuid>,
    pub service_label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CascadeQuery {
    pub cascade: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct InstancesQuery {
    pub space: Option<Uuid>,
    pub broker: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct InstancesSummaryQuery {
    pub space: Option<Uuid>,
    pub service_keys: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SpaceQuery {
    pub space: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    pub label: String,
    pub plan: String,
}

/// Binding create body; the target app comes from the request path.
#[derive(Debug, Deserialize)]
pub struct CreateBindingRequest {
    pub service_instance_guid: Uuid,
}

fn require_space(space: Option<Uuid>) -> Result<Uuid, Error> {
    space.ok_or_else(|| {
        Error::NotImplemented("handling an unfiltered request is not implemented".to_string())
    })
}

fn controller(state: &AppContext, user: &UserContext) -> Arc<dyn ControllerOperations> {
    state.clients.user_client(&user.token)
}

fn applications(state: &AppContext, user: &UserContext) -> ApplicationsService {
    ApplicationsService::new(controller(state, user))
}

fn instances(state: &AppContext, user: &UserContext) -> InstancesService {
    InstancesService::new(controller(state, user), state.registry.clone())
}

fn catalog(state: &AppContext, user: &UserContext) -> CatalogService {
    CatalogService::new(
        controller(state, user),
        state.privileged.clone(),
        state.catalog.clone(),
    )
}

// ---- applications ----

pub async fn list_apps(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<AppsQuery>,
) -> Result<Json<Vec<App>>, Error> {
    let space = require_space(query.space)?;
    let service = applications(&state, &user);

    let apps = match query.service_label {
        Some(label) => service.space_apps_by_offering(space, &label).await?,
        None => service.space_apps(space).await?,
    };
    Ok(Json(apps))
}

pub async fn get_app(
    State(state): State<AppState>,
    user: UserContext,
    Path(app): Path<Uuid>,
) -> Result<Json<AppSummary>, Error> {
    Ok(Json(applications(&state, &user).app_summary(app).await?))
}

pub async fn get_app_orphan_services(
    State(state): State<AppState>,
    user: UserContext,
    Path(app): Path<Uuid>,
) -> Result<Json<Vec<ServiceInstance>>, Error> {
    Ok(Json(
        applications(&state, &user).orphan_services(app).await?,
    ))
}

pub async fn switch_app_state(
    State(state): State<AppState>,
    user: UserContext,
    Path(app): Path<Uuid>,
    Json(status): Json<AppStatus>,
) -> Result<StatusCode, Error> {
    applications(&state, &user).switch_state(app, &status).await?;
    Ok(StatusCode::OK)
}

pub async fn delete_app(
    State(state): State<AppState>,
    user: UserContext,
    Path(app): Path<Uuid>,
    Query(query): Query<CascadeQuery>,
) -> Result<StatusCode, Error> {
    let service = applications(&state, &user);
    if query.cascade.unwrap_or(false) {
        service.delete_cascade(app).await?;
    } else {
        service.delete(app).await?;
    }
    Ok(StatusCode::OK)
}

// ---- service bindings ----

pub async fn get_app_bindings(
    State(state): State<AppState>,
    user: UserContext,
    Path(app): Path<Uuid>,
) -> Result<Json<Vec<ServiceBinding>>, Error> {
    Ok(Json(
        controller(&state, &user).app_bindings(app, None).await?,
    ))
}

pub async fn create_service_binding(
    State(state): State<AppState>,
    user: UserContext,
    Path(app): Path<Uuid>,
    Json(binding): Json<CreateBindingRequest>,
) -> Result<Json<ServiceBinding>, Error> {
    let created = controller(&state, &user)
        .create_service_binding(&NewServiceBinding {
            app_guid: app,
            service_instance_guid: binding.service_instance_guid,
        })
        .await?;
    Ok(Json(created))
}

pub async fn delete_service_binding(
    State(state): State<AppState>,
    user: UserContext,
    Path(binding): Path<Uuid>,
) -> Result<StatusCode, Error> {
    controller(&state, &user)
        .delete_service_binding(binding)
        .await?;
    Ok(StatusCode::OK)
}

// ---- service instances ----

pub async fn list_service_instances(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<InstancesQuery>,
) -> Result<Json<Vec<ServiceInstanceView>>, Error> {
    let space = require_space(query.space)?;
    Ok(Json(
        instances(&state, &user).list(space, query.broker).await?,
    ))
}

pub async fn create_service_instance(
    State(state): State<AppState>,
    user: UserContext,
    Json(instance): Json<NewServiceInstance>,
) -> Result<Json<CreatedServiceInstance>, Error> {
    Ok(Json(
        instances(&state, &user).create(&instance, &user).await?,
    ))
}

pub async fn delete_service_instance(
    State(state): State<AppState>,
    user: UserContext,
    Path(instance): Path<Uuid>,
) -> Result<StatusCode, Error> {
    instances(&state, &user).delete(instance).await?;
    Ok(StatusCode::OK)
}

pub async fn get_instances_summary(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<InstancesSummaryQuery>,
) -> Result<Json<Vec<OfferingSummary>>, Error> {
    let space = require_space(query.space)?;
    let fetch_keys = query.service_keys.unwrap_or(false);
    Ok(Json(
        instances(&state, &user)
            .offering_summaries(space, fetch_keys)
            .await?,
    ))
}

pub async fn get_extended_summary(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<SpaceQuery>,
) -> Result<Json<ExtendedSummary>, Error> {
    let space = require_space(query.space)?;
    Ok(Json(
        instances(&state, &user).extended_summary(space).await?,
    ))
}

// ---- service keys ----

pub async fn list_service_keys(
    State(state): State<AppState>,
    user: UserContext,
) -> Result<Json<Vec<ServiceKey>>, Error> {
    Ok(Json(controller(&state, &user).service_keys().await?))
}

pub async fn create_service_key(
    State(state): State<AppState>,
    user: UserContext,
    Json(key): Json<NewServiceKey>,
) -> Result<Json<ServiceKey>, Error> {
    Ok(Json(
        controller(&state, &user).create_service_key(&key).await?,
    ))
}

pub async fn delete_service_key(
    State(state): State<AppState>,
    user: UserContext,
    Path(key): Path<Uuid>,
) -> Result<StatusCode, Error> {
    controller(&state, &user).delete_service_key(key).await?;
    Ok(StatusCode::OK)
}

// ---- offerings & marketplace ----

pub async fn list_offerings(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<SpaceQuery>,
) -> Result<Json<Vec<Offering>>, Error> {
    let space = require_space(query.space)?;
    Ok(Json(catalog(&state, &user).space_offerings(space).await?))
}

pub async fn get_offering(
    State(state): State<AppState>,
    user: UserContext,
    Path(offering): Path<Uuid>,
) -> Result<Json<OfferingDetails>, Error> {
    Ok(Json(
        catalog(&state, &user)
            .offering_details(offering, &user)
            .await?,
    ))
}

pub async fn get_plan_guid(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<PlanQuery>,
) -> Result<Json<PlanGuidResponse>, Error> {
    Ok(Json(
        catalog(&state, &user)
            .plan_guid(&query.label, &query.plan)
            .await?,
    ))
}

pub async fn get_service_plans(
    State(state): State<AppState>,
    user: UserContext,
    Path(label): Path<String>,
) -> Result<Json<Vec<Plan>>, Error> {
    Ok(Json(catalog(&state, &user).plans_by_label(&label).await?))
}

pub async fn register_offering(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<OfferingRegistrationRequest>,
) -> Result<Json<Option<Offering>>, Error> {
    Ok(Json(
        catalog(&state, &user).register_offering(&request).await?,
    ))
}

pub async fn deregister_offering(
    State(state): State<AppState>,
    user: UserContext,
    Path(offering): Path<Uuid>,
) -> Result<StatusCode, Error> {
    catalog(&state, &user)
        .deregister_offering(offering, &user)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn get_cloned_offerings(
    State(state): State<AppState>,
    user: UserContext,
    Path(offering): Path<Uuid>,
) -> Result<Json<Vec<Offering>>, Error> {
    Ok(Json(catalog(&state, &user).cloned_offerings(offering).await?))
}

// ---- summaries ----

pub async fn get_space_summary(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<SpaceQuery>,
) -> Result<Json<SpaceSummary>, Error> {
    let space = require_space(query.space)?;
    Ok(Json(controller(&state, &user).space_summary(space).await?))
}

// ---- scoring engine ----

pub async fn create_scoring_engine(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<ScoringEngineRequest>,
) -> Result<StatusCode, Error> {
    ScoringEngineService::new(controller(&state, &user))
        .provision(&request)
        .await?;
    Ok(StatusCode::OK)
}
