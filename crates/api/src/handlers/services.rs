use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use salon_core::{
    errors::BookingError,
    models::{
        response::ApiResponse,
        service::{CreateServiceRequest, Service, UpdateServiceRequest},
    },
    validation,
};
use salon_db::models::{NewService, ServiceChanges};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::AdminUser,
        error_handling::AppError,
        extract::{JsonBody, PathParam},
    },
};

/// Active services, cheapest first.
#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApiResponse<Vec<Service>>>, AppError> {
    let services = state.store.list_services(true).await?;
    Ok(Json(ApiResponse::ok(
        services.into_iter().map(Service::from).collect(),
    )))
}

#[axum::debug_handler]
pub async fn admin_list_services(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<Service>>>, AppError> {
    let services = state.store.list_services(false).await?;
    Ok(Json(ApiResponse::ok(
        services.into_iter().map(Service::from).collect(),
    )))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    JsonBody(payload): JsonBody<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Service>>), AppError> {
    validation::validate_service_fields(
        Some(&payload.name),
        Some(payload.price),
        Some(payload.duration),
    )?;

    let created = state
        .store
        .create_service(&NewService {
            name: payload.name.trim().to_string(),
            description: payload.description.trim().to_string(),
            price: payload.price,
            duration_minutes: payload.duration,
        })
        .await?;

    info!("Created service {} ({})", created.id, created.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(Service::from(created)).with_message("Service created")),
    ))
}

#[axum::debug_handler]
pub async fn update_service(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateServiceRequest>,
) -> Result<Json<ApiResponse<Service>>, AppError> {
    validation::validate_service_fields(
        payload.name.as_deref(),
        payload.price,
        payload.duration,
    )?;

    let changes = ServiceChanges {
        name: payload.name.map(|n| n.trim().to_string()),
        description: payload.description.map(|d| d.trim().to_string()),
        price: payload.price,
        duration_minutes: payload.duration,
        active: payload.active,
    };
    let updated = state
        .store
        .update_service(id, &changes)
        .await?
        .ok_or_else(|| BookingError::not_found("Service not found"))?;

    Ok(Json(
        ApiResponse::ok(Service::from(updated)).with_message("Service updated"),
    ))
}
