//! # Admin Panel Handlers
//!
//! Appointment oversight and the weekly agenda template. Every handler takes
//! an [`AdminUser`], so a missing session is rejected with 401 and a client
//! session with 403 before any work is done.
//!
//! Status changes are unconditional overwrites: any of the five statuses may
//! replace any other. The only refusal comes from the store when an
//! appointment would become active on a slot another active appointment
//! already holds.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use salon_core::{
    availability::parse_time,
    errors::BookingError,
    models::{
        appointment::{
            Appointment, AppointmentDetails, AppointmentFilter, AppointmentStatus,
            UpdateStatusRequest,
        },
        response::ApiResponse,
        slot::{AvailableSlot, CreateSlotRequest, UpdateSlotRequest},
    },
};
use salon_db::repositories::SlotOccupied;
use tracing::info;
use uuid::Uuid;

use crate::{
    ApiState,
    handlers::{appointments::SLOT_TAKEN_MESSAGE, required},
    middleware::{
        auth::AdminUser,
        error_handling::AppError,
        extract::{JsonBody, PathParam, QueryParams},
    },
};

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    QueryParams(filter): QueryParams<AppointmentFilter>,
) -> Result<Json<ApiResponse<Vec<AppointmentDetails>>>, AppError> {
    let status = filter.status()?;
    let rows = state.store.list_appointments(status).await?;
    let appointments = rows
        .into_iter()
        .map(|row| row.into_details(true))
        .collect::<eyre::Result<Vec<_>>>()?;

    Ok(Json(ApiResponse::ok(appointments)))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<ApiState>>,
    AdminUser(admin): AdminUser,
    JsonBody(payload): JsonBody<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let id = payload
        .id
        .ok_or_else(|| BookingError::validation("Appointment id is required"))?;
    let status: AppointmentStatus =
        required(payload.status.as_deref(), "Status is required")?.parse()?;

    let updated = match state.store.update_appointment_status(id, status).await {
        Ok(updated) => updated,
        Err(err) if err.downcast_ref::<SlotOccupied>().is_some() => {
            return Err(BookingError::conflict(SLOT_TAKEN_MESSAGE).into());
        }
        Err(err) => return Err(err.into()),
    }
    .ok_or_else(|| BookingError::not_found("Appointment not found"))?;

    info!("Appointment {} set to {} by admin {}", id, status, admin.user_id);
    Ok(Json(
        ApiResponse::ok(Appointment::try_from(updated)?).with_message("Status updated"),
    ))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<ApiState>>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if !state.store.delete_appointment(id).await? {
        return Err(BookingError::not_found("Appointment not found").into());
    }

    info!("Appointment {} deleted by admin {}", id, admin.user_id);
    Ok(Json(ApiResponse::message("Appointment deleted")))
}

#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<AvailableSlot>>>, AppError> {
    let slots = state.store.list_slots().await?;
    Ok(Json(ApiResponse::ok(
        slots.into_iter().map(AvailableSlot::from).collect(),
    )))
}

#[axum::debug_handler]
pub async fn create_slot(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    JsonBody(payload): JsonBody<CreateSlotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AvailableSlot>>), AppError> {
    if !(0..=6).contains(&payload.day_of_week) {
        return Err(BookingError::validation("Day of week must be between 0 (Sunday) and 6").into());
    }
    let time = payload.time.trim();
    parse_time(time)?;

    let created = state
        .store
        .create_slot(payload.day_of_week, time)
        .await?
        .ok_or_else(|| BookingError::conflict("This time already exists for that weekday"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AvailableSlot::from(created)).with_message("Time added")),
    ))
}

#[axum::debug_handler]
pub async fn update_slot(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateSlotRequest>,
) -> Result<Json<ApiResponse<AvailableSlot>>, AppError> {
    let updated = state
        .store
        .set_slot_active(id, payload.active)
        .await?
        .ok_or_else(|| BookingError::not_found("Time slot not found"))?;

    Ok(Json(ApiResponse::ok(AvailableSlot::from(updated))))
}

#[axum::debug_handler]
pub async fn delete_slot(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if !state.store.delete_slot(id).await? {
        return Err(BookingError::not_found("Time slot not found").into());
    }
    Ok(Json(ApiResponse::message("Time removed")))
}
