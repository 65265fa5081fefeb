//! # Client Appointment Handlers
//!
//! Booking, listing, cancelling and justifying the caller's own appointments.
//!
//! Booking checks its two preconditions in order (the service exists, the
//! slot is free) and then inserts. The insert itself refuses a second active
//! appointment on the same date and time, so a request that loses a race
//! after passing the pre-check gets the same conflict.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use salon_core::{
    availability::{parse_date, parse_time},
    errors::BookingError,
    models::{
        appointment::{
            Appointment, AppointmentDetails, AppointmentStatus, CreateAppointmentRequest,
            JustifyRequest,
        },
        response::ApiResponse,
        service::Service,
    },
    validation,
};
use salon_db::models::NewAppointment;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    ApiState,
    handlers::required,
    middleware::{
        auth::AuthUser,
        error_handling::AppError,
        extract::{JsonBody, PathParam},
    },
};

pub const SLOT_TAKEN_MESSAGE: &str = "This time slot is already reserved";

#[axum::debug_handler]
pub async fn list_my_appointments(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
) -> Result<Json<ApiResponse<Vec<AppointmentDetails>>>, AppError> {
    let rows = state.store.list_appointments_for_user(caller.user_id).await?;
    let appointments = rows
        .into_iter()
        .map(|row| row.into_details(false))
        .collect::<eyre::Result<Vec<_>>>()?;

    Ok(Json(ApiResponse::ok(appointments)))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    JsonBody(payload): JsonBody<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentDetails>>), AppError> {
    let service_id = payload
        .service_id
        .ok_or_else(|| BookingError::validation("Service is required"))?;
    let date = parse_date(&required(payload.date.as_deref(), "Date is required")?)?;
    let time = required(payload.time.as_deref(), "Time is required")?;
    parse_time(&time)?;
    let notes = validation::normalize_notes(payload.notes.as_deref())?;

    let service = state
        .store
        .find_service(service_id)
        .await?
        .ok_or_else(|| BookingError::not_found("Service not found"))?;

    let occupied = state
        .store
        .find_appointments_by_date_and_statuses(date, &AppointmentStatus::OCCUPYING)
        .await?
        .iter()
        .any(|appointment| appointment.appointment_time == time);
    if occupied {
        warn!("Rejected booking for {} {}: slot taken", date, time);
        return Err(BookingError::conflict(SLOT_TAKEN_MESSAGE).into());
    }

    let created = state
        .store
        .create_appointment(&NewAppointment {
            user_id: caller.user_id,
            service_id,
            date,
            time,
            notes,
        })
        .await?
        .ok_or_else(|| {
            warn!("Rejected booking for {}: slot taken concurrently", date);
            BookingError::conflict(SLOT_TAKEN_MESSAGE)
        })?;

    info!(
        "Appointment {} booked for {} {} by {}",
        created.id, created.appointment_date, created.appointment_time, caller.user_id
    );
    let details = AppointmentDetails {
        appointment: Appointment::try_from(created)?,
        service: Service::from(service).into(),
        user: None,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(details).with_message("Appointment booked")),
    ))
}

/// Clients may only cancel their own appointments.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = state
        .store
        .find_appointment(id)
        .await?
        .ok_or_else(|| BookingError::not_found("Appointment not found"))?;
    if appointment.user_id != caller.user_id {
        return Err(
            BookingError::Authorization("You cannot cancel this appointment".to_string()).into(),
        );
    }

    let cancelled = state
        .store
        .update_appointment_status(id, AppointmentStatus::Cancelled)
        .await?
        .ok_or_else(|| BookingError::not_found("Appointment not found"))?;

    info!("Appointment {} cancelled by its owner", id);
    Ok(Json(
        ApiResponse::ok(Appointment::try_from(cancelled)?).with_message("Appointment cancelled"),
    ))
}

#[axum::debug_handler]
pub async fn justify_appointment(
    State(state): State<Arc<ApiState>>,
    caller: AuthUser,
    JsonBody(payload): JsonBody<JustifyRequest>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let id = payload
        .appointment_id
        .ok_or_else(|| BookingError::validation("Appointment is required"))?;
    let justification = validation::validate_justification(
        payload.justification.as_deref().unwrap_or_default(),
    )?;

    let appointment = state
        .store
        .find_appointment(id)
        .await?
        .ok_or_else(|| BookingError::not_found("Appointment not found"))?;
    if appointment.user_id != caller.user_id {
        return Err(BookingError::Authorization(
            "You cannot justify this appointment".to_string(),
        )
        .into());
    }
    if appointment.status != AppointmentStatus::NoShow.as_str() {
        return Err(
            BookingError::conflict("Only missed (NO_SHOW) appointments can be justified").into(),
        );
    }
    if appointment.justification.is_some() {
        return Err(already_justified().into());
    }

    let updated = state
        .store
        .update_appointment_justification(id, &justification, state.clock.now())
        .await?
        .ok_or_else(already_justified)?;

    info!("Appointment {} justified", id);
    Ok(Json(
        ApiResponse::ok(Appointment::try_from(updated)?).with_message("Justification submitted"),
    ))
}

fn already_justified() -> BookingError {
    BookingError::conflict("This appointment has already been justified")
}
