//! # Availability Handlers
//!
//! Resolves the bookable times of one date from the weekly agenda template
//! and the appointments already holding a slot on that date.
//!
//! Store reads happen in stages and stop as soon as the answer is known: a
//! past date or the closing weekday needs no reads, an empty template needs
//! no appointment read.

use std::{collections::HashSet, sync::Arc};

use axum::{
    Json,
    extract::State,
};
use chrono::{DateTime, NaiveDate, Utc};
use salon_core::{
    availability::{SalonCalendar, day_of_week, open_times, parse_date},
    errors::BookingError,
    models::{
        appointment::AppointmentStatus,
        slot::{AvailableSlotsQuery, AvailableSlotsResponse, SlotAvailability, SlotReason},
    },
};
use salon_db::BookingStore;
use tracing::debug;

use crate::{
    ApiState,
    middleware::{error_handling::AppError, extract::QueryParams},
};

/// Bookable times for `date`, or the reason there are none.
pub async fn resolve_availability(
    store: &dyn BookingStore,
    calendar: &SalonCalendar,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> eyre::Result<SlotAvailability> {
    let local_now = calendar.local_now(now);
    if let Some(reason) = calendar.closure_reason(date, local_now) {
        return Ok(SlotAvailability::unavailable(reason));
    }

    let template = store.find_active_slots_by_weekday(day_of_week(date)).await?;
    if template.is_empty() {
        return Ok(SlotAvailability::unavailable(SlotReason::NoTemplate));
    }

    let taken: HashSet<String> = store
        .find_appointments_by_date_and_statuses(date, &AppointmentStatus::OCCUPYING)
        .await?
        .into_iter()
        .map(|appointment| appointment.appointment_time)
        .collect();

    let times = open_times(
        date,
        local_now,
        template.into_iter().map(|slot| slot.time_slot),
        &taken,
    );
    debug!("{} open times on {} ({} taken)", times.len(), date, taken.len());
    Ok(SlotAvailability::open(times))
}

#[axum::debug_handler]
pub async fn available_slots(
    State(state): State<Arc<ApiState>>,
    QueryParams(query): QueryParams<AvailableSlotsQuery>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    let raw = query
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| BookingError::validation("Date is required"))?;
    let date = parse_date(raw)?;

    let availability = resolve_availability(
        state.store.as_ref(),
        &state.calendar(),
        date,
        state.clock.now(),
    )
    .await?;

    Ok(Json(availability.into()))
}
