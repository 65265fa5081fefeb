//! # Slot availability rules
//!
//! Turns the weekly agenda template into the bookable times of one concrete
//! date. The functions here are pure: the caller supplies the template times,
//! the times already taken and the current local instant.
//!
//! Resolution order for a date:
//!
//! 1. A date before the salon's today yields nothing, whatever the template
//!    or bookings say (`PastDate`).
//! 2. The universal closing weekday yields nothing (`ClosedWeekday`).
//! 3. An empty template for the weekday yields nothing (`NoTemplate`).
//! 4. Otherwise the template times minus the taken times, in template order.
//!    For today only times strictly after the current hour:minute survive.

use std::collections::HashSet;

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;

use crate::{
    errors::{BookingError, BookingResult},
    models::slot::SlotReason,
};

/// Where and when the salon operates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalonCalendar {
    pub timezone: Tz,
    pub closed_weekday: Option<Weekday>,
}

impl Default for SalonCalendar {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            closed_weekday: Some(Weekday::Sun),
        }
    }
}

impl SalonCalendar {
    /// Wall-clock time at the salon for the given instant.
    pub fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.timezone).naive_local()
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local_now(now).date()
    }

    /// Reason a date cannot be booked before any template is consulted.
    pub fn closure_reason(&self, date: NaiveDate, local_now: NaiveDateTime) -> Option<SlotReason> {
        if date < local_now.date() {
            return Some(SlotReason::PastDate);
        }
        if self.closed_weekday == Some(date.weekday()) {
            return Some(SlotReason::ClosedWeekday);
        }
        None
    }
}

/// Day-of-week index used by the agenda template (0 = Sunday).
pub fn day_of_week(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

pub fn weekday_from_index(index: i16) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub fn parse_date(raw: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::validation(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

/// Accepts only zero-padded `HH:MM`, so string order matches time order.
pub fn parse_time(raw: &str) -> BookingResult<NaiveTime> {
    let invalid = || BookingError::validation(format!("Invalid time '{raw}', expected HH:MM"));
    let time = NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| invalid())?;
    // chrono tolerates spaces and single digits; only the canonical spelling is stored.
    if time.format("%H:%M").to_string() != raw {
        return Err(invalid());
    }
    Ok(time)
}

/// Template times minus the taken ones, in template order.
///
/// When `date` is the local today, only times strictly later than the current
/// hour and minute are kept. Past dates yield nothing.
pub fn open_times<I>(
    date: NaiveDate,
    local_now: NaiveDateTime,
    template_times: I,
    taken: &HashSet<String>,
) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let today = local_now.date();
    if date < today {
        return Vec::new();
    }

    let cutoff = (local_now.hour(), local_now.minute());
    template_times
        .into_iter()
        .filter(|time| !taken.contains(time))
        .filter(|time| {
            if date > today {
                return true;
            }
            match parse_time(time) {
                Ok(t) => (t.hour(), t.minute()) > cutoff,
                Err(_) => false,
            }
        })
        .collect()
}
