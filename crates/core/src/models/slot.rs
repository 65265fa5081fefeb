use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of the recurring weekly agenda, not a concrete date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlot {
    pub id: Uuid,
    /// 0 = Sunday ... 6 = Saturday.
    pub day_of_week: i16,
    pub time: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequest {
    pub day_of_week: i16,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSlotRequest {
    pub active: bool,
}

/// Why a date yields no bookable times.
///
/// A fully booked day has no reason: the list is simply empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotReason {
    PastDate,
    ClosedWeekday,
    NoTemplate,
}

impl SlotReason {
    pub fn message(&self) -> &'static str {
        match self {
            SlotReason::PastDate => "Bookings cannot be made for past dates",
            SlotReason::ClosedWeekday => "The salon is closed on this weekday",
            SlotReason::NoTemplate => "No times are configured for this day",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotAvailability {
    pub times: Vec<String>,
    pub reason: Option<SlotReason>,
}

impl SlotAvailability {
    pub fn open(times: Vec<String>) -> Self {
        Self { times, reason: None }
    }

    pub fn unavailable(reason: SlotReason) -> Self {
        Self {
            times: Vec::new(),
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableSlotsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    pub success: bool,
    pub data: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlotReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<SlotAvailability> for AvailableSlotsResponse {
    fn from(availability: SlotAvailability) -> Self {
        Self {
            success: true,
            data: availability.times,
            message: availability.reason.map(|r| r.message().to_string()),
            reason: availability.reason,
        }
    }
}
