use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use salon_api::middleware::error_handling::INTERNAL_ERROR_MESSAGE;
use salon_core::models::{appointment::AppointmentStatus, user::Role};
use salon_db::mock::MockBookingStore;
use serde_json::{Value, json};

use crate::test_utils::{TestContext, server_with_store};

const WEDNESDAY: i16 = 3;

async fn slots_for(ctx: &TestContext, day: &str) -> Value {
    ctx.server
        .get("/api/available-slots")
        .add_query_param("date", day)
        .expect_success()
        .await
        .json::<Value>()
}

#[tokio::test]
async fn confirmed_booking_is_removed_from_next_wednesday() {
    let ctx = TestContext::new();
    let (client, _) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Corte Feminino").await;
    ctx.template(WEDNESDAY, &["10:00", "11:00", "14:00"]).await;
    ctx.booking(client.id, service.id, "2026-10-28", "11:00", AppointmentStatus::Confirmed)
        .await;

    let body = slots_for(&ctx, "2026-10-28").await;

    assert_eq!(body, json!({ "success": true, "data": ["10:00", "14:00"] }));
}

#[tokio::test]
async fn future_date_without_bookings_returns_whole_template_in_order() {
    let ctx = TestContext::new();
    ctx.template(WEDNESDAY, &["14:00", "09:00", "11:00"]).await;

    let body = slots_for(&ctx, "2026-11-04").await;

    assert_eq!(body["data"], json!(["09:00", "11:00", "14:00"]));
    assert!(body.get("reason").is_none());
}

#[tokio::test]
async fn today_keeps_only_later_free_times() {
    let ctx = TestContext::new();
    let (client, _) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Escova").await;
    ctx.template(WEDNESDAY, &["10:00", "12:30", "13:00", "14:00"]).await;
    ctx.booking(client.id, service.id, "2026-10-21", "14:00", AppointmentStatus::Pending)
        .await;

    let body = slots_for(&ctx, "2026-10-21").await;

    assert_eq!(body["data"], json!(["13:00"]));
}

#[tokio::test]
async fn cancelled_and_completed_bookings_do_not_hold_a_slot() {
    let ctx = TestContext::new();
    let (client, _) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Hidratação").await;
    ctx.template(WEDNESDAY, &["10:00", "11:00"]).await;
    ctx.booking(client.id, service.id, "2026-10-28", "10:00", AppointmentStatus::Cancelled)
        .await;
    ctx.booking(client.id, service.id, "2026-10-28", "11:00", AppointmentStatus::Completed)
        .await;

    let body = slots_for(&ctx, "2026-10-28").await;

    assert_eq!(body["data"], json!(["10:00", "11:00"]));
}

#[tokio::test]
async fn fully_booked_day_has_no_reason() {
    let ctx = TestContext::new();
    let (client, _) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Corte").await;
    ctx.template(WEDNESDAY, &["10:00"]).await;
    ctx.booking(client.id, service.id, "2026-10-28", "10:00", AppointmentStatus::Pending)
        .await;

    let body = slots_for(&ctx, "2026-10-28").await;

    assert_eq!(body, json!({ "success": true, "data": [] }));
}

#[rstest]
#[case::yesterday("2026-10-20", "PAST_DATE")]
#[case::past_sunday("2026-10-18", "PAST_DATE")]
#[case::last_year("2025-10-22", "PAST_DATE")]
#[case::sunday("2026-10-25", "CLOSED_WEEKDAY")]
#[case::monday_without_template("2026-10-26", "NO_TEMPLATE")]
#[tokio::test]
async fn unavailable_dates_report_a_reason(#[case] day: &str, #[case] reason: &str) {
    let ctx = TestContext::new();
    for weekday in 0..=6 {
        if weekday != 1 {
            ctx.template(weekday, &["10:00", "15:00"]).await;
        }
    }

    let body = slots_for(&ctx, day).await;

    assert_eq!(body["data"], json!([]));
    assert_eq!(body["reason"], json!(reason));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn past_date_is_answered_without_reading_the_store() {
    // No expectations: any store call would panic.
    let server = server_with_store(Arc::new(MockBookingStore::new()));

    let body = server
        .get("/api/available-slots")
        .add_query_param("date", "2026-01-07")
        .expect_success()
        .await
        .json::<Value>();

    assert_eq!(body["reason"], json!("PAST_DATE"));
}

#[tokio::test]
async fn empty_template_skips_appointment_lookup() {
    let mut store = MockBookingStore::new();
    store
        .expect_find_active_slots_by_weekday()
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let server = server_with_store(Arc::new(store));

    let body = server
        .get("/api/available-slots")
        .add_query_param("date", "2026-10-28")
        .expect_success()
        .await
        .json::<Value>();

    assert_eq!(body["reason"], json!("NO_TEMPLATE"));
}

#[rstest]
#[case::missing(None)]
#[case::blank(Some(""))]
#[case::wrong_format(Some("28/10/2026"))]
#[case::impossible(Some("2026-02-30"))]
#[tokio::test]
async fn bad_date_is_a_validation_error(#[case] day: Option<&str>) {
    let ctx = TestContext::new();
    let mut request = ctx.server.get("/api/available-slots");
    if let Some(day) = day {
        request = request.add_query_param("date", day);
    }

    let response = request.expect_failure().await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], json!(false));
}

#[test_log::test(tokio::test)]
async fn store_failure_is_reported_as_generic_internal_error() {
    let mut store = MockBookingStore::new();
    store
        .expect_find_active_slots_by_weekday()
        .returning(|_| Err(eyre::eyre!("connection reset by peer")));
    let server = server_with_store(Arc::new(store));

    let response = server
        .get("/api/available-slots")
        .add_query_param("date", "2026-10-28")
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": false, "error": INTERNAL_ERROR_MESSAGE })
    );
}
