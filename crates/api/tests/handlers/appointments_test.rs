use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use salon_api::handlers::appointments::SLOT_TAKEN_MESSAGE;
use salon_core::models::{appointment::AppointmentStatus, user::Role};
use salon_db::{
    BookingStore,
    mock::MockBookingStore,
    models::{DbService, DbUser},
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{AUTHORIZATION, TestContext, bearer, date, server_with_store, token_for};

fn booking_body(service_id: Uuid, date: &str, time: &str) -> Value {
    json!({ "serviceId": service_id, "date": date, "time": time })
}

#[tokio::test]
async fn booking_creates_pending_appointment_for_caller() {
    let ctx = TestContext::new();
    let (client, token) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Corte Feminino").await;

    let response = ctx
        .server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "serviceId": service.id,
            "date": "2026-10-28",
            "time": "10:00",
            "notes": "  Primeira vez  "
        }))
        .expect_success()
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["status"], json!("PENDING"));
    assert_eq!(body["data"]["userId"], json!(client.id));
    assert_eq!(body["data"]["notes"], json!("Primeira vez"));
    assert_eq!(body["data"]["service"]["name"], json!("Corte Feminino"));

    let stored = ctx.store.list_appointments_for_user(client.id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn second_booking_of_same_slot_is_a_conflict() {
    let ctx = TestContext::new();
    let (_, first_token) = ctx.signed_in(Role::Client).await;
    let (_, second_token) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Iluminados").await;
    let body = booking_body(service.id, "2026-10-28", "11:00");

    ctx.server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&first_token))
        .json(&body)
        .expect_success()
        .await;

    let response = ctx
        .server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&second_token))
        .json(&body)
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": false, "error": SLOT_TAKEN_MESSAGE })
    );
}

#[tokio::test]
async fn cancelled_slot_can_be_booked_again() {
    let ctx = TestContext::new();
    let (client, token) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Corte").await;
    ctx.booking(client.id, service.id, "2026-10-28", "11:00", AppointmentStatus::Cancelled)
        .await;

    ctx.server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&booking_body(service.id, "2026-10-28", "11:00"))
        .expect_success()
        .await;
}

#[tokio::test]
async fn unknown_service_is_checked_before_slot() {
    let ctx = TestContext::new();
    let (client, token) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Corte").await;
    ctx.booking(client.id, service.id, "2026-10-28", "11:00", AppointmentStatus::Confirmed)
        .await;

    let response = ctx
        .server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&booking_body(Uuid::new_v4(), "2026-10-28", "11:00"))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case::no_service(json!({ "date": "2026-10-28", "time": "10:00" }))]
#[case::no_date(json!({ "serviceId": Uuid::nil(), "time": "10:00" }))]
#[case::bad_date(json!({ "serviceId": Uuid::nil(), "date": "28-10-2026", "time": "10:00" }))]
#[case::unpadded_time(json!({ "serviceId": Uuid::nil(), "date": "2026-10-28", "time": "9:00" }))]
#[case::long_notes(json!({
    "serviceId": Uuid::nil(), "date": "2026-10-28", "time": "10:00", "notes": "x".repeat(501)
}))]
#[tokio::test]
async fn malformed_booking_is_rejected(#[case] body: Value) {
    let ctx = TestContext::new();
    let (_, token) = ctx.signed_in(Role::Client).await;

    let response = ctx
        .server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&body)
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[case::non_uuid_service(json!({ "serviceId": "corte", "date": "2026-10-28", "time": "10:00" }))]
#[case::numeric_date(json!({ "serviceId": Uuid::nil(), "date": 20261028, "time": "10:00" }))]
#[tokio::test]
async fn undecodable_booking_body_gets_the_error_envelope(#[case] body: Value) {
    let ctx = TestContext::new();
    let (_, token) = ctx.signed_in(Role::Client).await;

    let response = ctx
        .server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&body)
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn body_without_json_content_type_gets_the_error_envelope() {
    let ctx = TestContext::new();
    let (_, token) = ctx.signed_in(Role::Client).await;

    let response = ctx
        .server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&token))
        .text("serviceId=1")
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], json!(false));
}

#[rstest]
#[case::inner_space("09: 5", StatusCode::BAD_REQUEST)]
#[case::single_digit_minute("09:5", StatusCode::BAD_REQUEST)]
#[case::surrounding_spaces(" 09:05 ", StatusCode::CONFLICT)]
#[tokio::test]
async fn only_the_canonical_time_spelling_is_booked(
    #[case] time: &str,
    #[case] expected: StatusCode,
) {
    let ctx = TestContext::new();
    let (_, first_token) = ctx.signed_in(Role::Client).await;
    let (_, second_token) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Corte").await;

    ctx.server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&first_token))
        .json(&booking_body(service.id, "2026-10-28", "09:05"))
        .expect_success()
        .await;

    let response = ctx
        .server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&second_token))
        .json(&booking_body(service.id, "2026-10-28", time))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), expected);
    let held = ctx
        .store
        .find_appointments_by_date_and_statuses(
            date("2026-10-28"),
            &AppointmentStatus::OCCUPYING,
        )
        .await
        .unwrap();
    assert_eq!(held.len(), 1);
}

#[tokio::test]
async fn booking_requires_a_session() {
    let ctx = TestContext::new();
    let service = ctx.service("Corte").await;

    let response = ctx
        .server
        .post("/api/appointments")
        .json(&booking_body(service.id, "2026-10-28", "10:00"))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn insert_losing_a_race_reports_slot_taken() {
    let now = Utc::now();
    let client = DbUser {
        id: Uuid::new_v4(),
        name: "Maria Silva".to_string(),
        email: "maria@example.com".to_string(),
        password_hash: "hash".to_string(),
        phone: None,
        birth_date: None,
        role: "CLIENT".to_string(),
        created_at: now,
        updated_at: now,
    };
    let service = DbService {
        id: Uuid::new_v4(),
        name: "Corte".to_string(),
        description: String::new(),
        price: Decimal::new(12000, 2),
        duration_minutes: 60,
        active: true,
        created_at: now,
    };
    let token = token_for(&client);

    let mut store = MockBookingStore::new();
    let user = client.clone();
    store
        .expect_find_user()
        .returning(move |_| Ok(Some(user.clone())));
    let found = service.clone();
    store
        .expect_find_service()
        .returning(move |_| Ok(Some(found.clone())));
    // The pre-check sees a free slot...
    store
        .expect_find_appointments_by_date_and_statuses()
        .returning(|_, _| Ok(Vec::new()));
    // ...but a concurrent booking wins the insert.
    store
        .expect_create_appointment()
        .times(1)
        .returning(|_| Ok(None));
    let server = server_with_store(Arc::new(store));

    let response = server
        .post("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&booking_body(service.id, "2026-10-28", "10:00"))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], json!(SLOT_TAKEN_MESSAGE));
}

#[tokio::test]
async fn client_lists_only_own_appointments_newest_first() {
    let ctx = TestContext::new();
    let (client, token) = ctx.signed_in(Role::Client).await;
    let (other, _) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Corte").await;
    ctx.booking(client.id, service.id, "2026-10-28", "10:00", AppointmentStatus::Pending)
        .await;
    ctx.booking(client.id, service.id, "2026-11-04", "10:00", AppointmentStatus::Confirmed)
        .await;
    ctx.booking(other.id, service.id, "2026-10-28", "11:00", AppointmentStatus::Pending)
        .await;

    let body = ctx
        .server
        .get("/api/appointments")
        .add_header(AUTHORIZATION, bearer(&token))
        .expect_success()
        .await
        .json::<Value>();

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["date"], json!("2026-11-04"));
    assert_eq!(data[1]["date"], json!("2026-10-28"));
    assert!(data[0].get("user").is_none());
    assert_eq!(data[0]["service"]["id"], json!(service.id));
}

#[tokio::test]
async fn client_cancels_own_appointment_but_not_others() {
    let ctx = TestContext::new();
    let (client, token) = ctx.signed_in(Role::Client).await;
    let (other, _) = ctx.signed_in(Role::Client).await;
    let service = ctx.service("Corte").await;
    let own = ctx
        .booking(client.id, service.id, "2026-10-28", "10:00", AppointmentStatus::Pending)
        .await;
    let foreign = ctx
        .booking(other.id, service.id, "2026-10-28", "11:00", AppointmentStatus::Pending)
        .await;

    let body = ctx
        .server
        .delete(&format!("/api/appointments/{}", own.id))
        .add_header(AUTHORIZATION, bearer(&token))
        .expect_success()
        .await
        .json::<Value>();
    assert_eq!(body["data"]["status"], json!("CANCELLED"));

    let response = ctx
        .server
        .delete(&format!("/api/appointments/{}", foreign.id))
        .add_header(AUTHORIZATION, bearer(&token))
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let untouched = ctx.store.find_appointment(foreign.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, "PENDING");

    let response = ctx
        .server
        .delete(&format!("/api/appointments/{}", Uuid::new_v4()))
        .add_header(AUTHORIZATION, bearer(&token))
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

mod justification {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn justify(ctx: &TestContext, token: &str, id: Uuid, text: &str) -> axum_test::TestResponse {
        ctx.server
            .post("/api/appointments/justify")
            .add_header(AUTHORIZATION, bearer(token))
            .json(&json!({ "appointmentId": id, "justification": text }))
            .await
    }

    #[tokio::test]
    async fn only_no_show_appointments_can_be_justified() {
        let ctx = TestContext::new();
        let (client, token) = ctx.signed_in(Role::Client).await;
        let service = ctx.service("Corte").await;
        let appointment = ctx
            .booking(client.id, service.id, "2026-10-14", "10:00", AppointmentStatus::Completed)
            .await;

        let response = justify(&ctx, &token, appointment.id, "Estava doente, desculpe").await;

        assert_eq!(response.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn nine_characters_fail_and_ten_succeed() {
        let ctx = TestContext::new();
        let (client, token) = ctx.signed_in(Role::Client).await;
        let service = ctx.service("Corte").await;
        let appointment = ctx
            .booking(client.id, service.id, "2026-10-14", "10:00", AppointmentStatus::NoShow)
            .await;

        let short = justify(&ctx, &token, appointment.id, "  123456789  ").await;
        assert_eq!(short.status_code(), StatusCode::BAD_REQUEST);

        let ok = justify(&ctx, &token, appointment.id, "  1234567890  ").await;
        assert_eq!(ok.status_code(), StatusCode::OK);
        let body = ok.json::<Value>();
        assert_eq!(body["data"]["justification"], json!("1234567890"));
        assert!(body["data"]["justifiedAt"].is_string());
    }

    #[tokio::test]
    async fn second_justification_is_refused() {
        let ctx = TestContext::new();
        let (client, token) = ctx.signed_in(Role::Client).await;
        let service = ctx.service("Corte").await;
        let appointment = ctx
            .booking(client.id, service.id, "2026-10-14", "10:00", AppointmentStatus::NoShow)
            .await;

        let first = justify(&ctx, &token, appointment.id, "Tive um imprevisto no trabalho").await;
        assert_eq!(first.status_code(), StatusCode::OK);

        let second = justify(&ctx, &token, appointment.id, "Outra justificativa qualquer").await;
        assert_eq!(second.status_code(), StatusCode::CONFLICT);

        let stored = ctx.store.find_appointment(appointment.id).await.unwrap().unwrap();
        assert_eq!(
            stored.justification.as_deref(),
            Some("Tive um imprevisto no trabalho")
        );
    }

    #[tokio::test]
    async fn justification_is_limited_to_own_appointments() {
        let ctx = TestContext::new();
        let (owner, _) = ctx.signed_in(Role::Client).await;
        let (_, intruder_token) = ctx.signed_in(Role::Client).await;
        let service = ctx.service("Corte").await;
        let appointment = ctx
            .booking(owner.id, service.id, "2026-10-14", "10:00", AppointmentStatus::NoShow)
            .await;

        let response =
            justify(&ctx, &intruder_token, appointment.id, "Não fui por motivo de saúde").await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        let missing = justify(&ctx, &intruder_token, Uuid::new_v4(), "Não fui por motivo de saúde").await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn over_long_justification_is_rejected() {
        let ctx = TestContext::new();
        let (client, token) = ctx.signed_in(Role::Client).await;
        let service = ctx.service("Corte").await;
        let appointment = ctx
            .booking(client.id, service.id, "2026-10-14", "10:00", AppointmentStatus::NoShow)
            .await;

        let response = justify(&ctx, &token, appointment.id, &"a".repeat(501)).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let response = justify(&ctx, &token, appointment.id, &"a".repeat(500)).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }
}
