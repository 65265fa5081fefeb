use axum::http::StatusCode;
use chrono::Duration;
use rstest::rstest;
use salon_api::{handlers::auth::FORGOT_PASSWORD_MESSAGE, middleware::auth};
use salon_core::models::user::Role;
use salon_db::BookingStore;
use serde_json::{Value, json};

use crate::test_utils::{AUTHORIZATION, TestContext, bearer, now};

const PASSWORD: &str = "Segura#2026";

mod register {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn creates_a_client_account() {
        let ctx = TestContext::new();

        let response = ctx
            .server
            .post("/api/auth/register")
            .json(&json!({
                "name": "  Maria Souza ",
                "email": " Maria@Salon.Test ",
                "password": PASSWORD,
                "phone": "(84) 99999-9999",
                "birthDate": "1990-05-10",
            }))
            .expect_success()
            .await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["data"]["name"], json!("Maria Souza"));
        assert_eq!(body["data"]["email"], json!("maria@salon.test"));
        assert_eq!(body["data"]["role"], json!("CLIENT"));
        assert!(body["data"].get("passwordHash").is_none());

        let stored = ctx
            .store
            .find_user_by_email("maria@salon.test")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, PASSWORD);
        assert!(auth::verify_password(PASSWORD, &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let ctx = TestContext::new();
        ctx.user_with(Role::Client, "maria@salon.test", "hash").await;

        let response = ctx
            .server
            .post("/api/auth/register")
            .json(&json!({
                "name": "Maria Souza",
                "email": "MARIA@salon.test",
                "password": PASSWORD,
            }))
            .expect_failure()
            .await;

        assert_eq!(response.status_code(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[case::missing_name(json!({ "email": "a@b.co", "password": PASSWORD }))]
    #[case::single_word_name(json!({ "name": "Maria", "email": "a@b.co", "password": PASSWORD }))]
    #[case::bad_email(json!({ "name": "Maria Souza", "email": "not-an-email", "password": PASSWORD }))]
    #[case::weak_password(json!({ "name": "Maria Souza", "email": "a@b.co", "password": "password" }))]
    #[case::short_phone(json!({
        "name": "Maria Souza", "email": "a@b.co", "password": PASSWORD, "phone": "9999-999"
    }))]
    #[case::too_young(json!({
        "name": "Maria Souza", "email": "a@b.co", "password": PASSWORD, "birthDate": "2015-01-01"
    }))]
    #[tokio::test]
    async fn invalid_input_is_rejected(#[case] body: Value) {
        let ctx = TestContext::new();

        let response = ctx
            .server
            .post("/api/auth/register")
            .json(&body)
            .expect_failure()
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(ctx.store.find_user_by_email("a@b.co").await.unwrap().is_none());
    }
}

mod session {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn login_issues_a_token_accepted_by_me() {
        let ctx = TestContext::new();
        let hash = auth::hash_password(PASSWORD).unwrap();
        let user = ctx.user_with(Role::Admin, "ana@salon.test", &hash).await;

        let body = ctx
            .server
            .post("/api/auth/login")
            .json(&json!({ "email": "  ANA@Salon.test ", "password": PASSWORD }))
            .expect_success()
            .await
            .json::<Value>();

        assert_eq!(body["data"]["user"]["id"], json!(user.id));
        assert_eq!(body["data"]["user"]["role"], json!("ADMIN"));
        let token = body["data"]["token"].as_str().unwrap();

        let me = ctx
            .server
            .get("/api/auth/me")
            .add_header(AUTHORIZATION, bearer(token))
            .expect_success()
            .await
            .json::<Value>();
        assert_eq!(me["data"]["email"], json!("ana@salon.test"));
    }

    #[rstest]
    #[case::wrong_password("ana@salon.test", "Errada#2026")]
    #[case::unknown_email("ghost@salon.test", PASSWORD)]
    #[tokio::test]
    async fn bad_credentials_are_unauthorized(#[case] email: &str, #[case] password: &str) {
        let ctx = TestContext::new();
        let hash = auth::hash_password(PASSWORD).unwrap();
        ctx.user_with(Role::Client, "ana@salon.test", &hash).await;

        let response = ctx
            .server
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .expect_failure()
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<Value>()["error"],
            json!("Invalid email or password")
        );
    }

    #[tokio::test]
    async fn me_requires_a_valid_token() {
        let ctx = TestContext::new();

        let response = ctx.server.get("/api/auth/me").expect_failure().await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

        let response = ctx
            .server
            .get("/api/auth/me")
            .add_header(AUTHORIZATION, bearer("not.a.jwt"))
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}

mod password_reset {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn unknown_email_gets_the_same_answer_without_a_link() {
        let ctx = TestContext::new();

        let body = ctx
            .server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "ghost@salon.test" }))
            .expect_success()
            .await
            .json::<Value>();

        assert_eq!(
            body,
            json!({ "success": true, "message": FORGOT_PASSWORD_MESSAGE })
        );
    }

    #[tokio::test]
    async fn full_reset_flow_changes_the_password_once() {
        let ctx = TestContext::new();
        let hash = auth::hash_password(PASSWORD).unwrap();
        let user = ctx.user_with(Role::Client, "ana@salon.test", &hash).await;

        let body = ctx
            .server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "ana@salon.test" }))
            .expect_success()
            .await
            .json::<Value>();
        assert_eq!(body["message"], json!(FORGOT_PASSWORD_MESSAGE));
        let token = body["data"]["token"].as_str().unwrap().to_string();
        assert_eq!(token.len(), 64);
        assert_eq!(
            body["data"]["resetUrl"],
            json!(format!("https://salon.test/reset-password?token={token}"))
        );

        let info = ctx
            .server
            .get("/api/auth/reset-password")
            .add_query_param("token", &token)
            .expect_success()
            .await
            .json::<Value>();
        assert_eq!(info["data"], json!({ "email": "ana@salon.test", "name": user.name }));

        let new_password = "Nova$Senha9";
        ctx.server
            .post("/api/auth/reset-password")
            .json(&json!({ "token": token, "password": new_password }))
            .expect_success()
            .await;

        ctx.server
            .post("/api/auth/login")
            .json(&json!({ "email": "ana@salon.test", "password": new_password }))
            .expect_success()
            .await;

        let reused = ctx
            .server
            .post("/api/auth/reset-password")
            .json(&json!({ "token": token, "password": "Outra&Senha1" }))
            .expect_failure()
            .await;
        assert_eq!(reused.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn new_request_invalidates_the_previous_link() {
        let ctx = TestContext::new();
        ctx.user_with(Role::Client, "ana@salon.test", "hash").await;

        let mut tokens = Vec::new();
        for _ in 0..2 {
            let body = ctx
                .server
                .post("/api/auth/forgot-password")
                .json(&json!({ "email": "ana@salon.test" }))
                .expect_success()
                .await
                .json::<Value>();
            tokens.push(body["data"]["token"].as_str().unwrap().to_string());
        }

        let stale = ctx
            .server
            .get("/api/auth/reset-password")
            .add_query_param("token", &tokens[0])
            .expect_failure()
            .await;
        assert_eq!(stale.status_code(), StatusCode::BAD_REQUEST);

        ctx.server
            .get("/api/auth/reset-password")
            .add_query_param("token", &tokens[1])
            .expect_success()
            .await;
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let ctx = TestContext::new();
        let user = ctx.user_with(Role::Client, "ana@salon.test", "hash").await;
        ctx.store
            .issue_password_reset(
                user.id,
                "expired-token",
                now() - Duration::minutes(1),
                now() - Duration::hours(1),
            )
            .await
            .unwrap();

        let response = ctx
            .server
            .post("/api/auth/reset-password")
            .json(&json!({ "token": "expired-token", "password": "Nova$Senha9" }))
            .expect_failure()
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert!(
            response.json::<Value>()["error"]
                .as_str()
                .unwrap()
                .contains("expired")
        );
    }

    #[rstest]
    #[case::missing(None)]
    #[case::unknown(Some("does-not-exist"))]
    #[tokio::test]
    async fn missing_or_unknown_token_is_rejected(#[case] token: Option<&str>) {
        let ctx = TestContext::new();
        let mut request = ctx.server.get("/api/auth/reset-password");
        if let Some(token) = token {
            request = request.add_query_param("token", token);
        }

        let response = request.expect_failure().await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
