//! Tests for the account handlers.

use super::*;
use crate::domain::ports::{MockLoginService, MockRegistrationService, MockUserProfileQuery};
use crate::domain::{ErrorCode, UserId};
use crate::inbound::http::test_utils::{session_cookie, signed_in, test_app, unused_state};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug)]
struct ValidationExpectation<'a> {
    field: &'a str,
    code: &'a str,
}

fn details_of(value: &Value) -> (&str, &str) {
    let details = value.get("details").expect("details present");
    (
        details.get("field").and_then(Value::as_str).expect("field"),
        details.get("code").and_then(Value::as_str).expect("code"),
    )
}

#[rstest]
#[case("   ", "password", ValidationExpectation { field: "username", code: "empty_username" })]
#[case("admin", "", ValidationExpectation { field: "password", code: "empty_password" })]
#[actix_web::test]
async fn login_rejects_blank_fields(
    #[case] username: &str,
    #[case] password: &str,
    #[case] expected: ValidationExpectation<'_>,
) {
    let app = actix_test::init_service(test_app(unused_state(), configure)).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(LoginRequest {
                username: username.into(),
                password: password.into(),
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(res).await;
    assert_eq!(value.get("code").and_then(Value::as_str), Some("invalid_request"));
    assert_eq!(details_of(&value), (expected.field, expected.code));
}

#[actix_web::test]
async fn login_sets_a_session_that_me_resolves() {
    let mut login_service = MockLoginService::new();
    login_service
        .expect_authenticate()
        .withf(|creds| creds.username() == "till.operator" && creds.password() == "pw-123456")
        .times(1)
        .returning(|_| Ok(UserId::new(12)));
    let mut profile = MockUserProfileQuery::new();
    profile
        .expect_fetch_profile()
        .withf(|id| *id == UserId::new(12))
        .times(1)
        .returning(|id| Ok(User::new(id, "till.operator")));

    let mut state = unused_state();
    state.login = Arc::new(login_service);
    state.profile = Arc::new(profile);
    let app = actix_test::init_service(test_app(state, configure)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(LoginRequest {
                username: " Till.Operator ".into(),
                password: "pw-123456".into(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: UserResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.id, 12);
    assert_eq!(body.username, "till.operator");
}

#[actix_web::test]
async fn login_failure_is_unauthorised() {
    let mut login_service = MockLoginService::new();
    login_service
        .expect_authenticate()
        .returning(|_| Err(Error::unauthorized("invalid credentials")));
    let mut state = unused_state();
    state.login = Arc::new(login_service);
    let app = actix_test::init_service(test_app(state, configure)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(LoginRequest {
                username: "admin".into(),
                password: "wrong-password".into(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.response().cookies().next().is_none());
}

#[rstest]
#[case("ab", "long-enough-pw", "username", "username_length")]
#[case("till operator", "long-enough-pw", "username", "username_characters")]
#[case("till.operator", "short", "password", "password_too_short")]
#[actix_web::test]
async fn register_validates_before_calling_the_service(
    #[case] username: &str,
    #[case] password: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(unused_state(), configure)).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(RegisterRequest {
                username: username.into(),
                password: password.into(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(res).await;
    assert_eq!(details_of(&value), (field, code));
}

#[actix_web::test]
async fn register_creates_the_account() {
    let mut registration = MockRegistrationService::new();
    registration
        .expect_register()
        .withf(|reg| reg.username() == "till.operator")
        .times(1)
        .returning(|reg| Ok(User::new(UserId::new(3), reg.username())));
    let mut state = unused_state();
    state.registration = Arc::new(registration);
    let app = actix_test::init_service(test_app(state, configure)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(RegisterRequest {
                username: "Till.Operator".into(),
                password: "long-enough-pw".into(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: UserResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.id, 3);
}

#[actix_web::test]
async fn duplicate_registration_is_a_conflict() {
    let mut registration = MockRegistrationService::new();
    registration.expect_register().returning(|_| {
        Err(Error::conflict("username already taken")
            .with_details(serde_json::json!({ "code": "username_taken" })))
    });
    let mut state = unused_state();
    state.registration = Arc::new(registration);
    let app = actix_test::init_service(test_app(state, configure)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(RegisterRequest {
                username: "till.operator".into(),
                password: "long-enough-pw".into(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Error = actix_test::read_body_json(res).await;
    assert_eq!(body.code(), ErrorCode::Conflict);
}

#[actix_web::test]
async fn me_requires_a_session() {
    let app = actix_test::init_service(test_app(unused_state(), configure)).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/me").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_clears_the_session() {
    let mut profile = MockUserProfileQuery::new();
    profile.expect_fetch_profile().never();
    let mut state = unused_state();
    state.profile = Arc::new(profile);
    let app = actix_test::init_service(test_app(state, configure)).await;
    let cookie = signed_in(&app).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cleared = session_cookie(&res);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cleared)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
