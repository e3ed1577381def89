//! Tests for the account handlers.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::Value;

use super::*;
use crate::domain::UserId;
use crate::inbound::http::test_utils::{memory_state, test_session_middleware};
use crate::outbound::memory::InMemoryUserRepository;

#[derive(Debug)]
struct ValidationExpectation<'a> {
    status: StatusCode,
    top_code: &'a str,
    field: &'a str,
    code: &'a str,
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(register)
                .service(logout)
                .service(current_user),
        )
}

fn registration(username: &str, email: &str, confirm: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_owned(),
        email: email.to_owned(),
        password: "secret".to_owned(),
        confirm_password: confirm.to_owned(),
    }
}

fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

async fn json_body(res: ServiceResponse) -> Value {
    let body = actix_test::read_body(res).await;
    serde_json::from_slice(&body).expect("JSON body")
}

async fn post_json<S>(app: &S, uri: &str, body: &impl serde::Serialize) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = actix_test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    actix_test::call_service(app, req).await
}

async fn get_with<S>(app: &S, uri: &str, cookie: Option<Cookie<'static>>) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut req = actix_test::TestRequest::get().uri(uri);
    if let Some(cookie) = cookie {
        req = req.cookie(cookie);
    }
    actix_test::call_service(app, req.to_request()).await
}

async fn register_ada<S>(app: &S)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = post_json(
        app,
        "/api/v1/register",
        &registration("ada", "ada@example.com", "secret"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

async fn login_as<S>(app: &S, identifier: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = post_json(
        app,
        "/api/v1/login",
        &LoginRequest {
            identifier: identifier.to_owned(),
            password: "secret".to_owned(),
        },
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    session_cookie(&res).expect("session cookie")
}

fn assert_validation(value: &Value, expected: &ValidationExpectation<'_>) {
    assert_eq!(value["code"], expected.top_code);
    assert_eq!(value["details"]["field"], expected.field);
    assert_eq!(value["details"]["code"], expected.code);
}

#[rstest]
#[case("   ", "secret", ValidationExpectation {
    status: StatusCode::BAD_REQUEST,
    top_code: "invalid_request",
    field: "identifier",
    code: "empty_identifier",
})]
#[case("ada", "", ValidationExpectation {
    status: StatusCode::BAD_REQUEST,
    top_code: "invalid_request",
    field: "password",
    code: "empty_password",
})]
#[actix_web::test]
async fn login_rejects_blank_fields(
    #[case] identifier: &str,
    #[case] password: &str,
    #[case] expected: ValidationExpectation<'_>,
) {
    let (state, _) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    let res = post_json(
        &app,
        "/api/v1/login",
        &LoginRequest {
            identifier: identifier.to_owned(),
            password: password.to_owned(),
        },
    )
    .await;
    assert_eq!(res.status(), expected.status);
    assert_validation(&json_body(res).await, &expected);
}

#[rstest]
#[case::username("ada")]
#[case::email("ada@example.com")]
#[case::padded_username("  ada ")]
#[actix_web::test]
async fn login_accepts_email_or_username(#[case] identifier: &str) {
    let (state, _) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    register_ada(&app).await;

    let res = post_json(
        &app,
        "/api/v1/login",
        &LoginRequest {
            identifier: identifier.to_owned(),
            password: "secret".to_owned(),
        },
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_cookie(&res).is_some());
    let profile = json_body(res).await;
    assert_eq!(profile["username"], "ada");
    assert_eq!(profile["email"], "ada@example.com");
    assert!(profile["gender"].is_null());
    assert!(profile.get("createdAt").is_some());
    assert!(profile.get("passwordHash").is_none());
}

#[actix_web::test]
async fn wrong_password_leaves_session_untouched() {
    let (state, _) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    register_ada(&app).await;

    let res = post_json(
        &app,
        "/api/v1/login",
        &LoginRequest {
            identifier: "ada".to_owned(),
            password: "Secret".to_owned(),
        },
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&res).is_none());
    let body = json_body(res).await;
    assert_eq!(body["message"], "invalid credentials");
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn registration_does_not_log_in() {
    let (state, _) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    let res = post_json(
        &app,
        "/api/v1/register",
        &registration("ada", "ada@example.com", "secret"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(session_cookie(&res).is_none());
    assert_eq!(json_body(res).await["username"], "ada");
}

#[rstest]
#[case::taken_email(
    registration("grace", "ada@example.com", "different"),
    ValidationExpectation {
        status: StatusCode::CONFLICT,
        top_code: "conflict",
        field: "email",
        code: "duplicate",
    }
)]
#[case::taken_username(
    registration("ada", "grace@example.com", "different"),
    ValidationExpectation {
        status: StatusCode::CONFLICT,
        top_code: "conflict",
        field: "username",
        code: "duplicate",
    }
)]
#[case::mismatch(
    registration("grace", "grace@example.com", "different"),
    ValidationExpectation {
        status: StatusCode::BAD_REQUEST,
        top_code: "invalid_request",
        field: "confirm_password",
        code: "mismatch",
    }
)]
#[case::bad_email(
    registration("grace", "grace.example.com", "secret"),
    ValidationExpectation {
        status: StatusCode::BAD_REQUEST,
        top_code: "invalid_request",
        field: "email",
        code: "invalid_format",
    }
)]
#[actix_web::test]
async fn registration_failures_name_the_field(
    #[case] request: RegisterRequest,
    #[case] expected: ValidationExpectation<'_>,
) {
    let (state, _) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    register_ada(&app).await;

    let res = post_json(&app, "/api/v1/register", &request).await;
    assert_eq!(res.status(), expected.status);
    assert_validation(&json_body(res).await, &expected);
}

#[actix_web::test]
async fn current_user_requires_a_session() {
    let (state, _) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    let res = get_with(&app, "/api/v1/users/me", None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn current_user_returns_the_session_profile() {
    let (state, _) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    register_ada(&app).await;
    let cookie = login_as(&app, "ada@example.com").await;

    let res = get_with(&app, "/api/v1/users/me", Some(cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["username"], "ada");
}

#[actix_web::test]
async fn deleted_user_is_treated_as_logged_out() {
    let (state, users): (HttpState, Arc<InMemoryUserRepository>) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    register_ada(&app).await;
    let cookie = login_as(&app, "ada").await;

    let me = get_with(&app, "/api/v1/users/me", Some(cookie.clone())).await;
    let id = UserId::new(
        json_body(me).await["id"]
            .as_str()
            .expect("id string"),
    )
    .expect("valid id");
    users.remove(&id);

    let res = get_with(&app, "/api/v1/users/me", Some(cookie)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_requires_a_session() {
    let (state, _) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    let res = get_with(&app, "/api/v1/logout", None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_clears_the_session() {
    let (state, _) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    register_ada(&app).await;
    let cookie = login_as(&app, "ada").await;

    let res = get_with(&app, "/api/v1/logout", Some(cookie)).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cleared = session_cookie(&res).expect("removal cookie");
    assert_eq!(cleared.value(), "");

    let after = get_with(&app, "/api/v1/users/me", Some(cleared)).await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}
