//! Account handlers: login, registration, logout and the current profile.
//!
//! ```text
//! POST /api/v1/login {"identifier":"ada","password":"secret"}
//! POST /api/v1/register {"username":"ada","email":"ada@example.com","password":"secret","confirmPassword":"secret"}
//! GET /api/v1/logout
//! GET /api/v1/users/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use calorie_model::Gender;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::{
    Error, ErrorCode, LoginCredentials, LoginValidationError, Registration,
    RegistrationValidationError, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
///
/// `identifier` is either the email or the username.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.identifier, &value.password)
    }
}

/// Registration request body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = RegistrationValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.username,
            &value.email,
            &value.password,
            &value.confirm_password,
        )
    }
}

/// Public profile returned by the account endpoints.
///
/// The password hash never leaves the domain.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Stored gender, once a prediction has set it.
    #[schema(value_type = Option<String>, example = "female")]
    pub gender: Option<Gender>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            gender: user.gender(),
            created_at: user.created_at(),
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyIdentifier => ("identifier", "empty_identifier"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn map_registration_validation_error(err: RegistrationValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": err.field(),
        "code": err.code(),
    }))
}

/// Authenticate with an email or username and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Blank identifier or password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Account store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.sign_in(user.id())?;
    Ok(web::Json(UserProfileResponse::from(user)))
}

/// Create an account. The caller is not logged in afterwards.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfileResponse),
        (status = 400, description = "Invalid field or mismatched confirmation", body = ErrorSchema),
        (status = 409, description = "Email or username already in use", body = ErrorSchema),
        (status = 503, description = "Account store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_registration_validation_error)?;
    let user = state.registration.register(&registration).await?;
    Ok(HttpResponse::Created().json(UserProfileResponse::from(user)))
}

/// End the current session.
#[utoipa::path(
    get,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session cleared"),
        (status = 401, description = "No active session", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[get("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    session.sign_out();
    info!(%user_id, "user logged out");
    Ok(HttpResponse::NoContent().finish())
}

/// Profile of the logged-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserProfileResponse),
        (status = 401, description = "No active session", body = ErrorSchema),
        (status = 503, description = "Account store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let user_id = session.require_user_id()?;
    let user = state
        .profile
        .fetch_profile(&user_id)
        .await
        .inspect_err(|err| forget_stale_session(&session, err))?;
    Ok(web::Json(UserProfileResponse::from(user)))
}

/// Drop a session whose user has disappeared so the next request starts clean.
pub(crate) fn forget_stale_session(session: &SessionContext, err: &Error) {
    if err.code() == ErrorCode::Unauthorized {
        session.sign_out();
    }
}

#[cfg(test)]
mod tests;
