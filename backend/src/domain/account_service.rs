//! Account domain service.
//!
//! Implements the login, registration and profile driving ports on top of
//! the user repository and the credential hasher.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, RegistrationService, UserPersistenceError,
    UserProfileQuery, UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, PasswordHash, Registration, User, UserDraft, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

pub(crate) fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail => duplicate_email(),
        UserPersistenceError::DuplicateUsername => duplicate_username(),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn hashing_task_failed(error: tokio::task::JoinError) -> Error {
    Error::internal(format!("password hashing task failed: {error}"))
}

fn duplicate_email() -> Error {
    Error::conflict("email is already registered")
        .with_details(json!({ "field": "email", "code": "duplicate" }))
}

fn duplicate_username() -> Error {
    Error::conflict("username is already taken")
        .with_details(json!({ "field": "username", "code": "duplicate" }))
}

/// Account service implementing login, registration and profile ports.
#[derive(Clone)]
pub struct AccountService<U> {
    user_repo: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl<U> AccountService<U> {
    /// Create a service over the user repository, hasher and clock.
    pub fn new(user_repo: Arc<U>, hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            hasher,
            clock,
        }
    }
}

impl<U> AccountService<U> {
    // Argon2 is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, password: &str) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(hashing_task_failed)?
            .map_err(map_hash_error)
    }

    async fn verify_password(&self, password: &str, hash: PasswordHash) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(hashing_task_failed)?
            .map_err(map_hash_error)
    }
}

#[async_trait]
impl<U> LoginService for AccountService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(stored) = self
            .user_repo
            .find_credentials_by_identifier(credentials.identifier())
            .await
            .map_err(map_user_repository_error)?
        else {
            debug!("login rejected: unknown identifier");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .verify_password(credentials.password(), stored.password_hash)
            .await?;
        if !matches {
            debug!(user_id = %stored.user.id(), "login rejected: wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        info!(user_id = %stored.user.id(), "user logged in");
        Ok(stored.user)
    }
}

#[async_trait]
impl<U> RegistrationService for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let email_taken = self
            .user_repo
            .find_by_email(registration.email())
            .await
            .map_err(map_user_repository_error)?
            .is_some();
        if email_taken {
            return Err(duplicate_email());
        }

        let username_taken = self
            .user_repo
            .find_by_username(registration.username())
            .await
            .map_err(map_user_repository_error)?
            .is_some();
        if username_taken {
            return Err(duplicate_username());
        }

        if !registration.passwords_match() {
            return Err(Error::invalid_request("passwords do not match")
                .with_details(json!({ "field": "confirm_password", "code": "mismatch" })));
        }

        let password_hash = self.hash_password(registration.password()).await?;
        let user = User::new(UserDraft {
            id: UserId::random(),
            username: registration.username().clone(),
            email: registration.email().clone(),
            gender: None,
            created_at: self.clock.utc(),
        });

        self.user_repo
            .insert(&user, &password_hash)
            .await
            .map_err(map_user_repository_error)?;

        info!(user_id = %user.id(), "user registered");
        Ok(user)
    }
}

#[async_trait]
impl<U> UserProfileQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
