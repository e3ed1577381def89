//! Driven port for account persistence.

use async_trait::async_trait;
use calorie_model::Gender;

use crate::domain::{Email, PasswordHash, StoredCredentials, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "user repository query failed: {message}",
        /// Another account already uses the email.
        DuplicateEmail => "email is already registered",
        /// Another account already uses the username.
        DuplicateUsername => "username is already taken",
    }
}

/// Port for storing accounts and resolving login identifiers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// Adapters report unique-constraint violations as
    /// [`UserPersistenceError::DuplicateEmail`] or
    /// [`UserPersistenceError::DuplicateUsername`].
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user whose email equals `email` byte-for-byte.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user whose username equals `username` byte-for-byte.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the account whose email or username equals `identifier`.
    async fn find_credentials_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Record `gender` unless the profile already holds one.
    ///
    /// Returns the gender stored after the call, which differs from `gender`
    /// when another request recorded one first, or `None` when the account
    /// no longer exists.
    async fn set_gender(
        &self,
        id: &UserId,
        gender: Gender,
    ) -> Result<Option<Gender>, UserPersistenceError>;
}
