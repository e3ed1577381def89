//! PostgreSQL-backed `UserRepository` implementation using Diesel.
//!
//! Rows are converted back through the validating domain constructors, so a
//! row edited by hand into an invalid shape surfaces as a query error rather
//! than an invalid [`User`].

use async_trait::async_trait;
use calorie_model::Gender;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, PasswordHash, StoredCredentials, User, UserDraft, UserId, Username};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error) -> UserPersistenceError {
    match unique_violation_constraint(&error) {
        Some(constraint) if constraint.contains("email") => UserPersistenceError::duplicate_email(),
        Some(constraint) if constraint.contains("username") => {
            UserPersistenceError::duplicate_username()
        }
        _ => map_diesel_error(error),
    }
}

fn corrupt(field: &str, err: impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("invalid {field} in database: {err}"))
}

fn row_to_user(row: UserRow) -> Result<StoredCredentials, UserPersistenceError> {
    let UserRow {
        id,
        username,
        email,
        password_hash,
        gender,
        created_at,
    } = row;
    let gender = gender
        .as_deref()
        .map(Gender::parse)
        .transpose()
        .map_err(|err| corrupt("gender", err))?;
    let user = User::new(UserDraft {
        id: UserId::from_uuid(id),
        username: Username::new(username).map_err(|err| corrupt("username", err))?,
        email: Email::new(email).map_err(|err| corrupt("email", err))?,
        gender,
        created_at,
    });
    Ok(StoredCredentials {
        user,
        password_hash: PasswordHash::new(password_hash),
    })
}

fn into_user(row: Option<UserRow>) -> Result<Option<User>, UserPersistenceError> {
    row.map(|row| row_to_user(row).map(|stored| stored.user))
        .transpose()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_ref(),
            email: user.email().as_ref(),
            password_hash: password_hash.as_str(),
            gender: user.gender().map(Gender::as_str),
            created_at: user.created_at(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_insert_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_user(row)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_user(row)
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_user(row)
    }

    async fn find_credentials_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Handles cannot contain `@` and emails must, so at most one row matches.
        let row = users::table
            .filter(
                users::email
                    .eq(identifier)
                    .or(users::username.eq(identifier)),
            )
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn set_gender(
        &self,
        id: &UserId,
        gender: Gender,
    ) -> Result<Option<Gender>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *id.as_uuid();
        // Only fill an empty gender; a recorded one is never overwritten.
        let filled = diesel::update(
            users::table
                .filter(users::id.eq(id))
                .filter(users::gender.is_null()),
        )
        .set(users::gender.eq(gender.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if filled == 1 {
            return Ok(Some(gender));
        }

        let stored: Option<Option<String>> = users::table
            .filter(users::id.eq(id))
            .select(users::gender)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        stored
            .flatten()
            .as_deref()
            .map(Gender::parse)
            .transpose()
            .map_err(|err| corrupt("gender", err))
    }
}
