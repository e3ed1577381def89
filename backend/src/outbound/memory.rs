//! In-memory adapters for the user and history ports.
//!
//! Used when no database is configured and by the HTTP tests. Uniqueness and
//! ordering match the PostgreSQL adapters; contents vanish on restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use calorie_model::Gender;
use uuid::Uuid;

use crate::domain::ports::{
    HistoryPersistenceError, HistoryRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Email, HistoryEntry, PasswordHash, StoredCredentials, User, UserId, Username,
    sort_newest_first,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking writer leaves whole records behind, so the data stays usable.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Account store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, StoredCredentials>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an account, as if deleted out of band.
    pub fn remove(&self, id: &UserId) {
        lock(&self.users).remove(id.as_uuid());
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut users = lock(&self.users);
        if users.values().any(|stored| stored.user.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email());
        }
        if users
            .values()
            .any(|stored| stored.user.username() == user.username())
        {
            return Err(UserPersistenceError::duplicate_username());
        }
        users.insert(
            *user.id().as_uuid(),
            StoredCredentials {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.users)
            .get(id.as_uuid())
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.users)
            .values()
            .find(|stored| stored.user.email() == email)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.users)
            .values()
            .find(|stored| stored.user.username() == username)
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(lock(&self.users)
            .values()
            .find(|stored| {
                stored.user.email().as_ref() == identifier
                    || stored.user.username().as_ref() == identifier
            })
            .cloned())
    }

    async fn set_gender(
        &self,
        id: &UserId,
        gender: Gender,
    ) -> Result<Option<Gender>, UserPersistenceError> {
        let mut users = lock(&self.users);
        Ok(users.get_mut(id.as_uuid()).map(|stored| {
            stored.user.gender().unwrap_or_else(|| {
                stored.user = stored.user.clone().with_gender(gender);
                gender
            })
        }))
    }
}

/// Prediction history kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryHistoryRepository {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryHistoryRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryPersistenceError> {
        lock(&self.entries).push(entry.clone());
        Ok(())
    }

    async fn list_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<HistoryEntry>, HistoryPersistenceError> {
        let mut entries: Vec<HistoryEntry> = lock(&self.entries)
            .iter()
            .filter(|entry| &entry.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Measurements, UserDraft};
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::{fixture, rstest};

    fn user(username: &str, email: &str) -> User {
        User::new(UserDraft {
            id: UserId::random(),
            username: Username::new(username).expect("username"),
            email: Email::new(email).expect("email"),
            gender: None,
            created_at: Utc::now(),
        })
    }

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, second)
            .single()
            .expect("timestamp")
    }

    fn entry(user_id: &UserId, created_at: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            gender: Gender::Male,
            measurements: Measurements {
                age: 28.0,
                height: 175.0,
                weight: 72.0,
                duration: 30.0,
                heart_rate: 105.0,
                body_temp: 40.5,
            },
            predicted_calories: 150.0,
            created_at,
        }
    }

    #[fixture]
    fn users() -> InMemoryUserRepository {
        InMemoryUserRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_duplicates_byte_for_byte(users: InMemoryUserRepository) {
        let hash = PasswordHash::new("phc");
        users
            .insert(&user("ada", "ada@example.com"), &hash)
            .await
            .expect("first insert");

        let same_email = users.insert(&user("grace", "ada@example.com"), &hash).await;
        assert_eq!(same_email, Err(UserPersistenceError::DuplicateEmail));
        let same_name = users.insert(&user("ada", "other@example.com"), &hash).await;
        assert_eq!(same_name, Err(UserPersistenceError::DuplicateUsername));
        let different_case = users.insert(&user("Ada", "Ada@example.com"), &hash).await;
        assert_eq!(different_case, Ok(()));
    }

    #[rstest]
    #[case("ada")]
    #[case("ada@example.com")]
    #[tokio::test]
    async fn identifier_matches_email_or_username(
        users: InMemoryUserRepository,
        #[case] identifier: &str,
    ) {
        let ada = user("ada", "ada@example.com");
        users
            .insert(&ada, &PasswordHash::new("phc"))
            .await
            .expect("insert");
        let found = users
            .find_credentials_by_identifier(identifier)
            .await
            .expect("lookup")
            .expect("found");
        assert_eq!(found.user.id(), ada.id());
    }

    #[rstest]
    #[tokio::test]
    async fn set_gender_never_overwrites(users: InMemoryUserRepository) {
        let ada = user("ada", "ada@example.com");
        users
            .insert(&ada, &PasswordHash::new("phc"))
            .await
            .expect("insert");
        let first = users.set_gender(ada.id(), Gender::Female).await.expect("set");
        let second = users.set_gender(ada.id(), Gender::Male).await.expect("set");
        assert_eq!((first, second), (Some(Gender::Female), Some(Gender::Female)));
        let stored = users.find_by_id(ada.id()).await.expect("find").expect("user");
        assert_eq!(stored.gender(), Some(Gender::Female));
    }

    #[rstest]
    #[tokio::test]
    async fn set_gender_reports_missing_accounts(users: InMemoryUserRepository) {
        let result = users
            .set_gender(&UserId::random(), Gender::Male)
            .await
            .expect("set");
        assert!(result.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn history_is_per_user_and_newest_first() {
        let history = InMemoryHistoryRepository::new();
        let ada = UserId::random();
        let grace = UserId::random();
        for (owner, second) in [(&ada, 1), (&grace, 2), (&ada, 3), (&ada, 2)] {
            history.append(&entry(owner, at(second))).await.expect("append");
        }

        let listed = history.list_for(&ada).await.expect("list");
        let times: Vec<_> = listed.iter().map(|e| e.created_at).collect();
        assert_eq!(times, vec![at(3), at(2), at(1)]);
        assert!(listed.iter().all(|e| e.user_id == ada));
    }
}
