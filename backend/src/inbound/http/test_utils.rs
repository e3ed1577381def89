//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use calorie_model::{Accuracy, LinearModel};

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::inbound::http::state::{HttpState, HttpStateAdapters};
use crate::outbound::memory::{InMemoryHistoryRepository, InMemoryUserRepository};
use crate::outbound::model_store::LoadedModel;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Reversible "hash" so handler tests skip the Argon2 work factor.
#[derive(Debug, Default)]
pub struct PlainTextHasher;

impl PasswordHasher for PlainTextHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::new(format!("plain${password}")))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        Ok(hash.as_str().strip_prefix("plain$") == Some(password))
    }
}

/// Model predicting `10 + 5 * duration`, reporting 96.73% accuracy.
pub fn fixture_model() -> LoadedModel {
    LoadedModel::new(
        LinearModel::from_parts(10.0, [0.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0]),
        Accuracy::from_percent(96.73),
    )
}

/// Handler state over in-memory stores, plus the user store for direct setup.
pub fn memory_state() -> (HttpState, Arc<InMemoryUserRepository>) {
    let users = Arc::new(InMemoryUserRepository::new());
    let state = HttpState::from_adapters(HttpStateAdapters {
        users: users.clone(),
        history: Arc::new(InMemoryHistoryRepository::new()),
        hasher: Arc::new(PlainTextHasher),
        estimator: Arc::new(fixture_model()),
        clock: Arc::new(mockable::DefaultClock),
    });
    (state, users)
}
