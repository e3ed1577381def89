//! Driving port for account registration.

use async_trait::async_trait;

use crate::domain::{Error, Registration, User};

/// Domain use-case port for creating accounts.
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create an account and return its public profile.
    ///
    /// Does not log the new user in.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;
}
