//! Driving port for login.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing infrastructure.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, User};

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated profile.
    ///
    /// An unknown identifier and a wrong password produce the same
    /// `unauthorized` error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}
