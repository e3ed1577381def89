//! Driving port for user profile queries.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for reading the current user's profile.
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for the authenticated user.
    ///
    /// A session pointing at a deleted account yields `unauthorized`.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;
}
