//! Driving port for reading the signed-in user's profile.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Read the account behind a session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Fetch the account; a session for a deleted account yields
    /// `Unauthorized`.
    async fn fetch_profile(&self, user_id: UserId) -> Result<User, Error>;
}
