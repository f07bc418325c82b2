//! Driving port for creating staff accounts.

use async_trait::async_trait;

use crate::domain::{Error, Registration, User};

/// Domain use-case port for account registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create an account; a taken username yields `Conflict`.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;
}
