//! Port abstraction for staff account persistence and its errors.

use async_trait::async_trait;

use crate::domain::{StoredCredentials, User, UserId};

use super::{define_port_error, impl_repository_error_conversion};

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The requested account does not exist.
        NotFound { code: String, message: String } => "{message}",
        /// The username is already registered.
        Conflict { code: String, message: String } => "{message}",
    }
}

impl_repository_error_conversion!(UserRepositoryError);

/// Staff account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    ///
    /// The username check and the insert are one statement, so of two
    /// concurrent registrations for the same name exactly one succeeds and
    /// the other receives [`UserRepositoryError::Conflict`].
    async fn create(&self, username: &str, password_hash: &str)
    -> Result<User, UserRepositoryError>;

    /// Fetch the stored hash for a username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;
}
