//! Staff account use-cases: login, registration and profile lookup.
//!
//! Password hashing is CPU-bound, so both hashing and verification run on
//! the blocking thread pool rather than on the async executor.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, RegistrationService, UserProfileQuery,
    UserRepository,
};
use crate::domain::{Error, LoginCredentials, Registration, User, UserId};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service implementing the authentication driving ports.
pub struct AccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> Clone for AccountService<U, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<U, H> AccountService<U, H> {
    /// Create a service over a user store and a password hasher.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

impl<U, H> AccountService<U, H>
where
    H: PasswordHasher + 'static,
{
    async fn hash_password(&self, password: &str) -> Result<String, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(map_hash_error)
    }

    async fn verify_password(&self, password: &str, stored_hash: String) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|err| Error::internal(format!("password verification task failed: {err}")))?
            .map_err(map_hash_error)
    }
}

#[async_trait]
impl<U, H> LoginService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(stored) = self.users.find_credentials(credentials.username()).await? else {
            debug!(username = credentials.username(), "login for unknown user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        if self
            .verify_password(credentials.password(), stored.password_hash)
            .await?
        {
            Ok(stored.user_id)
        } else {
            debug!(user_id = %stored.user_id, "login with wrong password");
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}

#[async_trait]
impl<U, H> RegistrationService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let password_hash = self.hash_password(registration.password()).await?;
        let user = self
            .users
            .create(registration.username(), &password_hash)
            .await?;
        info!(user_id = %user.id(), username = user.username(), "registered staff account");
        Ok(user)
    }
}

#[async_trait]
impl<U, H> UserProfileQuery for AccountService<U, H>
where
    U: UserRepository,
    H: Send + Sync,
{
    async fn fetch_profile(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("session refers to an unknown account"))
    }
}

#[cfg(test)]
mod tests {
    //! Behaviour of the account use-cases against mocked ports.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::StoredCredentials;
    use crate::domain::ports::{MockPasswordHasher, MockUserRepository, UserRepositoryError};
    use rstest::rstest;

    fn service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
    ) -> AccountService<MockUserRepository, MockPasswordHasher> {
        AccountService::new(Arc::new(users), Arc::new(hasher))
    }

    fn credentials() -> LoginCredentials {
        LoginCredentials::try_from_parts("ada", "correct horse").expect("valid credentials")
    }

    #[tokio::test]
    async fn authenticate_returns_the_stored_user_id() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_credentials()
            .withf(|username| username == "ada")
            .times(1)
            .return_once(|_| {
                Ok(Some(StoredCredentials {
                    user_id: UserId::new(7),
                    password_hash: "hash".to_owned(),
                }))
            });
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .withf(|password, hash| password == "correct horse" && hash == "hash")
            .times(1)
            .return_const(Ok(true));

        let id = service(users, hasher)
            .authenticate(&credentials())
            .await
            .expect("authenticated");
        assert_eq!(id, UserId::new(7));
    }

    #[rstest]
    #[case::unknown_user(None)]
    #[case::wrong_password(Some(false))]
    #[tokio::test]
    async fn authenticate_rejects_bad_credentials_uniformly(#[case] verified: Option<bool>) {
        let mut users = MockUserRepository::new();
        let stored = verified.map(|_| StoredCredentials {
            user_id: UserId::new(1),
            password_hash: "hash".to_owned(),
        });
        users
            .expect_find_credentials()
            .return_once(move |_| Ok(stored));
        let mut hasher = MockPasswordHasher::new();
        if let Some(result) = verified {
            hasher.expect_verify().return_const(Ok(result));
        }

        let error = service(users, hasher)
            .authenticate(&credentials())
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn authenticate_surfaces_malformed_hashes_as_internal_errors() {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(|_| {
            Ok(Some(StoredCredentials {
                user_id: UserId::new(1),
                password_hash: "garbage".to_owned(),
            }))
        });
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .return_const(Err(PasswordHashError::malformed_hash("bad format")));

        let error = service(users, hasher)
            .authenticate(&credentials())
            .await
            .expect_err("internal");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn register_stores_the_hash_not_the_password() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .withf(|password| password == "long enough")
            .times(1)
            .return_const(Ok("hashed".to_owned()));
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .withf(|username, hash| username == "grace" && hash == "hashed")
            .times(1)
            .return_once(|username, _| Ok(User::new(UserId::new(3), username)));

        let registration =
            Registration::try_from_parts("Grace", "long enough").expect("valid registration");
        let user = service(users, hasher)
            .register(&registration)
            .await
            .expect("registered");
        assert_eq!(user.id(), UserId::new(3));
        assert_eq!(user.username(), "grace");
    }

    #[tokio::test]
    async fn register_maps_duplicate_usernames_to_conflict() {
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().return_const(Ok("hashed".to_owned()));
        let mut users = MockUserRepository::new();
        users.expect_create().return_once(|_, _| {
            Err(UserRepositoryError::conflict(
                "username_taken",
                "username already registered",
            ))
        });

        let registration =
            Registration::try_from_parts("grace", "long enough").expect("valid registration");
        let error = service(users, hasher)
            .register(&registration)
            .await
            .expect_err("conflict");
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(
            error.details(),
            Some(&serde_json::json!({ "code": "username_taken" }))
        );
    }

    #[tokio::test]
    async fn fetch_profile_rejects_sessions_for_missing_accounts() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));

        let error = service(users, MockPasswordHasher::new())
            .fetch_profile(UserId::new(99))
            .await
            .expect_err("unauthorized");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn fetch_profile_maps_connection_failures() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|_| Err(UserRepositoryError::connection("pool exhausted")));

        let error = service(users, MockPasswordHasher::new())
            .fetch_profile(UserId::new(1))
            .await
            .expect_err("unavailable");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
