//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{StoredCredentials, User, UserId};

use super::diesel_basic_error_mapping::impl_diesel_error_conversion;
use super::models::{CredentialsRow, NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

impl_diesel_error_conversion!(UserRepositoryError);

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

fn row_to_user(row: UserRow) -> User {
    User::new(UserId::new(row.id), row.username)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await?;

        // ON CONFLICT DO NOTHING returns no row for a taken username; the
        // unique constraint arbitrates concurrent registrations.
        let inserted = diesel::insert_into(users::table)
            .values(&NewUserRow {
                username,
                password_hash,
            })
            .on_conflict(users::username)
            .do_nothing()
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()?;

        match inserted {
            Some(row) => Ok(row_to_user(row)),
            None => {
                debug!(username, "registration rejected: username taken");
                Err(UserRepositoryError::conflict(
                    "username_taken",
                    format!("username {username} is already registered"),
                ))
            }
        }
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = users::table
            .filter(users::username.eq(username))
            .select(CredentialsRow::as_select())
            .first::<CredentialsRow>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(|row| StoredCredentials {
            user_id: UserId::new(row.id),
            password_hash: row.password_hash,
        }))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(row_to_user))
    }
}
