//! Read-side port computing raw dashboard aggregates.

use async_trait::async_trait;

use crate::domain::{DashboardAggregates, DashboardWindow, Error};

use super::define_port_error;

define_port_error! {
    /// Errors raised while computing dashboard aggregates.
    pub enum DashboardRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "dashboard read connection failed: {message}",
        /// An aggregate query failed.
        Query { message: String } => "dashboard read query failed: {message}",
    }
}

impl From<DashboardRepositoryError> for Error {
    fn from(value: DashboardRepositoryError) -> Self {
        match value {
            DashboardRepositoryError::Connection { message } => Error::service_unavailable(message),
            DashboardRepositoryError::Query { message } => Error::internal(message),
        }
    }
}

/// Aggregate queries over the whole schema.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Compute every aggregate for `window` from one consistent snapshot.
    async fn aggregates(
        &self,
        window: &DashboardWindow,
    ) -> Result<DashboardAggregates, DashboardRepositoryError>;
}
