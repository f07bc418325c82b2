//! Driving port for the sales dashboard.

use async_trait::async_trait;

use crate::domain::{DashboardRequest, DashboardSummary, Error};

/// Build the dashboard for a client request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardQuery: Send + Sync {
    /// Validate `request` and return the derived dashboard.
    async fn dashboard(&self, request: DashboardRequest) -> Result<DashboardSummary, Error>;
}
