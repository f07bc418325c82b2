//! Port for checking that backing services can take traffic.

use async_trait::async_trait;

/// Reports whether a dependency (typically the database) is reachable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadinessCheck: Send + Sync {
    /// `Err` carries a diagnostic for logs; it is never shown to clients.
    async fn check(&self) -> Result<(), String>;
}
