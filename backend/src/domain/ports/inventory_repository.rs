//! Port for stock record persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{InventoryDetails, InventoryId, InventoryRecord, Restock};

use super::{define_port_error, impl_repository_error_conversion};

define_port_error! {
    /// Errors raised by inventory repository adapters.
    pub enum InventoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "inventory repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "inventory repository query failed: {message}",
        /// The record or its product does not exist.
        NotFound { code: String, message: String } => "{message}",
        /// The write was rejected.
        Conflict { code: String, message: String } => "{message}",
    }
}

impl_repository_error_conversion!(InventoryRepositoryError);

impl InventoryRepositoryError {
    /// The inventory record `id` does not exist.
    pub fn missing(id: InventoryId) -> Self {
        Self::not_found(
            "inventory_not_found",
            format!("inventory record {id} not found"),
        )
    }
}

/// Optional listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    /// Only records whose stock is below this level; unknown stock counts as zero.
    pub below: Option<i32>,
}

/// Inventory storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// List records ordered by id.
    async fn list(
        &self,
        filter: &InventoryFilter,
        page: &PageRequest<i32>,
    ) -> Result<Page<InventoryRecord, i32>, InventoryRepositoryError>;

    /// Fetch one record.
    async fn find(&self, id: InventoryId)
    -> Result<Option<InventoryRecord>, InventoryRepositoryError>;

    /// Insert a record; the product must exist (`product_not_found`).
    async fn create(
        &self,
        details: &InventoryDetails,
    ) -> Result<InventoryRecord, InventoryRepositoryError>;

    /// Replace a record; the product must exist.
    async fn update(
        &self,
        id: InventoryId,
        details: &InventoryDetails,
    ) -> Result<InventoryRecord, InventoryRepositoryError>;

    /// Delete a record.
    async fn delete(&self, id: InventoryId) -> Result<(), InventoryRepositoryError>;

    /// Add a delivery to the stock level and stamp `last_restocked`, reading
    /// and writing under a row lock.
    async fn restock(
        &self,
        id: InventoryId,
        restock: Restock,
    ) -> Result<InventoryRecord, InventoryRepositoryError>;
}
