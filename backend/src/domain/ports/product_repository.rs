//! Port for product catalogue persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Product, ProductDetails, ProductId};

use super::{define_port_error, impl_repository_error_conversion};

define_port_error! {
    /// Errors raised by product repository adapters.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "product repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "product repository query failed: {message}",
        /// The product does not exist.
        NotFound { code: String, message: String } => "{message}",
        /// The write conflicts with an existing product.
        Conflict { code: String, message: String } => "{message}",
    }
}

impl_repository_error_conversion!(ProductRepositoryError);

impl ProductRepositoryError {
    /// The product `id` does not exist.
    pub fn missing(id: &ProductId) -> Self {
        Self::not_found("product_not_found", format!("product {id} not found"))
    }
}

/// Optional listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
}

/// Product storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List products ordered by id.
    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest<String>,
    ) -> Result<Page<Product, String>, ProductRepositoryError>;

    /// Fetch one product.
    async fn find(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError>;

    /// Insert a product; an existing id yields `Conflict` (`product_exists`).
    async fn create(
        &self,
        id: &ProductId,
        details: &ProductDetails,
    ) -> Result<Product, ProductRepositoryError>;

    /// Replace a product's fields.
    async fn update(
        &self,
        id: &ProductId,
        details: &ProductDetails,
    ) -> Result<Product, ProductRepositoryError>;

    /// Delete a product after its order lines and inventory records, in one
    /// transaction. A failure at any step leaves every row in place.
    async fn delete(&self, id: &ProductId) -> Result<(), ProductRepositoryError>;
}
