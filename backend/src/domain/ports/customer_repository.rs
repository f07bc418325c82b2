//! Port for customer persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Customer, CustomerDetails, CustomerId};

use super::{define_port_error, impl_repository_error_conversion};

define_port_error! {
    /// Errors raised by customer repository adapters.
    pub enum CustomerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "customer repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "customer repository query failed: {message}",
        /// The customer does not exist.
        NotFound { code: String, message: String } => "{message}",
        /// The write was rejected by a consistency rule.
        Conflict { code: String, message: String } => "{message}",
    }
}

impl_repository_error_conversion!(CustomerRepositoryError);

impl CustomerRepositoryError {
    /// The customer `id` does not exist.
    pub fn missing(id: &CustomerId) -> Self {
        Self::not_found("customer_not_found", format!("customer {id} not found"))
    }
}

/// Customer storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// List customers ordered by id.
    async fn list(
        &self,
        page: &PageRequest<String>,
    ) -> Result<Page<Customer, String>, CustomerRepositoryError>;

    /// Fetch one customer.
    async fn find(&self, id: &CustomerId) -> Result<Option<Customer>, CustomerRepositoryError>;

    /// Insert a customer; an existing id yields `Conflict`
    /// (`customer_exists`). The last purchase date starts absent.
    async fn create(
        &self,
        id: &CustomerId,
        details: &CustomerDetails,
    ) -> Result<Customer, CustomerRepositoryError>;

    /// Replace the editable fields; the last purchase date is untouched.
    async fn update(
        &self,
        id: &CustomerId,
        details: &CustomerDetails,
    ) -> Result<Customer, CustomerRepositoryError>;

    /// Delete a customer that has no orders, together with its payment
    /// methods and their transactions, in one transaction.
    ///
    /// A customer with orders is rejected with `Conflict`
    /// (`customer_has_orders`) and nothing is deleted.
    async fn delete(&self, id: &CustomerId) -> Result<(), CustomerRepositoryError>;
}
