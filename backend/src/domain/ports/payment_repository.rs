//! Port for payment method and transaction persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    CustomerId, OrderId, PaymentMethod, PaymentMethodDetails, PaymentMethodId, Transaction,
    TransactionDetails, TransactionId,
};

use super::{define_port_error, impl_repository_error_conversion};

define_port_error! {
    /// Errors raised by payment repository adapters.
    pub enum PaymentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "payment repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "payment repository query failed: {message}",
        /// The row or a referenced row does not exist.
        NotFound { code: String, message: String } => "{message}",
        /// The write was rejected by a consistency rule.
        Conflict { code: String, message: String } => "{message}",
    }
}

impl_repository_error_conversion!(PaymentRepositoryError);

impl PaymentRepositoryError {
    /// The payment method `id` does not exist.
    pub fn missing_method(id: PaymentMethodId) -> Self {
        Self::not_found(
            "payment_method_not_found",
            format!("payment method {id} not found"),
        )
    }

    /// The transaction `id` does not exist.
    pub fn missing_transaction(id: TransactionId) -> Self {
        Self::not_found(
            "transaction_not_found",
            format!("transaction {id} not found"),
        )
    }
}

/// Optional payment method listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentMethodFilter {
    /// Only methods owned by this customer.
    pub customer_id: Option<CustomerId>,
}

/// Optional transaction listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only transactions paying this order.
    pub order_id: Option<OrderId>,
}

/// Payment method and transaction storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// List payment methods ordered by id.
    async fn list_methods(
        &self,
        filter: &PaymentMethodFilter,
        page: &PageRequest<i32>,
    ) -> Result<Page<PaymentMethod, i32>, PaymentRepositoryError>;

    /// Fetch one payment method.
    async fn find_method(
        &self,
        id: PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, PaymentRepositoryError>;

    /// Insert a payment method; its customer must exist.
    async fn create_method(
        &self,
        details: &PaymentMethodDetails,
    ) -> Result<PaymentMethod, PaymentRepositoryError>;

    /// Replace a payment method; its customer must exist.
    async fn update_method(
        &self,
        id: PaymentMethodId,
        details: &PaymentMethodDetails,
    ) -> Result<PaymentMethod, PaymentRepositoryError>;

    /// Delete a payment method no transaction refers to. A referenced method
    /// is rejected with `Conflict` (`payment_method_in_use`).
    async fn delete_method(&self, id: PaymentMethodId) -> Result<(), PaymentRepositoryError>;

    /// List transactions ordered by id.
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest<i32>,
    ) -> Result<Page<Transaction, i32>, PaymentRepositoryError>;

    /// Fetch one transaction.
    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, PaymentRepositoryError>;

    /// Insert a transaction; its order and payment method must exist.
    async fn create_transaction(
        &self,
        details: &TransactionDetails,
    ) -> Result<Transaction, PaymentRepositoryError>;

    /// Replace a transaction; its order and payment method must exist.
    async fn update_transaction(
        &self,
        id: TransactionId,
        details: &TransactionDetails,
    ) -> Result<Transaction, PaymentRepositoryError>;

    /// Delete a transaction.
    async fn delete_transaction(&self, id: TransactionId) -> Result<(), PaymentRepositoryError>;
}
