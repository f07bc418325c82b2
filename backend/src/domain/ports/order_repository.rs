//! Port for order and order line persistence.
//!
//! Every order write keeps the affected customers' `last_purchase_date`
//! equal to the latest `order_date` among their remaining orders. Adapters
//! recompute it inside the same transaction as the write, after locking the
//! customer row.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    CustomerId, Order, OrderHeader, OrderId, OrderLine, OrderLineDetails, OrderLineId, UserId,
};

use super::{define_port_error, impl_repository_error_conversion};

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "order repository query failed: {message}",
        /// The order, line or a referenced row does not exist.
        NotFound { code: String, message: String } => "{message}",
        /// The write conflicts with an existing order.
        Conflict { code: String, message: String } => "{message}",
    }
}

impl_repository_error_conversion!(OrderRepositoryError);

impl OrderRepositoryError {
    /// The order `id` does not exist.
    pub fn missing_order(id: &OrderId) -> Self {
        Self::not_found("order_not_found", format!("order {id} not found"))
    }

    /// The order line `id` does not exist.
    pub fn missing_line(id: OrderLineId) -> Self {
        Self::not_found("order_line_not_found", format!("order line {id} not found"))
    }
}

/// Optional order listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders placed by this customer.
    pub customer_id: Option<CustomerId>,
}

/// Optional order line listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderLineFilter {
    /// Only lines of this order.
    pub order_id: Option<OrderId>,
}

/// Order and order line storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// List orders ordered by id.
    async fn list(
        &self,
        filter: &OrderFilter,
        page: &PageRequest<String>,
    ) -> Result<Page<Order, String>, OrderRepositoryError>;

    /// Fetch one order.
    async fn find(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;

    /// Insert an order recorded by `recorded_by`.
    ///
    /// The customer, when given, must exist (`customer_not_found`); an
    /// existing order id yields `Conflict` (`order_exists`).
    async fn create(
        &self,
        id: &OrderId,
        header: &OrderHeader,
        recorded_by: UserId,
    ) -> Result<Order, OrderRepositoryError>;

    /// Replace an order's header. When the order moves to another customer
    /// both customers' last purchase dates are recomputed.
    async fn update(
        &self,
        id: &OrderId,
        header: &OrderHeader,
    ) -> Result<Order, OrderRepositoryError>;

    /// Delete an order after its transactions and lines, then recompute its
    /// customer's last purchase date, in one transaction.
    async fn delete(&self, id: &OrderId) -> Result<(), OrderRepositoryError>;

    /// List order lines ordered by id.
    async fn list_lines(
        &self,
        filter: &OrderLineFilter,
        page: &PageRequest<i32>,
    ) -> Result<Page<OrderLine, i32>, OrderRepositoryError>;

    /// Fetch one order line.
    async fn find_line(&self, id: OrderLineId) -> Result<Option<OrderLine>, OrderRepositoryError>;

    /// Insert a line; its order and product must exist.
    async fn create_line(
        &self,
        details: &OrderLineDetails,
    ) -> Result<OrderLine, OrderRepositoryError>;

    /// Replace a line; its order and product must exist.
    async fn update_line(
        &self,
        id: OrderLineId,
        details: &OrderLineDetails,
    ) -> Result<OrderLine, OrderRepositoryError>;

    /// Delete a line.
    async fn delete_line(&self, id: OrderLineId) -> Result<(), OrderRepositoryError>;
}
