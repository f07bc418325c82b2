//! Domain primitives, aggregates and use-cases.
//!
//! Purpose: define the strongly typed back-office entities used by the API
//! and persistence layers. Each entity comes in two shapes: an unvalidated
//! `*Draft` built by inbound adapters and a validated value obtained through
//! `TryFrom`, so ports only ever receive checked input.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Customer, Product, InventoryRecord, Order, OrderLine, PaymentMethod,
//!   Transaction: stored records.
//! - DashboardSummary: derived sales analytics.

pub mod account_service;
pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod dashboard_service;
pub mod error;
pub mod inventory;
pub mod keys;
pub mod order;
pub mod payment;
pub mod ports;
pub mod product;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, MIN_PASSWORD_LEN, Registration,
    RegistrationValidationError, USERNAME_LEN,
};
pub use self::customer::{Customer, CustomerDetails, CustomerDraft};
pub use self::dashboard::{
    CategorySales, CoPurchaseAffinity, CoPurchaseCount, CountrySales, CustomerSpend,
    DashboardAggregates, DashboardRequest, DashboardSummary, DashboardWindow, InventoryTurnover,
    LowStockItem, MonthlySales, PaymentStatusTotal, ProductSales, RecurringRevenue, Retention,
    SalesTotals,
};
pub use self::dashboard_service::DashboardService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::inventory::{InventoryDetails, InventoryDraft, InventoryRecord, Restock};
pub use self::keys::{
    CustomerId, InventoryId, KeyValidationError, OrderId, OrderLineId, PaymentMethodId, ProductId,
    TransactionId,
};
pub use self::order::{Order, OrderDraft, OrderHeader, OrderLine, OrderLineDetails, OrderLineDraft};
pub use self::payment::{
    PaymentMethod, PaymentMethodDetails, PaymentMethodDraft, Transaction, TransactionDetails,
    TransactionDraft,
};
pub use self::product::{Product, ProductDetails, ProductDraft};
pub use self::trace_id::TraceId;
pub use self::user::{StoredCredentials, User, UserId};
pub use self::validation::FieldError;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backoffice::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
