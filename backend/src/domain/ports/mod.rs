//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`]) are implemented by the
//! outbound adapters; driving ports ([`LoginService`], [`DashboardQuery`]
//! and friends) are what the inbound HTTP layer calls.

mod macros;
pub(crate) use macros::{define_port_error, impl_repository_error_conversion};

mod customer_repository;
mod dashboard_query;
mod dashboard_repository;
mod inventory_repository;
mod login_service;
mod order_repository;
mod password_hasher;
mod payment_repository;
mod product_repository;
mod readiness_check;
mod registration_service;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use customer_repository::MockCustomerRepository;
pub use customer_repository::{CustomerRepository, CustomerRepositoryError};
#[cfg(test)]
pub use dashboard_query::MockDashboardQuery;
pub use dashboard_query::DashboardQuery;
#[cfg(test)]
pub use dashboard_repository::MockDashboardRepository;
pub use dashboard_repository::{DashboardRepository, DashboardRepositoryError};
#[cfg(test)]
pub use inventory_repository::MockInventoryRepository;
pub use inventory_repository::{InventoryFilter, InventoryRepository, InventoryRepositoryError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{
    OrderFilter, OrderLineFilter, OrderRepository, OrderRepositoryError,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
pub use payment_repository::{
    PaymentMethodFilter, PaymentRepository, PaymentRepositoryError, TransactionFilter,
};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{ProductFilter, ProductRepository, ProductRepositoryError};
#[cfg(test)]
pub use readiness_check::MockReadinessCheck;
pub use readiness_check::ReadinessCheck;
#[cfg(test)]
pub use registration_service::MockRegistrationService;
pub use registration_service::RegistrationService;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
