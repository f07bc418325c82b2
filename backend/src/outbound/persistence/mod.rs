//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations translate between Diesel
//!   rows and domain types. Consistency rules that must hold under
//!   concurrency (cascading deletes, guarded deletes, the derived last
//!   purchase date) live here because they are enforced with row locks
//!   inside a single transaction.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Pool and Diesel failures are mapped onto
//!   each port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use backoffice::outbound::persistence::{DbPool, DieselCustomerRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/backoffice")).await?;
//! let customers = DieselCustomerRepository::new(pool);
//! ```

pub(crate) mod diesel_basic_error_mapping;
mod diesel_customer_repository;
mod diesel_dashboard_repository;
mod diesel_inventory_repository;
mod diesel_order_repository;
mod diesel_payment_repository;
mod diesel_product_repository;
mod diesel_user_repository;
mod migrations;
mod models;
pub(crate) mod pool;
mod schema;

pub use diesel_customer_repository::DieselCustomerRepository;
pub use diesel_dashboard_repository::DieselDashboardRepository;
pub use diesel_inventory_repository::DieselInventoryRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations, run_pending_migrations_async};
pub use pool::{DbPool, PoolConfig, PoolError};
