//! HTTP inbound adapter exposing the back-office REST endpoints.
//!
//! Every handler module exposes a `configure` function registering its
//! routes on the `/api/v1` scope.

pub mod customers;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod inventory;
pub mod order_lines;
pub mod orders;
pub(crate) mod paging;
pub mod payment_methods;
pub mod products;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod transactions;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(users::configure)
        .configure(customers::configure)
        .configure(products::configure)
        .configure(inventory::configure)
        .configure(orders::configure)
        .configure(order_lines::configure)
        .configure(payment_methods::configure)
        .configure(transactions::configure)
        .configure(dashboard::configure);
}
