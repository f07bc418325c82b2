//! Assemble the HTTP state from database-backed adapters.

use std::sync::Arc;

use mockable::DefaultClock;

use backoffice::domain::{AccountService, DashboardService};
use backoffice::inbound::http::state::HttpState;
use backoffice::outbound::persistence::{
    DbPool, DieselCustomerRepository, DieselDashboardRepository, DieselInventoryRepository,
    DieselOrderRepository, DieselPaymentRepository, DieselProductRepository, DieselUserRepository,
};
use backoffice::outbound::security::Argon2PasswordHasher;

/// Wire every HTTP port to its PostgreSQL adapter.
///
/// The three account ports share one [`AccountService`].
pub(crate) fn build_http_state(pool: &DbPool) -> HttpState {
    let accounts = Arc::new(AccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher::new()),
    ));
    let dashboard = DashboardService::new(
        Arc::new(DieselDashboardRepository::new(pool.clone())),
        Arc::new(DefaultClock),
    );

    HttpState {
        login: accounts.clone(),
        registration: accounts.clone(),
        profile: accounts,
        customers: Arc::new(DieselCustomerRepository::new(pool.clone())),
        products: Arc::new(DieselProductRepository::new(pool.clone())),
        inventory: Arc::new(DieselInventoryRepository::new(pool.clone())),
        orders: Arc::new(DieselOrderRepository::new(pool.clone())),
        payments: Arc::new(DieselPaymentRepository::new(pool.clone())),
        dashboard: Arc::new(dashboard),
        clock: Arc::new(DefaultClock),
    }
}
