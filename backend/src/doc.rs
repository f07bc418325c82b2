//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health checks, the
//! domain error schema, the page wrappers from
//! [`crate::inbound::http::schemas`] and the session cookie security scheme.
//! The document is served by Swagger UI in debug builds and exported by the
//! `openapi-dump` binary.

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::schemas::{
    CustomerPage, InventoryPage, OrderLinePage, OrderPage, PaginationLinksSchema,
    PaymentMethodPage, ProductPage, TransactionPage,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Back-office API",
        description = "Staff-facing management of customers, products, inventory, orders and payments, plus sales analytics."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::customers::list_customers,
        crate::inbound::http::customers::get_customer,
        crate::inbound::http::customers::create_customer,
        crate::inbound::http::customers::update_customer,
        crate::inbound::http::customers::delete_customer,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::inventory::list_inventory,
        crate::inbound::http::inventory::get_inventory,
        crate::inbound::http::inventory::create_inventory,
        crate::inbound::http::inventory::update_inventory,
        crate::inbound::http::inventory::delete_inventory,
        crate::inbound::http::inventory::restock_inventory,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::create_order,
        crate::inbound::http::orders::update_order,
        crate::inbound::http::orders::delete_order,
        crate::inbound::http::order_lines::list_order_lines,
        crate::inbound::http::order_lines::get_order_line,
        crate::inbound::http::order_lines::create_order_line,
        crate::inbound::http::order_lines::update_order_line,
        crate::inbound::http::order_lines::delete_order_line,
        crate::inbound::http::payment_methods::list_payment_methods,
        crate::inbound::http::payment_methods::get_payment_method,
        crate::inbound::http::payment_methods::create_payment_method,
        crate::inbound::http::payment_methods::update_payment_method,
        crate::inbound::http::payment_methods::delete_payment_method,
        crate::inbound::http::transactions::list_transactions,
        crate::inbound::http::transactions::get_transaction,
        crate::inbound::http::transactions::create_transaction,
        crate::inbound::http::transactions::update_transaction,
        crate::inbound::http::transactions::delete_transaction,
        crate::inbound::http::dashboard::get_dashboard,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        PaginationLinksSchema,
        CustomerPage,
        ProductPage,
        InventoryPage,
        OrderPage,
        OrderLinePage,
        PaymentMethodPage,
        TransactionPage,
    )),
    tags(
        (name = "users", description = "Staff accounts and sessions"),
        (name = "customers", description = "Customer records"),
        (name = "products", description = "Product catalogue"),
        (name = "inventory", description = "Stock levels and deliveries"),
        (name = "orders", description = "Orders and order lines"),
        (name = "payments", description = "Payment methods and transactions"),
        (name = "dashboard", description = "Sales analytics"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
