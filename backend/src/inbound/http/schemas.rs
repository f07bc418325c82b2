//! OpenAPI schema definitions for types that do not derive `ToSchema`.
//!
//! The `pagination` crate stays framework-agnostic; the wrappers here mirror
//! its JSON envelope for each listing.

use utoipa::ToSchema;

use super::customers::CustomerResponse;
use super::inventory::InventoryResponse;
use super::order_lines::OrderLineResponse;
use super::orders::OrderResponse;
use super::payment_methods::PaymentMethodResponse;
use super::products::ProductResponse;
use super::transactions::TransactionResponse;

/// OpenAPI schema for [`pagination::PaginationLinks`].
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PaginationLinksSchema {
    /// URL of the current page.
    #[schema(rename = "self")]
    self_: String,
    /// URL of the following page; absent on the last page.
    next: Option<String>,
}

macro_rules! page_schema {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(ToSchema)]
        #[expect(
            dead_code,
            reason = "Used only for OpenAPI schema generation via utoipa"
        )]
        pub struct $name {
            /// Rows on this page, ordered by key.
            data: Vec<$item>,
            /// Effective page size.
            #[schema(example = 20)]
            limit: u32,
            /// Navigation links.
            links: PaginationLinksSchema,
        }
    };
}

page_schema!(
    /// Page of customers.
    CustomerPage,
    CustomerResponse
);
page_schema!(
    /// Page of products.
    ProductPage,
    ProductResponse
);
page_schema!(
    /// Page of inventory records.
    InventoryPage,
    InventoryResponse
);
page_schema!(
    /// Page of orders.
    OrderPage,
    OrderResponse
);
page_schema!(
    /// Page of order lines.
    OrderLinePage,
    OrderLineResponse
);
page_schema!(
    /// Page of payment methods.
    PaymentMethodPage,
    PaymentMethodResponse
);
page_schema!(
    /// Page of payment transactions.
    TransactionPage,
    TransactionResponse
);

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    #[test]
    fn pagination_links_use_the_self_keyword() {
        let json =
            serde_json::to_value(PaginationLinksSchema::schema()).expect("schema serialises");
        let properties = json.get("properties").expect("properties");
        assert!(properties.get("self").is_some());
        assert!(properties.get("next").is_some());
    }
}
