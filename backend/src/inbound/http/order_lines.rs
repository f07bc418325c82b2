//! Order line handlers.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{OrderLineFilter, OrderRepositoryError};
use crate::domain::{Error, OrderId, OrderLine, OrderLineDetails, OrderLineDraft, OrderLineId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{page_request, page_response};
use crate::inbound::http::schemas::OrderLinePage;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::key_error;

/// Body for creating or replacing an order line.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineFields {
    #[schema(example = "INV-2026-0311")]
    pub order_id: String,
    #[schema(example = "SKU-0042")]
    pub product_id: String,
    /// Positive unit count.
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = 6.5)]
    pub unit_price: Option<f64>,
}

impl From<OrderLineFields> for OrderLineDraft {
    fn from(value: OrderLineFields) -> Self {
        Self {
            order_id: value.order_id,
            product_id: value.product_id,
            quantity: value.quantity,
            unit_price: value.unit_price,
        }
    }
}

/// Order line as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub order_line_id: i32,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub unit_price: Option<f64>,
    /// `quantity * unitPrice`; absent without a unit price.
    pub line_total: Option<f64>,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        let details = line.details();
        Self {
            order_line_id: line.id().get(),
            order_id: details.order_id().as_str().to_owned(),
            product_id: details.product_id().as_str().to_owned(),
            quantity: details.quantity(),
            unit_price: details.unit_price(),
            line_total: details.line_total(),
        }
    }
}

/// Paging and filter parameters for the order line listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderLineQuery {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    /// Only lines of this order.
    pub order_id: Option<String>,
}

/// List order lines ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/order-lines",
    params(OrderLineQuery),
    responses(
        (status = 200, description = "Order lines", body = OrderLinePage),
        (status = 400, description = "Invalid cursor or filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrderLines"
)]
#[get("/order-lines")]
pub async fn list_order_lines(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OrderLineQuery>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let filter = OrderLineFilter {
        order_id: query
            .order_id
            .as_deref()
            .map(|raw| OrderId::new(raw).map_err(key_error("orderId")))
            .transpose()?,
    };
    let page = page_request::<i32>(query.cursor.as_deref(), query.limit)?;
    let lines = state.orders.list_lines(&filter, &page).await?;
    page_response(&req, lines, OrderLineResponse::from)
}

/// Fetch one order line.
#[utoipa::path(
    get,
    path = "/api/v1/order-lines/{id}",
    params(("id" = i32, Path, description = "Order line id")),
    responses(
        (status = 200, description = "Order line", body = OrderLineResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrderLine"
)]
#[get("/order-lines/{id}")]
pub async fn get_order_line(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<OrderLineResponse>> {
    session.require_user_id()?;
    let id = OrderLineId::new(path.into_inner());
    let line = state
        .orders
        .find_line(id)
        .await?
        .ok_or_else(|| OrderRepositoryError::missing_line(id))?;
    Ok(web::Json(line.into()))
}

/// Add a line to an existing order.
#[utoipa::path(
    post,
    path = "/api/v1/order-lines",
    request_body = OrderLineFields,
    responses(
        (status = 201, description = "Created", body = OrderLineResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Order or product not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "createOrderLine"
)]
#[post("/order-lines")]
pub async fn create_order_line(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OrderLineFields>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let details = OrderLineDetails::try_from(OrderLineDraft::from(payload.into_inner()))?;
    let line = state.orders.create_line(&details).await?;
    Ok(HttpResponse::Created().json(OrderLineResponse::from(line)))
}

/// Replace an order line.
#[utoipa::path(
    put,
    path = "/api/v1/order-lines/{id}",
    params(("id" = i32, Path, description = "Order line id")),
    request_body = OrderLineFields,
    responses(
        (status = 200, description = "Updated", body = OrderLineResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Line, order or product not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "updateOrderLine"
)]
#[put("/order-lines/{id}")]
pub async fn update_order_line(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<OrderLineFields>,
) -> ApiResult<web::Json<OrderLineResponse>> {
    session.require_user_id()?;
    let id = OrderLineId::new(path.into_inner());
    let details = OrderLineDetails::try_from(OrderLineDraft::from(payload.into_inner()))?;
    let line = state.orders.update_line(id, &details).await?;
    Ok(web::Json(line.into()))
}

/// Delete an order line.
#[utoipa::path(
    delete,
    path = "/api/v1/order-lines/{id}",
    params(("id" = i32, Path, description = "Order line id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "deleteOrderLine"
)]
#[delete("/order-lines/{id}")]
pub async fn delete_order_line(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state
        .orders
        .delete_line(OrderLineId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the order line routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_order_lines)
        .service(create_order_line)
        .service(get_order_line)
        .service(update_order_line)
        .service(delete_order_line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockOrderRepository;
    use crate::inbound::http::test_utils::{signed_in, test_app, unused_state};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[actix_web::test]
    async fn created_line_reports_its_total() {
        let mut repo = MockOrderRepository::new();
        repo.expect_create_line()
            .withf(|details| details.order_id().as_str() == "INV-1" && details.quantity() == 3)
            .times(1)
            .returning(|details| Ok(OrderLine::new(OrderLineId::new(11), details.clone())));
        let mut state = unused_state();
        state.orders = Arc::new(repo);
        let app = test::init_service(test_app(state, configure)).await;
        let cookie = signed_in(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/order-lines")
                .cookie(cookie)
                .set_json(json!({
                    "orderId": "INV-1",
                    "productId": "SKU-1",
                    "quantity": 3,
                    "unitPrice": 2.5
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: OrderLineResponse = test::read_body_json(res).await;
        assert_eq!(body.order_line_id, 11);
        assert_eq!(body.line_total, Some(7.5));
    }

    #[rstest]
    #[case(json!({ "orderId": "INV-1", "productId": "SKU-1", "quantity": 0 }), "quantity")]
    #[case(json!({ "orderId": "", "productId": "SKU-1", "quantity": 1 }), "orderId")]
    #[case(json!({ "orderId": "INV-1", "productId": "SKU-1", "quantity": 1, "unitPrice": -0.5 }), "unitPrice")]
    #[actix_web::test]
    async fn invalid_lines_are_rejected(#[case] body: Value, #[case] field: &str) {
        let app = test::init_service(test_app(unused_state(), configure)).await;
        let cookie = signed_in(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/order-lines")
                .cookie(cookie)
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let error: Error = test::read_body_json(res).await;
        assert_eq!(
            error.details().and_then(|d| d.get("field")),
            Some(&json!(field))
        );
    }

    #[actix_web::test]
    async fn deleting_a_missing_line_is_not_found() {
        let mut repo = MockOrderRepository::new();
        repo.expect_delete_line()
            .times(1)
            .returning(|id| Err(OrderRepositoryError::missing_line(id)));
        let mut state = unused_state();
        state.orders = Arc::new(repo);
        let app = test::init_service(test_app(state, configure)).await;
        let cookie = signed_in(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/api/v1/order-lines/99")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
