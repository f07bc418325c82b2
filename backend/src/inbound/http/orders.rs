//! Order handlers.
//!
//! Every write here also refreshes the owning customer's last purchase date;
//! that happens in the repository transaction, not in the handler.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{OrderFilter, OrderRepositoryError};
use crate::domain::{CustomerId, Error, Order, OrderDraft, OrderHeader, OrderId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{page_request, page_response};
use crate::inbound::http::schemas::OrderPage;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::key_error;

/// Editable order header fields.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderFields {
    /// Omit for a walk-in sale.
    #[schema(example = "C-00017")]
    pub customer_id: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2026-03-02")]
    pub order_date: Option<NaiveDate>,
    #[schema(example = 42.5)]
    pub total_amount: Option<f64>,
    pub shipping_address: Option<String>,
}

impl From<OrderFields> for OrderDraft {
    fn from(value: OrderFields) -> Self {
        Self {
            customer_id: value.customer_id,
            order_date: value.order_date,
            total_amount: value.total_amount,
            shipping_address: value.shipping_address,
        }
    }
}

/// Body of `POST /api/v1/orders`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[schema(example = "INV-2026-0311")]
    pub order_id: String,
    #[serde(flatten)]
    pub fields: OrderFields,
}

/// Order as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: String,
    pub customer_id: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub order_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub shipping_address: Option<String>,
    /// Staff account that entered the order, when known.
    pub recorded_by: Option<i32>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let header = order.header();
        Self {
            order_id: order.id().as_str().to_owned(),
            customer_id: header.customer_id().map(|id| id.as_str().to_owned()),
            order_date: header.order_date(),
            total_amount: header.total_amount(),
            shipping_address: header.shipping_address().map(str::to_owned),
            recorded_by: order.recorded_by().map(|user| user.get()),
        }
    }
}

/// Paging and filter parameters for the order listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    /// Only orders placed by this customer.
    pub customer_id: Option<String>,
}

impl OrderQuery {
    fn filter(&self) -> Result<OrderFilter, Error> {
        let customer_id = self
            .customer_id
            .as_deref()
            .map(|raw| CustomerId::new(raw).map_err(key_error("customerId")))
            .transpose()?;
        Ok(OrderFilter { customer_id })
    }
}

fn order_id(raw: &str) -> Result<OrderId, Error> {
    OrderId::new(raw).map_err(key_error("orderId"))
}

/// List orders ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(OrderQuery),
    responses(
        (status = 200, description = "Orders", body = OrderPage),
        (status = 400, description = "Invalid cursor or filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OrderQuery>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let filter = query.filter()?;
    let page = page_request::<String>(query.cursor.as_deref(), query.limit)?;
    let orders = state.orders.list(&filter, &page).await?;
    page_response(&req, orders, OrderResponse::from)
}

/// Fetch one order.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderResponse>> {
    session.require_user_id()?;
    let id = order_id(&path)?;
    let order = state
        .orders
        .find(&id)
        .await?
        .ok_or_else(|| OrderRepositoryError::missing_order(&id))?;
    Ok(web::Json(order.into()))
}

/// Create an order recorded by the signed-in staff member.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = NewOrder,
    responses(
        (status = 201, description = "Created", body = OrderResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Customer not found", body = Error),
        (status = 409, description = "Order id already exists", body = Error)
    ),
    tags = ["orders"],
    operation_id = "createOrder"
)]
#[post("/orders")]
pub async fn create_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<NewOrder>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let NewOrder {
        order_id: raw_id,
        fields,
    } = payload.into_inner();
    let id = order_id(&raw_id)?;
    let header = OrderHeader::try_from(OrderDraft::from(fields))?;
    let order = state.orders.create(&id, &header, user_id).await?;
    info!(order_id = %id, %user_id, "order recorded");
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// Replace an order header.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    request_body = OrderFields,
    responses(
        (status = 200, description = "Updated", body = OrderResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Order or customer not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "updateOrder"
)]
#[put("/orders/{id}")]
pub async fn update_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<OrderFields>,
) -> ApiResult<web::Json<OrderResponse>> {
    session.require_user_id()?;
    let id = order_id(&path)?;
    let header = OrderHeader::try_from(OrderDraft::from(payload.into_inner()))?;
    let order = state.orders.update(&id, &header).await?;
    Ok(web::Json(order.into()))
}

/// Delete an order together with its lines and transactions.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["orders"],
    operation_id = "deleteOrder"
)]
#[delete("/orders/{id}")]
pub async fn delete_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id = order_id(&path)?;
    state.orders.delete(&id).await?;
    info!(order_id = %id, %user_id, "order deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Register the order routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_orders)
        .service(create_order)
        .service(get_order)
        .service(update_order)
        .service(delete_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::domain::ports::MockOrderRepository;
    use crate::inbound::http::test_utils::{TEST_USER, signed_in, test_app, unused_state};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use pagination::Page;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn state_with(repo: MockOrderRepository) -> HttpState {
        let mut state = unused_state();
        state.orders = Arc::new(repo);
        state
    }

    #[actix_web::test]
    async fn create_records_the_signed_in_user() {
        let mut repo = MockOrderRepository::new();
        repo.expect_create()
            .withf(|id, header, user| {
                id.as_str() == "INV-1"
                    && header.customer_id().map(CustomerId::as_str) == Some("C-1")
                    && *user == TEST_USER
            })
            .times(1)
            .returning(|id, header, user| Ok(Order::new(id.clone(), header.clone(), Some(user))));
        let app = test::init_service(test_app(state_with(repo), configure)).await;
        let cookie = signed_in(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/orders")
                .cookie(cookie)
                .set_json(json!({
                    "orderId": "INV-1",
                    "customerId": "C-1",
                    "orderDate": "2026-03-02",
                    "totalAmount": 12.0
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: OrderResponse = test::read_body_json(res).await;
        assert_eq!(body.recorded_by, Some(TEST_USER.get()));
        assert_eq!(body.order_date, NaiveDate::from_ymd_opt(2026, 3, 2));
    }

    #[actix_web::test]
    async fn walk_in_orders_omit_the_customer() {
        let mut repo = MockOrderRepository::new();
        repo.expect_find().times(1).returning(|id| {
            let header = OrderHeader::try_from(OrderDraft {
                customer_id: Some("  ".to_owned()),
                ..OrderDraft::default()
            })
            .expect("valid header");
            Ok(Some(Order::new(id.clone(), header, Some(UserId::new(2)))))
        });
        let app = test::init_service(test_app(state_with(repo), configure)).await;
        let cookie = signed_in(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/orders/INV-9")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["customerId"], Value::Null);
        assert_eq!(body["recordedBy"], json!(2));
    }

    #[actix_web::test]
    async fn listing_filters_by_customer() {
        let mut repo = MockOrderRepository::new();
        repo.expect_list()
            .withf(|filter, _| filter.customer_id.as_ref().map(CustomerId::as_str) == Some("C-7"))
            .times(1)
            .returning(|_, page| {
                Ok(Page::from_overfetch(Vec::new(), page.limit(), |o: &Order| {
                    o.id().as_str().to_owned()
                }))
            });
        let app = test::init_service(test_app(state_with(repo), configure)).await;
        let cookie = signed_in(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/orders?customerId=C-7")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_order_is_not_found() {
        let mut repo = MockOrderRepository::new();
        repo.expect_find().times(1).returning(|_| Ok(None));
        let app = test::init_service(test_app(state_with(repo), configure)).await;
        let cookie = signed_in(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/orders/INV-404")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let error: Error = test::read_body_json(res).await;
        assert_eq!(
            error.details().and_then(|d| d.get("code")),
            Some(&json!("order_not_found"))
        );
    }
}
