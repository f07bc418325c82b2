//! Payment transaction handlers.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{PaymentRepositoryError, TransactionFilter};
use crate::domain::{
    Error, OrderId, Transaction, TransactionDetails, TransactionDraft, TransactionId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{page_request, page_response};
use crate::inbound::http::schemas::TransactionPage;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::key_error;

/// Body for creating or replacing a transaction.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFields {
    #[schema(example = "INV-2026-0311")]
    pub order_id: String,
    #[schema(example = 5)]
    pub payment_method_id: i32,
    #[schema(example = "settled")]
    pub payment_status: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
    #[schema(example = 42.5)]
    pub amount: Option<f64>,
}

impl From<TransactionFields> for TransactionDraft {
    fn from(value: TransactionFields) -> Self {
        Self {
            order_id: value.order_id,
            payment_method_id: value.payment_method_id,
            payment_status: value.payment_status,
            payment_date: value.payment_date,
            amount: value.amount,
        }
    }
}

/// Transaction as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub transaction_id: i32,
    pub order_id: String,
    pub payment_method_id: i32,
    pub payment_status: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
    pub amount: Option<f64>,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        let details = transaction.details();
        Self {
            transaction_id: transaction.id().get(),
            order_id: details.order_id().as_str().to_owned(),
            payment_method_id: details.payment_method_id().get(),
            payment_status: details.payment_status().map(str::to_owned),
            payment_date: details.payment_date(),
            amount: details.amount(),
        }
    }
}

/// Paging and filter parameters for the transaction listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TransactionQuery {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    /// Only transactions paying this order.
    pub order_id: Option<String>,
}

/// List transactions ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(TransactionQuery),
    responses(
        (status = 200, description = "Transactions", body = TransactionPage),
        (status = 400, description = "Invalid cursor or filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["payments"],
    operation_id = "listTransactions"
)]
#[get("/transactions")]
pub async fn list_transactions(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TransactionQuery>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let filter = TransactionFilter {
        order_id: query
            .order_id
            .as_deref()
            .map(|raw| OrderId::new(raw).map_err(key_error("orderId")))
            .transpose()?,
    };
    let page = page_request::<i32>(query.cursor.as_deref(), query.limit)?;
    let transactions = state.payments.list_transactions(&filter, &page).await?;
    page_response(&req, transactions, TransactionResponse::from)
}

/// Fetch one transaction.
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{id}",
    params(("id" = i32, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction", body = TransactionResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["payments"],
    operation_id = "getTransaction"
)]
#[get("/transactions/{id}")]
pub async fn get_transaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<TransactionResponse>> {
    session.require_user_id()?;
    let id = TransactionId::new(path.into_inner());
    let transaction = state
        .payments
        .find_transaction(id)
        .await?
        .ok_or_else(|| PaymentRepositoryError::missing_transaction(id))?;
    Ok(web::Json(transaction.into()))
}

/// Record a payment against an order.
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = TransactionFields,
    responses(
        (status = 201, description = "Created", body = TransactionResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Order or payment method not found", body = Error)
    ),
    tags = ["payments"],
    operation_id = "createTransaction"
)]
#[post("/transactions")]
pub async fn create_transaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TransactionFields>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let details = TransactionDetails::try_from(TransactionDraft::from(payload.into_inner()))?;
    let transaction = state.payments.create_transaction(&details).await?;
    Ok(HttpResponse::Created().json(TransactionResponse::from(transaction)))
}

/// Replace a transaction.
#[utoipa::path(
    put,
    path = "/api/v1/transactions/{id}",
    params(("id" = i32, Path, description = "Transaction id")),
    request_body = TransactionFields,
    responses(
        (status = 200, description = "Updated", body = TransactionResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Transaction, order or method not found", body = Error)
    ),
    tags = ["payments"],
    operation_id = "updateTransaction"
)]
#[put("/transactions/{id}")]
pub async fn update_transaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<TransactionFields>,
) -> ApiResult<web::Json<TransactionResponse>> {
    session.require_user_id()?;
    let id = TransactionId::new(path.into_inner());
    let details = TransactionDetails::try_from(TransactionDraft::from(payload.into_inner()))?;
    let transaction = state.payments.update_transaction(id, &details).await?;
    Ok(web::Json(transaction.into()))
}

/// Delete a transaction.
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{id}",
    params(("id" = i32, Path, description = "Transaction id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["payments"],
    operation_id = "deleteTransaction"
)]
#[delete("/transactions/{id}")]
pub async fn delete_transaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state
        .payments
        .delete_transaction(TransactionId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the transaction routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_transactions)
        .service(create_transaction)
        .service(get_transaction)
        .service(update_transaction)
        .service(delete_transaction);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockPaymentRepository;
    use crate::inbound::http::test_utils::{signed_in, test_app, unused_state};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;
    use std::sync::Arc;

    #[actix_web::test]
    async fn create_forwards_the_validated_transaction() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_create_transaction()
            .withf(|details| {
                details.order_id().as_str() == "INV-1"
                    && details.payment_method_id().get() == 5
                    && details.payment_status() == Some("settled")
            })
            .times(1)
            .returning(|details| Ok(Transaction::new(TransactionId::new(8), details.clone())));
        let mut state = unused_state();
        state.payments = Arc::new(repo);
        let app = test::init_service(test_app(state, configure)).await;
        let cookie = signed_in(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/transactions")
                .cookie(cookie)
                .set_json(json!({
                    "orderId": "INV-1",
                    "paymentMethodId": 5,
                    "paymentStatus": "settled",
                    "paymentDate": "2026-03-03",
                    "amount": 42.5
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: TransactionResponse = test::read_body_json(res).await;
        assert_eq!(body.transaction_id, 8);
        assert_eq!(body.amount, Some(42.5));
    }

    #[actix_web::test]
    async fn negative_amount_is_rejected() {
        let app = test::init_service(test_app(unused_state(), configure)).await;
        let cookie = signed_in(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/transactions")
                .cookie(cookie)
                .set_json(json!({ "orderId": "INV-1", "paymentMethodId": 5, "amount": -1 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let error: Error = test::read_body_json(res).await;
        assert_eq!(
            error.details().and_then(|d| d.get("field")),
            Some(&json!("amount"))
        );
    }

    #[actix_web::test]
    async fn missing_transaction_is_not_found() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_find_transaction().times(1).returning(|_| Ok(None));
        let mut state = unused_state();
        state.payments = Arc::new(repo);
        let app = test::init_service(test_app(state, configure)).await;
        let cookie = signed_in(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/transactions/77")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let error: Error = test::read_body_json(res).await;
        assert_eq!(
            error.details().and_then(|d| d.get("code")),
            Some(&json!("transaction_not_found"))
        );
    }
}
