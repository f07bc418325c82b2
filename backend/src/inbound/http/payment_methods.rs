//! Payment method handlers.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{PaymentMethodFilter, PaymentRepositoryError};
use crate::domain::{
    CustomerId, Error, PaymentMethod, PaymentMethodDetails, PaymentMethodDraft, PaymentMethodId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{page_request, page_response};
use crate::inbound::http::schemas::PaymentMethodPage;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::key_error;

/// Body for creating or replacing a payment method.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodFields {
    #[schema(example = "C-00017")]
    pub customer_id: String,
    #[schema(example = "card")]
    pub method_type: Option<String>,
    #[schema(example = "Visa")]
    pub provider: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2028-09-30")]
    pub expiry_date: Option<NaiveDate>,
}

impl From<PaymentMethodFields> for PaymentMethodDraft {
    fn from(value: PaymentMethodFields) -> Self {
        Self {
            customer_id: value.customer_id,
            method_type: value.method_type,
            provider: value.provider,
            expiry_date: value.expiry_date,
        }
    }
}

/// Payment method as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodResponse {
    pub payment_method_id: i32,
    pub customer_id: String,
    pub method_type: Option<String>,
    pub provider: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub expiry_date: Option<NaiveDate>,
}

impl From<PaymentMethod> for PaymentMethodResponse {
    fn from(method: PaymentMethod) -> Self {
        let details = method.details();
        Self {
            payment_method_id: method.id().get(),
            customer_id: details.customer_id().as_str().to_owned(),
            method_type: details.method_type().map(str::to_owned),
            provider: details.provider().map(str::to_owned),
            expiry_date: details.expiry_date(),
        }
    }
}

/// Paging and filter parameters for the payment method listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaymentMethodQuery {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    /// Only methods owned by this customer.
    pub customer_id: Option<String>,
}

/// List payment methods ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/payment-methods",
    params(PaymentMethodQuery),
    responses(
        (status = 200, description = "Payment methods", body = PaymentMethodPage),
        (status = 400, description = "Invalid cursor or filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["payments"],
    operation_id = "listPaymentMethods"
)]
#[get("/payment-methods")]
pub async fn list_payment_methods(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PaymentMethodQuery>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let filter = PaymentMethodFilter {
        customer_id: query
            .customer_id
            .as_deref()
            .map(|raw| CustomerId::new(raw).map_err(key_error("customerId")))
            .transpose()?,
    };
    let page = page_request::<i32>(query.cursor.as_deref(), query.limit)?;
    let methods = state.payments.list_methods(&filter, &page).await?;
    page_response(&req, methods, PaymentMethodResponse::from)
}

/// Fetch one payment method.
#[utoipa::path(
    get,
    path = "/api/v1/payment-methods/{id}",
    params(("id" = i32, Path, description = "Payment method id")),
    responses(
        (status = 200, description = "Payment method", body = PaymentMethodResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["payments"],
    operation_id = "getPaymentMethod"
)]
#[get("/payment-methods/{id}")]
pub async fn get_payment_method(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<PaymentMethodResponse>> {
    session.require_user_id()?;
    let id = PaymentMethodId::new(path.into_inner());
    let method = state
        .payments
        .find_method(id)
        .await?
        .ok_or_else(|| PaymentRepositoryError::missing_method(id))?;
    Ok(web::Json(method.into()))
}

/// Register a payment method for an existing customer.
#[utoipa::path(
    post,
    path = "/api/v1/payment-methods",
    request_body = PaymentMethodFields,
    responses(
        (status = 201, description = "Created", body = PaymentMethodResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Customer not found", body = Error)
    ),
    tags = ["payments"],
    operation_id = "createPaymentMethod"
)]
#[post("/payment-methods")]
pub async fn create_payment_method(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PaymentMethodFields>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let details = PaymentMethodDetails::try_from(PaymentMethodDraft::from(payload.into_inner()))?;
    let method = state.payments.create_method(&details).await?;
    Ok(HttpResponse::Created().json(PaymentMethodResponse::from(method)))
}

/// Replace a payment method.
#[utoipa::path(
    put,
    path = "/api/v1/payment-methods/{id}",
    params(("id" = i32, Path, description = "Payment method id")),
    request_body = PaymentMethodFields,
    responses(
        (status = 200, description = "Updated", body = PaymentMethodResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Method or customer not found", body = Error)
    ),
    tags = ["payments"],
    operation_id = "updatePaymentMethod"
)]
#[put("/payment-methods/{id}")]
pub async fn update_payment_method(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<PaymentMethodFields>,
) -> ApiResult<web::Json<PaymentMethodResponse>> {
    session.require_user_id()?;
    let id = PaymentMethodId::new(path.into_inner());
    let details = PaymentMethodDetails::try_from(PaymentMethodDraft::from(payload.into_inner()))?;
    let method = state.payments.update_method(id, &details).await?;
    Ok(web::Json(method.into()))
}

/// Delete a payment method no transaction refers to.
#[utoipa::path(
    delete,
    path = "/api/v1/payment-methods/{id}",
    params(("id" = i32, Path, description = "Payment method id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Transactions still use this method", body = Error)
    ),
    tags = ["payments"],
    operation_id = "deletePaymentMethod"
)]
#[delete("/payment-methods/{id}")]
pub async fn delete_payment_method(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state
        .payments
        .delete_method(PaymentMethodId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the payment method routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_payment_methods)
        .service(create_payment_method)
        .service(get_payment_method)
        .service(update_payment_method)
        .service(delete_payment_method);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockPaymentRepository;
    use crate::inbound::http::test_utils::{signed_in, test_app, unused_state};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use pagination::Page;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn method(id: i32, customer: &str) -> PaymentMethod {
        let details = PaymentMethodDetails::try_from(PaymentMethodDraft {
            customer_id: customer.to_owned(),
            method_type: Some("card".to_owned()),
            ..PaymentMethodDraft::default()
        })
        .expect("valid method");
        PaymentMethod::new(PaymentMethodId::new(id), details)
    }

    #[actix_web::test]
    async fn listing_filters_by_customer() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_list_methods()
            .withf(|filter, _| filter.customer_id.as_ref().map(CustomerId::as_str) == Some("C-2"))
            .times(1)
            .returning(|_, page| {
                Ok(Page::from_overfetch(
                    vec![method(5, "C-2")],
                    page.limit(),
                    |m: &PaymentMethod| m.id().get(),
                ))
            });
        let mut state = unused_state();
        state.payments = Arc::new(repo);
        let app = test::init_service(test_app(state, configure)).await;
        let cookie = signed_in(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/payment-methods?customerId=C-2")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"][0]["paymentMethodId"], json!(5));
        assert_eq!(body["data"][0]["methodType"], json!("card"));
    }

    #[actix_web::test]
    async fn deleting_a_method_in_use_is_a_conflict() {
        let mut repo = MockPaymentRepository::new();
        repo.expect_delete_method().times(1).returning(|id| {
            Err(PaymentRepositoryError::conflict(
                "payment_method_in_use",
                format!("payment method {id} is referenced by transactions"),
            ))
        });
        let mut state = unused_state();
        state.payments = Arc::new(repo);
        let app = test::init_service(test_app(state, configure)).await;
        let cookie = signed_in(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/api/v1/payment-methods/5")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let error: Error = test::read_body_json(res).await;
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(
            error.details().and_then(|d| d.get("code")),
            Some(&json!("payment_method_in_use"))
        );
    }

    #[actix_web::test]
    async fn non_numeric_path_is_a_bad_request() {
        let app = test::init_service(test_app(unused_state(), configure)).await;
        let cookie = signed_in(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/payment-methods/abc")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
