//! Customer handlers.
//!
//! ```text
//! GET    /api/v1/customers?cursor=..&limit=20
//! POST   /api/v1/customers        {"customerId":"C-001","name":"Ada",...}
//! GET    /api/v1/customers/{id}
//! PUT    /api/v1/customers/{id}   {"name":"Ada",...}
//! DELETE /api/v1/customers/{id}
//! ```
//!
//! `lastPurchaseDate` is output-only; it is derived from order history.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::CustomerRepositoryError;
use crate::domain::{Customer, CustomerDetails, CustomerDraft, CustomerId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{page_request, page_response};
use crate::inbound::http::schemas::CustomerPage;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::key_error;

/// Editable customer fields.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFields {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    #[schema(example = "GB")]
    pub country: Option<String>,
}

impl From<CustomerFields> for CustomerDraft {
    fn from(value: CustomerFields) -> Self {
        Self {
            name: value.name,
            email: value.email,
            contact_number: value.contact_number,
            address: value.address,
            country: value.country,
        }
    }
}

/// Body of `POST /api/v1/customers`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    /// Caller-chosen key, at most 512 characters.
    #[schema(example = "C-001")]
    pub customer_id: String,
    #[serde(flatten)]
    pub fields: CustomerFields,
}

/// Customer as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    #[schema(example = "C-001")]
    pub customer_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    /// Latest order date; absent when the customer has no orders.
    pub last_purchase_date: Option<NaiveDate>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        let details = customer.details();
        Self {
            customer_id: customer.id().as_str().to_owned(),
            name: details.name().map(str::to_owned),
            email: details.email().map(str::to_owned),
            contact_number: details.contact_number().map(str::to_owned),
            address: details.address().map(str::to_owned),
            country: details.country().map(str::to_owned),
            last_purchase_date: customer.last_purchase_date(),
        }
    }
}

/// Paging parameters for the customer listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerQuery {
    /// Opaque cursor from a previous page's `next` link.
    pub cursor: Option<String>,
    /// Page size, 1 to 100 (default 20).
    pub limit: Option<u32>,
}

fn customer_id(raw: &str) -> Result<CustomerId, Error> {
    CustomerId::new(raw).map_err(key_error("customerId"))
}

/// List customers ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    params(CustomerQuery),
    responses(
        (status = 200, description = "Customers", body = CustomerPage),
        (status = 400, description = "Invalid cursor", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["customers"],
    operation_id = "listCustomers"
)]
#[get("/customers")]
pub async fn list_customers(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CustomerQuery>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let page = page_request::<String>(query.cursor.as_deref(), query.limit)?;
    let customers = state.customers.list(&page).await?;
    page_response(&req, customers, CustomerResponse::from)
}

/// Fetch one customer.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    params(("id" = String, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = CustomerResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["customers"],
    operation_id = "getCustomer"
)]
#[get("/customers/{id}")]
pub async fn get_customer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CustomerResponse>> {
    session.require_user_id()?;
    let id = customer_id(&path)?;
    let customer = state
        .customers
        .find(&id)
        .await?
        .ok_or_else(|| CustomerRepositoryError::missing(&id))?;
    Ok(web::Json(customer.into()))
}

/// Create a customer.
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = NewCustomer,
    responses(
        (status = 201, description = "Created", body = CustomerResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Customer id already exists", body = Error)
    ),
    tags = ["customers"],
    operation_id = "createCustomer"
)]
#[post("/customers")]
pub async fn create_customer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<NewCustomer>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let NewCustomer {
        customer_id: raw_id,
        fields,
    } = payload.into_inner();
    let id = customer_id(&raw_id)?;
    let details = CustomerDetails::try_from(CustomerDraft::from(fields))?;
    let customer = state.customers.create(&id, &details).await?;
    Ok(HttpResponse::Created().json(CustomerResponse::from(customer)))
}

/// Replace a customer's editable fields.
#[utoipa::path(
    put,
    path = "/api/v1/customers/{id}",
    params(("id" = String, Path, description = "Customer id")),
    request_body = CustomerFields,
    responses(
        (status = 200, description = "Updated", body = CustomerResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["customers"],
    operation_id = "updateCustomer"
)]
#[put("/customers/{id}")]
pub async fn update_customer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CustomerFields>,
) -> ApiResult<web::Json<CustomerResponse>> {
    session.require_user_id()?;
    let id = customer_id(&path)?;
    let details = CustomerDetails::try_from(CustomerDraft::from(payload.into_inner()))?;
    let customer = state.customers.update(&id, &details).await?;
    Ok(web::Json(customer.into()))
}

/// Delete a customer without orders, together with their payment methods.
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    params(("id" = String, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Customer has orders", body = Error)
    ),
    tags = ["customers"],
    operation_id = "deleteCustomer"
)]
#[delete("/customers/{id}")]
pub async fn delete_customer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id = customer_id(&path)?;
    state.customers.delete(&id).await?;
    info!(customer_id = %id, %user_id, "customer deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Register the customer routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_customers)
        .service(create_customer)
        .service(get_customer)
        .service(update_customer)
        .service(delete_customer);
}
