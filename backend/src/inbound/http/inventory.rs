//! Inventory handlers, including the restock action.
//!
//! ```text
//! GET  /api/v1/inventory?below=5
//! POST /api/v1/inventory/3/restock {"quantity":24,"date":"2026-03-01"}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{InventoryFilter, InventoryRepositoryError};
use crate::domain::{
    Error, InventoryDetails, InventoryDraft, InventoryId, InventoryRecord, Restock,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{page_request, page_response};
use crate::inbound::http::schemas::InventoryPage;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::out_of_range_error;

/// Body for creating or replacing an inventory record.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFields {
    #[schema(example = "SKU-0042")]
    pub product_id: String,
    #[schema(example = 40)]
    pub stock_quantity: Option<i32>,
    #[schema(value_type = Option<String>, format = Date, example = "2026-02-27")]
    pub last_restocked: Option<NaiveDate>,
}

impl From<InventoryFields> for InventoryDraft {
    fn from(value: InventoryFields) -> Self {
        Self {
            product_id: value.product_id,
            stock_quantity: value.stock_quantity,
            last_restocked: value.last_restocked,
        }
    }
}

/// Inventory record as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    #[schema(example = 3)]
    pub inventory_id: i32,
    pub product_id: String,
    pub stock_quantity: Option<i32>,
    #[schema(value_type = Option<String>, format = Date)]
    pub last_restocked: Option<NaiveDate>,
}

impl From<InventoryRecord> for InventoryResponse {
    fn from(record: InventoryRecord) -> Self {
        let details = record.details();
        Self {
            inventory_id: record.id().get(),
            product_id: details.product_id().as_str().to_owned(),
            stock_quantity: details.stock_quantity(),
            last_restocked: details.last_restocked(),
        }
    }
}

/// Body of the restock action.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    /// Units received; must be positive.
    #[schema(example = 24)]
    pub quantity: i32,
    /// Delivery date; defaults to today (UTC).
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

/// Paging and filter parameters for the inventory listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InventoryQuery {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    /// Only records whose stock is strictly below this value; unknown stock
    /// counts as zero.
    pub below: Option<i32>,
}

impl InventoryQuery {
    fn filter(&self) -> Result<InventoryFilter, Error> {
        match self.below {
            Some(below) if below < 0 => {
                Err(out_of_range_error("below", "below must not be negative"))
            }
            below => Ok(InventoryFilter { below }),
        }
    }
}

/// List inventory records ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(InventoryQuery),
    responses(
        (status = 200, description = "Inventory records", body = InventoryPage),
        (status = 400, description = "Invalid cursor or filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["inventory"],
    operation_id = "listInventory"
)]
#[get("/inventory")]
pub async fn list_inventory(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<InventoryQuery>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let filter = query.filter()?;
    let page = page_request::<i32>(query.cursor.as_deref(), query.limit)?;
    let records = state.inventory.list(&filter, &page).await?;
    page_response(&req, records, InventoryResponse::from)
}

/// Fetch one inventory record.
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    params(("id" = i32, Path, description = "Inventory record id")),
    responses(
        (status = 200, description = "Inventory record", body = InventoryResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["inventory"],
    operation_id = "getInventory"
)]
#[get("/inventory/{id}")]
pub async fn get_inventory(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<InventoryResponse>> {
    session.require_user_id()?;
    let id = InventoryId::new(path.into_inner());
    let record = state
        .inventory
        .find(id)
        .await?
        .ok_or_else(|| InventoryRepositoryError::missing(id))?;
    Ok(web::Json(record.into()))
}

/// Create an inventory record for an existing product.
#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    request_body = InventoryFields,
    responses(
        (status = 201, description = "Created", body = InventoryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Product not found", body = Error)
    ),
    tags = ["inventory"],
    operation_id = "createInventory"
)]
#[post("/inventory")]
pub async fn create_inventory(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<InventoryFields>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let details = InventoryDetails::try_from(InventoryDraft::from(payload.into_inner()))?;
    let record = state.inventory.create(&details).await?;
    Ok(HttpResponse::Created().json(InventoryResponse::from(record)))
}

/// Replace an inventory record.
#[utoipa::path(
    put,
    path = "/api/v1/inventory/{id}",
    params(("id" = i32, Path, description = "Inventory record id")),
    request_body = InventoryFields,
    responses(
        (status = 200, description = "Updated", body = InventoryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Record or product not found", body = Error)
    ),
    tags = ["inventory"],
    operation_id = "updateInventory"
)]
#[put("/inventory/{id}")]
pub async fn update_inventory(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<InventoryFields>,
) -> ApiResult<web::Json<InventoryResponse>> {
    session.require_user_id()?;
    let id = InventoryId::new(path.into_inner());
    let details = InventoryDetails::try_from(InventoryDraft::from(payload.into_inner()))?;
    let record = state.inventory.update(id, &details).await?;
    Ok(web::Json(record.into()))
}

/// Delete an inventory record.
#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{id}",
    params(("id" = i32, Path, description = "Inventory record id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["inventory"],
    operation_id = "deleteInventory"
)]
#[delete("/inventory/{id}")]
pub async fn delete_inventory(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    state
        .inventory
        .delete(InventoryId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Record a delivery against an inventory record.
#[utoipa::path(
    post,
    path = "/api/v1/inventory/{id}/restock",
    params(("id" = i32, Path, description = "Inventory record id")),
    request_body = RestockRequest,
    responses(
        (status = 200, description = "Stock updated", body = InventoryResponse),
        (status = 400, description = "Invalid quantity", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Stock level would overflow", body = Error)
    ),
    tags = ["inventory"],
    operation_id = "restockInventory"
)]
#[post("/inventory/{id}/restock")]
pub async fn restock_inventory(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<RestockRequest>,
) -> ApiResult<web::Json<InventoryResponse>> {
    let user_id = session.require_user_id()?;
    let id = InventoryId::new(path.into_inner());
    let RestockRequest { quantity, date } = payload.into_inner();
    let received_on = date.unwrap_or_else(|| state.clock.utc().date_naive());
    let restock = Restock::new(quantity, received_on)?;
    let record = state.inventory.restock(id, restock).await?;
    info!(inventory_id = %id, quantity, %user_id, "inventory restocked");
    Ok(web::Json(record.into()))
}

/// Register the inventory routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_inventory)
        .service(create_inventory)
        .service(get_inventory)
        .service(update_inventory)
        .service(delete_inventory)
        .service(restock_inventory);
}
