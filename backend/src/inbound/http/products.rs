//! Product handlers.
//!
//! Deleting a product also removes its order lines and inventory rows.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{ProductFilter, ProductRepositoryError};
use crate::domain::{Error, Product, ProductDetails, ProductDraft, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::paging::{page_request, page_response};
use crate::inbound::http::schemas::ProductPage;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::key_error;

/// Editable product fields.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    #[schema(example = "Assam loose leaf 250g")]
    pub product_name: Option<String>,
    #[schema(example = "tea")]
    pub category: Option<String>,
    /// Finite and non-negative.
    #[schema(example = 6.5)]
    pub unit_price: Option<f64>,
    pub product_description: Option<String>,
}

impl From<ProductFields> for ProductDraft {
    fn from(value: ProductFields) -> Self {
        Self {
            name: value.product_name,
            category: value.category,
            unit_price: value.unit_price,
            description: value.product_description,
        }
    }
}

/// Body of `POST /api/v1/products`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[schema(example = "SKU-0042")]
    pub product_id: String,
    #[serde(flatten)]
    pub fields: ProductFields,
}

/// Product as returned to clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[schema(example = "SKU-0042")]
    pub product_id: String,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<f64>,
    pub product_description: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        let details = product.details();
        Self {
            product_id: product.id().as_str().to_owned(),
            product_name: details.name().map(str::to_owned),
            category: details.category().map(str::to_owned),
            unit_price: details.unit_price(),
            product_description: details.description().map(str::to_owned),
        }
    }
}

/// Paging and filter parameters for the product listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Opaque cursor from a previous page's `next` link.
    pub cursor: Option<String>,
    /// Page size, 1 to 100 (default 20).
    pub limit: Option<u32>,
    /// Only products in this category (exact match).
    pub category: Option<String>,
}

fn product_id(raw: &str) -> Result<ProductId, Error> {
    ProductId::new(raw).map_err(key_error("productId"))
}

/// List products ordered by id.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products", body = ProductPage),
        (status = 400, description = "Invalid cursor", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["products"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ProductQuery>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let query = query.into_inner();
    let page = page_request::<String>(query.cursor.as_deref(), query.limit)?;
    let filter = ProductFilter {
        category: query
            .category
            .map(|category| category.trim().to_owned())
            .filter(|category| !category.is_empty()),
    };
    let products = state.products.list(&filter, &page).await?;
    page_response(&req, products, ProductResponse::from)
}

/// Fetch one product.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "getProduct"
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProductResponse>> {
    session.require_user_id()?;
    let id = product_id(&path)?;
    let product = state
        .products
        .find(&id)
        .await?
        .ok_or_else(|| ProductRepositoryError::missing(&id))?;
    Ok(web::Json(product.into()))
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Created", body = ProductResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Product id already exists", body = Error)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<NewProduct>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let NewProduct {
        product_id: raw_id,
        fields,
    } = payload.into_inner();
    let id = product_id(&raw_id)?;
    let details = ProductDetails::try_from(ProductDraft::from(fields))?;
    let product = state.products.create(&id, &details).await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// Replace a product's editable fields.
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = ProductFields,
    responses(
        (status = 200, description = "Updated", body = ProductResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProductFields>,
) -> ApiResult<web::Json<ProductResponse>> {
    session.require_user_id()?;
    let id = product_id(&path)?;
    let details = ProductDetails::try_from(ProductDraft::from(payload.into_inner()))?;
    let product = state.products.update(&id, &details).await?;
    Ok(web::Json(product.into()))
}

/// Delete a product with its order lines and inventory rows.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id = product_id(&path)?;
    state.products.delete(&id).await?;
    info!(product_id = %id, %user_id, "product deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Register the product routes on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_products)
        .service(create_product)
        .service(get_product)
        .service(update_product)
        .service(delete_product);
}
