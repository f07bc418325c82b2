//! PostgreSQL-backed `ProductRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use pagination::{Page, PageRequest};
use tracing::debug;

use crate::domain::ports::{ProductFilter, ProductRepository, ProductRepositoryError};
use crate::domain::{Product, ProductDetails, ProductDraft, ProductId};

use super::diesel_basic_error_mapping::impl_diesel_error_conversion;
use super::models::{NewProductRow, ProductRow, ProductUpdate};
use super::pool::DbPool;
use super::schema::{inventory, order_details, products};

impl_diesel_error_conversion!(ProductRepositoryError);

/// Diesel-backed implementation of the product repository port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: ProductRow) -> Result<Product, ProductRepositoryError> {
    let id = ProductId::new(&row.product_id)
        .map_err(|err| ProductRepositoryError::query(format!("stored product id: {err}")))?;
    let details = ProductDetails::try_from(ProductDraft {
        name: row.product_name,
        category: row.category,
        unit_price: row.unit_price,
        description: row.product_description,
    })
    .map_err(|err| ProductRepositoryError::query(format!("stored product {id}: {err}")))?;
    Ok(Product::new(id, details))
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest<String>,
    ) -> Result<Page<Product, String>, ProductRepositoryError> {
        let mut conn = self.pool.get().await?;

        let mut query = products::table
            .select(ProductRow::as_select())
            .order(products::product_id.asc())
            .limit(page.fetch_limit())
            .into_boxed();
        if let Some(category) = filter.category.as_deref() {
            query = query.filter(products::category.eq(category));
        }
        if let Some(after) = page.after() {
            query = query.filter(products::product_id.gt(after.as_str()));
        }

        let rows: Vec<ProductRow> = query.load(&mut conn).await?;
        let products = rows
            .into_iter()
            .map(row_to_product)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(products, page.limit(), |product| {
            product.id().as_str().to_owned()
        }))
    }

    async fn find(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await?;

        products::table
            .find(id.as_str())
            .select(ProductRow::as_select())
            .first::<ProductRow>(&mut conn)
            .await
            .optional()?
            .map(row_to_product)
            .transpose()
    }

    async fn create(
        &self,
        id: &ProductId,
        details: &ProductDetails,
    ) -> Result<Product, ProductRepositoryError> {
        let mut conn = self.pool.get().await?;

        let inserted = diesel::insert_into(products::table)
            .values(&NewProductRow::new(id.as_str(), details))
            .on_conflict(products::product_id)
            .do_nothing()
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .await
            .optional()?;

        match inserted {
            Some(row) => row_to_product(row),
            None => Err(ProductRepositoryError::conflict(
                "product_exists",
                format!("product {id} already exists"),
            )),
        }
    }

    async fn update(
        &self,
        id: &ProductId,
        details: &ProductDetails,
    ) -> Result<Product, ProductRepositoryError> {
        let mut conn = self.pool.get().await?;

        diesel::update(products::table.find(id.as_str()))
            .set(&ProductUpdate::from(details))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .await
            .optional()?
            .map(row_to_product)
            .transpose()?
            .ok_or_else(|| ProductRepositoryError::missing(id))
    }

    async fn delete(&self, id: &ProductId) -> Result<(), ProductRepositoryError> {
        let mut conn = self.pool.get().await?;

        let (removed_lines, removed_stock) = conn
            .transaction::<_, ProductRepositoryError, _>(|conn| {
                async move {
                    let locked = products::table
                        .find(id.as_str())
                        .select(products::product_id)
                        .for_update()
                        .first::<String>(conn)
                        .await
                        .optional()?;
                    if locked.is_none() {
                        return Err(ProductRepositoryError::missing(id));
                    }

                    let removed_lines = diesel::delete(
                        order_details::table.filter(order_details::product_id.eq(id.as_str())),
                    )
                    .execute(conn)
                    .await?;
                    let removed_stock = diesel::delete(
                        inventory::table.filter(inventory::product_id.eq(id.as_str())),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(products::table.find(id.as_str()))
                        .execute(conn)
                        .await?;
                    Ok((removed_lines, removed_stock))
                }
                .scope_boxed()
            })
            .await?;

        debug!(
            product_id = %id,
            removed_lines,
            removed_stock,
            "product cascade removed dependents"
        );
        Ok(())
    }
}
