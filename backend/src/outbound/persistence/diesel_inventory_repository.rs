//! PostgreSQL-backed `InventoryRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use tracing::debug;

use crate::domain::ports::{InventoryFilter, InventoryRepository, InventoryRepositoryError};
use crate::domain::{
    InventoryDetails, InventoryDraft, InventoryId, InventoryRecord, ProductId, Restock,
};

use super::diesel_basic_error_mapping::impl_diesel_error_conversion;
use super::models::{InventoryRow, InventoryValues};
use super::pool::DbPool;
use super::schema::{inventory, products};

impl_diesel_error_conversion!(InventoryRepositoryError);

/// Diesel-backed implementation of the inventory repository port.
#[derive(Clone)]
pub struct DieselInventoryRepository {
    pool: DbPool,
}

impl DieselInventoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: InventoryRow) -> Result<InventoryRecord, InventoryRepositoryError> {
    let id = InventoryId::new(row.id);
    let details = InventoryDetails::try_from(InventoryDraft {
        product_id: row.product_id,
        stock_quantity: row.stock_quantity,
        last_restocked: row.last_restocked,
    })
    .map_err(|err| InventoryRepositoryError::query(format!("stored inventory {id}: {err}")))?;
    Ok(InventoryRecord::new(id, details))
}

/// Share-lock the product so it cannot be deleted before the write commits.
async fn ensure_product(
    conn: &mut AsyncPgConnection,
    product_id: &ProductId,
) -> Result<(), InventoryRepositoryError> {
    let found = products::table
        .find(product_id.as_str())
        .select(products::product_id)
        .for_share()
        .first::<String>(conn)
        .await
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(InventoryRepositoryError::not_found(
            "product_not_found",
            format!("product {product_id} not found"),
        )),
    }
}

#[async_trait]
impl InventoryRepository for DieselInventoryRepository {
    async fn list(
        &self,
        filter: &InventoryFilter,
        page: &PageRequest<i32>,
    ) -> Result<Page<InventoryRecord, i32>, InventoryRepositoryError> {
        let mut conn = self.pool.get().await?;

        let mut query = inventory::table
            .select(InventoryRow::as_select())
            .order(inventory::id.asc())
            .limit(page.fetch_limit())
            .into_boxed();
        if let Some(below) = filter.below {
            // Unknown stock counts as empty, as on the dashboard.
            query = query.filter(
                inventory::stock_quantity
                    .is_null()
                    .or(inventory::stock_quantity.lt(below)),
            );
        }
        if let Some(after) = page.after() {
            query = query.filter(inventory::id.gt(*after));
        }

        let rows: Vec<InventoryRow> = query.load(&mut conn).await?;
        let records = rows
            .into_iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(records, page.limit(), |record| {
            record.id().get()
        }))
    }

    async fn find(
        &self,
        id: InventoryId,
    ) -> Result<Option<InventoryRecord>, InventoryRepositoryError> {
        let mut conn = self.pool.get().await?;

        inventory::table
            .find(id.get())
            .select(InventoryRow::as_select())
            .first::<InventoryRow>(&mut conn)
            .await
            .optional()?
            .map(row_to_record)
            .transpose()
    }

    async fn create(
        &self,
        details: &InventoryDetails,
    ) -> Result<InventoryRecord, InventoryRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, InventoryRepositoryError, _>(|conn| {
                async move {
                    ensure_product(conn, details.product_id()).await?;
                    let row = diesel::insert_into(inventory::table)
                        .values(&InventoryValues::from(details))
                        .returning(InventoryRow::as_returning())
                        .get_result::<InventoryRow>(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        row_to_record(row)
    }

    async fn update(
        &self,
        id: InventoryId,
        details: &InventoryDetails,
    ) -> Result<InventoryRecord, InventoryRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, InventoryRepositoryError, _>(|conn| {
                async move {
                    ensure_product(conn, details.product_id()).await?;
                    diesel::update(inventory::table.find(id.get()))
                        .set(&InventoryValues::from(details))
                        .returning(InventoryRow::as_returning())
                        .get_result::<InventoryRow>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| InventoryRepositoryError::missing(id))
                }
                .scope_boxed()
            })
            .await?;

        row_to_record(row)
    }

    async fn delete(&self, id: InventoryId) -> Result<(), InventoryRepositoryError> {
        let mut conn = self.pool.get().await?;

        let removed = diesel::delete(inventory::table.find(id.get()))
            .execute(&mut conn)
            .await?;
        if removed == 0 {
            return Err(InventoryRepositoryError::missing(id));
        }
        Ok(())
    }

    async fn restock(
        &self,
        id: InventoryId,
        restock: Restock,
    ) -> Result<InventoryRecord, InventoryRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, InventoryRepositoryError, _>(|conn| {
                async move {
                    let current = inventory::table
                        .find(id.get())
                        .select(inventory::stock_quantity)
                        .for_update()
                        .first::<Option<i32>>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| InventoryRepositoryError::missing(id))?;
                    let Some(stock) = restock.apply_to(current) else {
                        return Err(InventoryRepositoryError::conflict(
                            "stock_overflow",
                            format!("restocking inventory record {id} would overflow its stock level"),
                        ));
                    };
                    let row = diesel::update(inventory::table.find(id.get()))
                        .set((
                            inventory::stock_quantity.eq(Some(stock)),
                            inventory::last_restocked.eq(Some(restock.received_on())),
                        ))
                        .returning(InventoryRow::as_returning())
                        .get_result::<InventoryRow>(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        debug!(
            inventory_id = %id,
            received = restock.quantity(),
            stock = ?row.stock_quantity,
            "stock level updated"
        );
        row_to_record(row)
    }
}
