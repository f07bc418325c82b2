//! PostgreSQL-backed `OrderRepository` implementation using Diesel ORM.
//!
//! Every order write runs in one transaction that locks the affected
//! customer rows (`FOR UPDATE`, in key order) and then recomputes their
//! `last_purchase_date` from the orders that remain. Rolling back on any
//! error leaves both the order and the derived date untouched.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use tracing::debug;

use crate::domain::ports::{OrderFilter, OrderLineFilter, OrderRepository, OrderRepositoryError};
use crate::domain::{
    CustomerId, Order, OrderDraft, OrderHeader, OrderId, OrderLine, OrderLineDetails,
    OrderLineDraft, OrderLineId, ProductId, UserId,
};

use super::diesel_basic_error_mapping::impl_diesel_error_conversion;
use super::models::{NewOrderRow, OrderLineRow, OrderLineValues, OrderRow, OrderUpdate};
use super::pool::DbPool;
use super::schema::{customers, order_details, orders, products, transactions};

impl_diesel_error_conversion!(OrderRepositoryError);

/// Diesel-backed implementation of the order repository port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_order(row: OrderRow) -> Result<Order, OrderRepositoryError> {
    let OrderRow {
        order_id,
        customer_id,
        order_date,
        total_amount,
        shipping_address,
        user_id,
    } = row;

    let id = OrderId::new(&order_id)
        .map_err(|err| OrderRepositoryError::query(format!("stored order id: {err}")))?;
    let header = OrderHeader::try_from(OrderDraft {
        customer_id,
        order_date,
        total_amount,
        shipping_address,
    })
    .map_err(|err| OrderRepositoryError::query(format!("stored order {id}: {err}")))?;
    Ok(Order::new(id, header, user_id.map(UserId::new)))
}

fn row_to_line(row: OrderLineRow) -> Result<OrderLine, OrderRepositoryError> {
    let id = OrderLineId::new(row.order_detail_id);
    let details = OrderLineDetails::try_from(OrderLineDraft {
        order_id: row.order_id,
        product_id: row.product_id,
        quantity: row.quantity,
        unit_price: row.unit_price,
    })
    .map_err(|err| OrderRepositoryError::query(format!("stored order line {id}: {err}")))?;
    Ok(OrderLine::new(id, details))
}

fn missing_customer(id: &str) -> OrderRepositoryError {
    OrderRepositoryError::not_found("customer_not_found", format!("customer {id} not found"))
}

/// Lock customer rows in key order; a missing customer is `NotFound`.
async fn lock_customers(
    conn: &mut AsyncPgConnection,
    ids: &BTreeSet<&str>,
) -> Result<(), OrderRepositoryError> {
    for id in ids {
        let locked = customers::table
            .find(*id)
            .select(customers::customer_id)
            .for_update()
            .first::<String>(conn)
            .await
            .optional()?;
        if locked.is_none() {
            return Err(missing_customer(id));
        }
    }
    Ok(())
}

/// Set `last_purchase_date` to the latest remaining order date (or NULL).
async fn refresh_last_purchase(
    conn: &mut AsyncPgConnection,
    customer_id: &str,
) -> Result<Option<NaiveDate>, OrderRepositoryError> {
    let latest: Option<NaiveDate> = orders::table
        .filter(orders::customer_id.eq(customer_id))
        .select(diesel::dsl::max(orders::order_date))
        .get_result(conn)
        .await?;
    diesel::update(customers::table.find(customer_id))
        .set(customers::last_purchase_date.eq(latest))
        .execute(conn)
        .await?;
    debug!(customer_id, ?latest, "last purchase date recomputed");
    Ok(latest)
}

async fn refresh_all(
    conn: &mut AsyncPgConnection,
    ids: &BTreeSet<&str>,
) -> Result<(), OrderRepositoryError> {
    for id in ids {
        refresh_last_purchase(conn, id).await?;
    }
    Ok(())
}

/// Lock an order row and return its current customer.
async fn lock_order(
    conn: &mut AsyncPgConnection,
    id: &OrderId,
) -> Result<Option<String>, OrderRepositoryError> {
    orders::table
        .find(id.as_str())
        .select(orders::customer_id)
        .for_update()
        .first::<Option<String>>(conn)
        .await
        .optional()?
        .ok_or_else(|| OrderRepositoryError::missing_order(id))
}

async fn ensure_line_references(
    conn: &mut AsyncPgConnection,
    order_id: &OrderId,
    product_id: &ProductId,
) -> Result<(), OrderRepositoryError> {
    let order = orders::table
        .find(order_id.as_str())
        .select(orders::order_id)
        .for_share()
        .first::<String>(conn)
        .await
        .optional()?;
    if order.is_none() {
        return Err(OrderRepositoryError::missing_order(order_id));
    }
    let product = products::table
        .find(product_id.as_str())
        .select(products::product_id)
        .for_share()
        .first::<String>(conn)
        .await
        .optional()?;
    if product.is_none() {
        return Err(OrderRepositoryError::not_found(
            "product_not_found",
            format!("product {product_id} not found"),
        ));
    }
    Ok(())
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn list(
        &self,
        filter: &OrderFilter,
        page: &PageRequest<String>,
    ) -> Result<Page<Order, String>, OrderRepositoryError> {
        let mut conn = self.pool.get().await?;

        let mut query = orders::table
            .select(OrderRow::as_select())
            .order(orders::order_id.asc())
            .limit(page.fetch_limit())
            .into_boxed();
        if let Some(customer_id) = filter.customer_id.as_ref() {
            query = query.filter(orders::customer_id.eq(customer_id.as_str()));
        }
        if let Some(after) = page.after() {
            query = query.filter(orders::order_id.gt(after.as_str()));
        }

        let rows: Vec<OrderRow> = query.load(&mut conn).await?;
        let orders = rows
            .into_iter()
            .map(row_to_order)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(orders, page.limit(), |order| {
            order.id().as_str().to_owned()
        }))
    }

    async fn find(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await?;

        orders::table
            .find(id.as_str())
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .await
            .optional()?
            .map(row_to_order)
            .transpose()
    }

    async fn create(
        &self,
        id: &OrderId,
        header: &OrderHeader,
        recorded_by: UserId,
    ) -> Result<Order, OrderRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, OrderRepositoryError, _>(|conn| {
                async move {
                    let affected: BTreeSet<&str> =
                        header.customer_id().map(CustomerId::as_str).into_iter().collect();
                    lock_customers(conn, &affected).await?;

                    let row = diesel::insert_into(orders::table)
                        .values(&NewOrderRow::new(id.as_str(), header, recorded_by.get()))
                        .on_conflict(orders::order_id)
                        .do_nothing()
                        .returning(OrderRow::as_returning())
                        .get_result::<OrderRow>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| {
                            OrderRepositoryError::conflict(
                                "order_exists",
                                format!("order {id} already exists"),
                            )
                        })?;

                    refresh_all(conn, &affected).await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        row_to_order(row)
    }

    async fn update(
        &self,
        id: &OrderId,
        header: &OrderHeader,
    ) -> Result<Order, OrderRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, OrderRepositoryError, _>(|conn| {
                async move {
                    let previous = lock_order(conn, id).await?;
                    let mut affected: BTreeSet<&str> =
                        header.customer_id().map(CustomerId::as_str).into_iter().collect();
                    affected.extend(previous.as_deref());
                    lock_customers(conn, &affected).await?;

                    let row = diesel::update(orders::table.find(id.as_str()))
                        .set(&OrderUpdate::from(header))
                        .returning(OrderRow::as_returning())
                        .get_result::<OrderRow>(conn)
                        .await?;

                    refresh_all(conn, &affected).await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        row_to_order(row)
    }

    async fn delete(&self, id: &OrderId) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, OrderRepositoryError, _>(|conn| {
            async move {
                let customer = lock_order(conn, id).await?;
                let affected: BTreeSet<&str> = customer.as_deref().into_iter().collect();
                lock_customers(conn, &affected).await?;

                diesel::delete(transactions::table.filter(transactions::order_id.eq(id.as_str())))
                    .execute(conn)
                    .await?;
                diesel::delete(order_details::table.filter(order_details::order_id.eq(id.as_str())))
                    .execute(conn)
                    .await?;
                diesel::delete(orders::table.find(id.as_str()))
                    .execute(conn)
                    .await?;

                refresh_all(conn, &affected).await
            }
            .scope_boxed()
        })
        .await?;

        Ok(())
    }

    async fn list_lines(
        &self,
        filter: &OrderLineFilter,
        page: &PageRequest<i32>,
    ) -> Result<Page<OrderLine, i32>, OrderRepositoryError> {
        let mut conn = self.pool.get().await?;

        let mut query = order_details::table
            .select(OrderLineRow::as_select())
            .order(order_details::order_detail_id.asc())
            .limit(page.fetch_limit())
            .into_boxed();
        if let Some(order_id) = filter.order_id.as_ref() {
            query = query.filter(order_details::order_id.eq(order_id.as_str()));
        }
        if let Some(after) = page.after() {
            query = query.filter(order_details::order_detail_id.gt(*after));
        }

        let rows: Vec<OrderLineRow> = query.load(&mut conn).await?;
        let lines = rows
            .into_iter()
            .map(row_to_line)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(lines, page.limit(), |line| {
            line.id().get()
        }))
    }

    async fn find_line(&self, id: OrderLineId) -> Result<Option<OrderLine>, OrderRepositoryError> {
        let mut conn = self.pool.get().await?;

        order_details::table
            .find(id.get())
            .select(OrderLineRow::as_select())
            .first::<OrderLineRow>(&mut conn)
            .await
            .optional()?
            .map(row_to_line)
            .transpose()
    }

    async fn create_line(
        &self,
        details: &OrderLineDetails,
    ) -> Result<OrderLine, OrderRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, OrderRepositoryError, _>(|conn| {
                async move {
                    ensure_line_references(conn, details.order_id(), details.product_id()).await?;
                    let row = diesel::insert_into(order_details::table)
                        .values(&OrderLineValues::from(details))
                        .returning(OrderLineRow::as_returning())
                        .get_result::<OrderLineRow>(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        row_to_line(row)
    }

    async fn update_line(
        &self,
        id: OrderLineId,
        details: &OrderLineDetails,
    ) -> Result<OrderLine, OrderRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, OrderRepositoryError, _>(|conn| {
                async move {
                    ensure_line_references(conn, details.order_id(), details.product_id()).await?;
                    diesel::update(order_details::table.find(id.get()))
                        .set(&OrderLineValues::from(details))
                        .returning(OrderLineRow::as_returning())
                        .get_result::<OrderLineRow>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| OrderRepositoryError::missing_line(id))
                }
                .scope_boxed()
            })
            .await?;

        row_to_line(row)
    }

    async fn delete_line(&self, id: OrderLineId) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await?;

        let removed = diesel::delete(order_details::table.find(id.get()))
            .execute(&mut conn)
            .await?;
        if removed == 0 {
            return Err(OrderRepositoryError::missing_line(id));
        }
        Ok(())
    }
}
