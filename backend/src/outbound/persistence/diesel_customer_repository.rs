//! PostgreSQL-backed `CustomerRepository` implementation using Diesel ORM.
//!
//! The guarded delete locks the customer row before counting orders. Order
//! inserts lock the same row, so a delete and a concurrent first order for
//! the same customer serialise and the delete never strands an order.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use pagination::{Page, PageRequest};
use tracing::debug;

use crate::domain::ports::{CustomerRepository, CustomerRepositoryError};
use crate::domain::{Customer, CustomerDetails, CustomerDraft, CustomerId};

use super::diesel_basic_error_mapping::impl_diesel_error_conversion;
use super::models::{CustomerRow, CustomerUpdate, NewCustomerRow};
use super::pool::DbPool;
use super::schema::{customers, orders, payment_methods, transactions};

impl_diesel_error_conversion!(CustomerRepositoryError);

/// Diesel-backed implementation of the customer repository port.
#[derive(Clone)]
pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Convert a database row into a validated domain customer.
fn row_to_customer(row: CustomerRow) -> Result<Customer, CustomerRepositoryError> {
    let CustomerRow {
        customer_id,
        name,
        email,
        contact_number,
        address,
        country,
        last_purchase_date,
    } = row;

    let id = CustomerId::new(&customer_id)
        .map_err(|err| CustomerRepositoryError::query(format!("stored customer id: {err}")))?;
    let details = CustomerDetails::try_from(CustomerDraft {
        name,
        email,
        contact_number,
        address,
        country,
    })
    .map_err(|err| CustomerRepositoryError::query(format!("stored customer {id}: {err}")))?;

    Ok(Customer::new(id, details, last_purchase_date))
}

#[async_trait]
impl CustomerRepository for DieselCustomerRepository {
    async fn list(
        &self,
        page: &PageRequest<String>,
    ) -> Result<Page<Customer, String>, CustomerRepositoryError> {
        let mut conn = self.pool.get().await?;

        let mut query = customers::table
            .select(CustomerRow::as_select())
            .order(customers::customer_id.asc())
            .limit(page.fetch_limit())
            .into_boxed();
        if let Some(after) = page.after() {
            query = query.filter(customers::customer_id.gt(after.as_str()));
        }

        let rows: Vec<CustomerRow> = query.load(&mut conn).await?;
        let customers = rows
            .into_iter()
            .map(row_to_customer)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(customers, page.limit(), |customer| {
            customer.id().as_str().to_owned()
        }))
    }

    async fn find(&self, id: &CustomerId) -> Result<Option<Customer>, CustomerRepositoryError> {
        let mut conn = self.pool.get().await?;

        customers::table
            .find(id.as_str())
            .select(CustomerRow::as_select())
            .first::<CustomerRow>(&mut conn)
            .await
            .optional()?
            .map(row_to_customer)
            .transpose()
    }

    async fn create(
        &self,
        id: &CustomerId,
        details: &CustomerDetails,
    ) -> Result<Customer, CustomerRepositoryError> {
        let mut conn = self.pool.get().await?;

        let inserted = diesel::insert_into(customers::table)
            .values(&NewCustomerRow::new(id.as_str(), details))
            .on_conflict(customers::customer_id)
            .do_nothing()
            .returning(CustomerRow::as_returning())
            .get_result::<CustomerRow>(&mut conn)
            .await
            .optional()?;

        match inserted {
            Some(row) => row_to_customer(row),
            None => Err(CustomerRepositoryError::conflict(
                "customer_exists",
                format!("customer {id} already exists"),
            )),
        }
    }

    async fn update(
        &self,
        id: &CustomerId,
        details: &CustomerDetails,
    ) -> Result<Customer, CustomerRepositoryError> {
        let mut conn = self.pool.get().await?;

        diesel::update(customers::table.find(id.as_str()))
            .set(&CustomerUpdate::from(details))
            .returning(CustomerRow::as_returning())
            .get_result::<CustomerRow>(&mut conn)
            .await
            .optional()?
            .map(row_to_customer)
            .transpose()?
            .ok_or_else(|| CustomerRepositoryError::missing(id))
    }

    async fn delete(&self, id: &CustomerId) -> Result<(), CustomerRepositoryError> {
        let mut conn = self.pool.get().await?;

        let removed_methods = conn
            .transaction::<_, CustomerRepositoryError, _>(|conn| {
                async move {
                    let locked = customers::table
                        .find(id.as_str())
                        .select(customers::customer_id)
                        .for_update()
                        .first::<String>(conn)
                        .await
                        .optional()?;
                    if locked.is_none() {
                        return Err(CustomerRepositoryError::missing(id));
                    }

                    let order_count: i64 = orders::table
                        .filter(orders::customer_id.eq(id.as_str()))
                        .count()
                        .get_result(conn)
                        .await?;
                    if order_count > 0 {
                        return Err(CustomerRepositoryError::conflict(
                            "customer_has_orders",
                            format!("customer {id} has {order_count} order(s) and cannot be deleted"),
                        ));
                    }

                    let owned_methods = payment_methods::table
                        .filter(payment_methods::customer_id.eq(id.as_str()))
                        .select(payment_methods::payment_method_id);
                    diesel::delete(
                        transactions::table
                            .filter(transactions::payment_method_id.eq_any(owned_methods)),
                    )
                    .execute(conn)
                    .await?;
                    let removed_methods = diesel::delete(
                        payment_methods::table.filter(payment_methods::customer_id.eq(id.as_str())),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(customers::table.find(id.as_str()))
                        .execute(conn)
                        .await?;
                    Ok(removed_methods)
                }
                .scope_boxed()
            })
            .await?;

        debug!(customer_id = %id, removed_methods, "customer payment methods removed");
        Ok(())
    }
}
