//! PostgreSQL-backed `PaymentRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::ports::{
    PaymentMethodFilter, PaymentRepository, PaymentRepositoryError, TransactionFilter,
};
use crate::domain::{
    CustomerId, OrderId, PaymentMethod, PaymentMethodDetails, PaymentMethodDraft, PaymentMethodId,
    Transaction, TransactionDetails, TransactionDraft, TransactionId,
};

use super::diesel_basic_error_mapping::impl_diesel_error_conversion;
use super::models::{PaymentMethodRow, PaymentMethodValues, TransactionRow, TransactionValues};
use super::pool::DbPool;
use super::schema::{customers, orders, payment_methods, transactions};

impl_diesel_error_conversion!(PaymentRepositoryError);

/// Diesel-backed implementation of the payment repository port.
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_method(row: PaymentMethodRow) -> Result<PaymentMethod, PaymentRepositoryError> {
    let id = PaymentMethodId::new(row.payment_method_id);
    let details = PaymentMethodDetails::try_from(PaymentMethodDraft {
        customer_id: row.customer_id,
        method_type: row.method_type,
        provider: row.provider,
        expiry_date: row.expiry_date,
    })
    .map_err(|err| PaymentRepositoryError::query(format!("stored payment method {id}: {err}")))?;
    Ok(PaymentMethod::new(id, details))
}

fn row_to_transaction(row: TransactionRow) -> Result<Transaction, PaymentRepositoryError> {
    let id = TransactionId::new(row.transaction_id);
    let details = TransactionDetails::try_from(TransactionDraft {
        order_id: row.order_id,
        payment_method_id: row.payment_method_id,
        payment_status: row.payment_status,
        payment_date: row.payment_date,
        amount: row.amount,
    })
    .map_err(|err| PaymentRepositoryError::query(format!("stored transaction {id}: {err}")))?;
    Ok(Transaction::new(id, details))
}

async fn ensure_customer(
    conn: &mut AsyncPgConnection,
    customer_id: &CustomerId,
) -> Result<(), PaymentRepositoryError> {
    let found = customers::table
        .find(customer_id.as_str())
        .select(customers::customer_id)
        .for_share()
        .first::<String>(conn)
        .await
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(PaymentRepositoryError::not_found(
            "customer_not_found",
            format!("customer {customer_id} not found"),
        )),
    }
}

async fn ensure_transaction_references(
    conn: &mut AsyncPgConnection,
    order_id: &OrderId,
    method_id: PaymentMethodId,
) -> Result<(), PaymentRepositoryError> {
    let order = orders::table
        .find(order_id.as_str())
        .select(orders::order_id)
        .for_share()
        .first::<String>(conn)
        .await
        .optional()?;
    if order.is_none() {
        return Err(PaymentRepositoryError::not_found(
            "order_not_found",
            format!("order {order_id} not found"),
        ));
    }
    let method = payment_methods::table
        .find(method_id.get())
        .select(payment_methods::payment_method_id)
        .for_share()
        .first::<i32>(conn)
        .await
        .optional()?;
    if method.is_none() {
        return Err(PaymentRepositoryError::missing_method(method_id));
    }
    Ok(())
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn list_methods(
        &self,
        filter: &PaymentMethodFilter,
        page: &PageRequest<i32>,
    ) -> Result<Page<PaymentMethod, i32>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await?;

        let mut query = payment_methods::table
            .select(PaymentMethodRow::as_select())
            .order(payment_methods::payment_method_id.asc())
            .limit(page.fetch_limit())
            .into_boxed();
        if let Some(customer_id) = filter.customer_id.as_ref() {
            query = query.filter(payment_methods::customer_id.eq(customer_id.as_str()));
        }
        if let Some(after) = page.after() {
            query = query.filter(payment_methods::payment_method_id.gt(*after));
        }

        let rows: Vec<PaymentMethodRow> = query.load(&mut conn).await?;
        let methods = rows
            .into_iter()
            .map(row_to_method)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(methods, page.limit(), |method| {
            method.id().get()
        }))
    }

    async fn find_method(
        &self,
        id: PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await?;

        payment_methods::table
            .find(id.get())
            .select(PaymentMethodRow::as_select())
            .first::<PaymentMethodRow>(&mut conn)
            .await
            .optional()?
            .map(row_to_method)
            .transpose()
    }

    async fn create_method(
        &self,
        details: &PaymentMethodDetails,
    ) -> Result<PaymentMethod, PaymentRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, PaymentRepositoryError, _>(|conn| {
                async move {
                    ensure_customer(conn, details.customer_id()).await?;
                    let row = diesel::insert_into(payment_methods::table)
                        .values(&PaymentMethodValues::from(details))
                        .returning(PaymentMethodRow::as_returning())
                        .get_result::<PaymentMethodRow>(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        row_to_method(row)
    }

    async fn update_method(
        &self,
        id: PaymentMethodId,
        details: &PaymentMethodDetails,
    ) -> Result<PaymentMethod, PaymentRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, PaymentRepositoryError, _>(|conn| {
                async move {
                    ensure_customer(conn, details.customer_id()).await?;
                    diesel::update(payment_methods::table.find(id.get()))
                        .set(&PaymentMethodValues::from(details))
                        .returning(PaymentMethodRow::as_returning())
                        .get_result::<PaymentMethodRow>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| PaymentRepositoryError::missing_method(id))
                }
                .scope_boxed()
            })
            .await?;

        row_to_method(row)
    }

    async fn delete_method(&self, id: PaymentMethodId) -> Result<(), PaymentRepositoryError> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, PaymentRepositoryError, _>(|conn| {
            async move {
                let locked = payment_methods::table
                    .find(id.get())
                    .select(payment_methods::payment_method_id)
                    .for_update()
                    .first::<i32>(conn)
                    .await
                    .optional()?;
                if locked.is_none() {
                    return Err(PaymentRepositoryError::missing_method(id));
                }

                let references: i64 = transactions::table
                    .filter(transactions::payment_method_id.eq(id.get()))
                    .count()
                    .get_result(conn)
                    .await?;
                if references > 0 {
                    return Err(PaymentRepositoryError::conflict(
                        "payment_method_in_use",
                        format!("payment method {id} is used by {references} transaction(s)"),
                    ));
                }

                diesel::delete(payment_methods::table.find(id.get()))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        info!(payment_method_id = %id, "payment method deleted");
        Ok(())
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest<i32>,
    ) -> Result<Page<Transaction, i32>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await?;

        let mut query = transactions::table
            .select(TransactionRow::as_select())
            .order(transactions::transaction_id.asc())
            .limit(page.fetch_limit())
            .into_boxed();
        if let Some(order_id) = filter.order_id.as_ref() {
            query = query.filter(transactions::order_id.eq(order_id.as_str()));
        }
        if let Some(after) = page.after() {
            query = query.filter(transactions::transaction_id.gt(*after));
        }

        let rows: Vec<TransactionRow> = query.load(&mut conn).await?;
        let payments = rows
            .into_iter()
            .map(row_to_transaction)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_overfetch(payments, page.limit(), |payment| {
            payment.id().get()
        }))
    }

    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, PaymentRepositoryError> {
        let mut conn = self.pool.get().await?;

        transactions::table
            .find(id.get())
            .select(TransactionRow::as_select())
            .first::<TransactionRow>(&mut conn)
            .await
            .optional()?
            .map(row_to_transaction)
            .transpose()
    }

    async fn create_transaction(
        &self,
        details: &TransactionDetails,
    ) -> Result<Transaction, PaymentRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, PaymentRepositoryError, _>(|conn| {
                async move {
                    ensure_transaction_references(
                        conn,
                        details.order_id(),
                        details.payment_method_id(),
                    )
                    .await?;
                    let row = diesel::insert_into(transactions::table)
                        .values(&TransactionValues::from(details))
                        .returning(TransactionRow::as_returning())
                        .get_result::<TransactionRow>(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;

        row_to_transaction(row)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        details: &TransactionDetails,
    ) -> Result<Transaction, PaymentRepositoryError> {
        let mut conn = self.pool.get().await?;

        let row = conn
            .transaction::<_, PaymentRepositoryError, _>(|conn| {
                async move {
                    ensure_transaction_references(
                        conn,
                        details.order_id(),
                        details.payment_method_id(),
                    )
                    .await?;
                    diesel::update(transactions::table.find(id.get()))
                        .set(&TransactionValues::from(details))
                        .returning(TransactionRow::as_returning())
                        .get_result::<TransactionRow>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| PaymentRepositoryError::missing_transaction(id))
                }
                .scope_boxed()
            })
            .await?;

        row_to_transaction(row)
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<(), PaymentRepositoryError> {
        let mut conn = self.pool.get().await?;

        let removed = diesel::delete(transactions::table.find(id.get()))
            .execute(&mut conn)
            .await?;
        if removed == 0 {
            return Err(PaymentRepositoryError::missing_transaction(id));
        }
        Ok(())
    }
}
