//! PostgreSQL-backed `DashboardRepository` implementation.
//!
//! Every aggregate is a raw SQL statement run inside a single read-only,
//! repeatable-read transaction, so all figures share one snapshot. Sums are
//! coalesced to zero and cast so they decode as `float8` or `int8`.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::QueryableByName;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Date, Double, Integer, Nullable, Text};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::dashboard::UNCATEGORISED;
use crate::domain::ports::{DashboardRepository, DashboardRepositoryError};
use crate::domain::{
    CategorySales, CoPurchaseCount, CountrySales, CustomerSpend, DashboardAggregates,
    DashboardWindow, LowStockItem, MonthlySales, PaymentStatusTotal, ProductSales, SalesTotals,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};

impl From<PoolError> for DashboardRepositoryError {
    fn from(error: PoolError) -> Self {
        map_basic_pool_error(error, DashboardRepositoryError::connection)
    }
}

impl From<diesel::result::Error> for DashboardRepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        map_basic_diesel_error(
            error,
            DashboardRepositoryError::query,
            DashboardRepositoryError::connection,
        )
    }
}

/// Diesel-backed implementation of the dashboard repository port.
#[derive(Clone)]
pub struct DieselDashboardRepository {
    pool: DbPool,
}

impl DieselDashboardRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const TOTALS_SQL: &str = r#"
SELECT
    (SELECT COUNT(*) FROM orders) AS order_count,
    (SELECT COUNT(*) FROM customers) AS customer_count,
    (SELECT COUNT(*) FROM products) AS product_count,
    (SELECT COALESCE(SUM(total_amount), 0)::float8 FROM orders) AS revenue
"#;

// $1 previous month start, $2 current month start, $3 next month start.
const PERIOD_SQL: &str = r#"
WITH per_customer AS (
    SELECT
        customer_id,
        COUNT(*) AS order_count,
        COALESCE(BOOL_OR(order_date >= $1 AND order_date < $2), FALSE) AS in_previous,
        COALESCE(BOOL_OR(order_date >= $2 AND order_date < $3), FALSE) AS in_current
    FROM orders
    WHERE customer_id IS NOT NULL
    GROUP BY customer_id
)
SELECT
    (SELECT COALESCE(SUM(total_amount), 0)::float8 FROM orders
        WHERE order_date >= $2 AND order_date < $3) AS current_month_revenue,
    (SELECT COALESCE(SUM(total_amount), 0)::float8 FROM orders
        WHERE order_date >= $1 AND order_date < $2) AS previous_month_revenue,
    (SELECT COUNT(*) FROM per_customer) AS ordering_customers,
    (SELECT COUNT(*) FROM per_customer WHERE order_count >= 2) AS repeat_customers,
    (SELECT COUNT(*) FROM per_customer WHERE in_previous) AS previous_month_customers,
    (SELECT COUNT(*) FROM per_customer WHERE in_previous AND in_current) AS retained_customers
"#;

// $1 window start, $2 next month start.
const STOCK_SQL: &str = r#"
SELECT
    (SELECT COALESCE(SUM(d.quantity), 0)::int8
        FROM order_details d
        JOIN orders o ON o.order_id = d.order_id
        WHERE o.order_date >= $1 AND o.order_date < $2) AS units_sold_in_window,
    (SELECT COALESCE(SUM(stock_quantity), 0)::int8 FROM inventory) AS stock_on_hand
"#;

const MONTHLY_SQL: &str = r#"
SELECT
    date_trunc('month', order_date)::date AS month,
    COALESCE(SUM(total_amount), 0)::float8 AS revenue,
    COUNT(*) AS order_count
FROM orders
WHERE order_date >= $1 AND order_date < $2
GROUP BY 1
ORDER BY 1
"#;

const TOP_PRODUCTS_SQL: &str = r#"
SELECT
    d.product_id,
    p.product_name,
    COALESCE(SUM(d.quantity), 0)::int8 AS units_sold,
    COALESCE(SUM(d.quantity * COALESCE(d.unit_price, 0)), 0)::float8 AS revenue
FROM order_details d
LEFT JOIN products p ON p.product_id = d.product_id
GROUP BY d.product_id, p.product_name
ORDER BY revenue DESC, d.product_id
LIMIT $1
"#;

const CATEGORY_SQL: &str = r#"
SELECT
    COALESCE(p.category, $1) AS category,
    COALESCE(SUM(d.quantity), 0)::int8 AS units_sold,
    COALESCE(SUM(d.quantity * COALESCE(d.unit_price, 0)), 0)::float8 AS revenue
FROM order_details d
LEFT JOIN products p ON p.product_id = d.product_id
GROUP BY 1
ORDER BY revenue DESC, 1
"#;

const TOP_CUSTOMERS_SQL: &str = r#"
SELECT
    o.customer_id,
    c.name,
    COUNT(*) AS order_count,
    COALESCE(SUM(o.total_amount), 0)::float8 AS total_spent
FROM orders o
JOIN customers c ON c.customer_id = o.customer_id
GROUP BY o.customer_id, c.name
ORDER BY total_spent DESC, o.customer_id
LIMIT $1
"#;

const COUNTRY_SQL: &str = r#"
SELECT
    c.country,
    COUNT(*) AS order_count,
    COALESCE(SUM(o.total_amount), 0)::float8 AS revenue
FROM orders o
JOIN customers c ON c.customer_id = o.customer_id
WHERE c.country IS NOT NULL
GROUP BY c.country
ORDER BY revenue DESC, c.country
"#;

const CO_PURCHASE_SQL: &str = r#"
WITH order_products AS (
    SELECT DISTINCT order_id, product_id FROM order_details
),
product_orders AS (
    SELECT product_id, COUNT(*) AS order_count
    FROM order_products
    GROUP BY product_id
)
SELECT
    a.product_id AS first_product_id,
    b.product_id AS second_product_id,
    COUNT(*) AS pair_orders,
    MIN(fa.order_count) AS first_product_orders,
    MIN(fb.order_count) AS second_product_orders
FROM order_products a
JOIN order_products b ON a.order_id = b.order_id AND a.product_id < b.product_id
JOIN product_orders fa ON fa.product_id = a.product_id
JOIN product_orders fb ON fb.product_id = b.product_id
GROUP BY a.product_id, b.product_id
ORDER BY pair_orders DESC, a.product_id, b.product_id
LIMIT $1
"#;

const LOW_STOCK_SQL: &str = r#"
SELECT
    i.product_id,
    p.product_name,
    COALESCE(i.stock_quantity, 0)::int8 AS stock_quantity
FROM inventory i
LEFT JOIN products p ON p.product_id = i.product_id
WHERE COALESCE(i.stock_quantity, 0) < $1
ORDER BY stock_quantity, i.product_id
"#;

const PAYMENT_STATUS_SQL: &str = r#"
SELECT
    COALESCE(payment_status, 'unknown') AS status,
    COUNT(*) AS transaction_count,
    COALESCE(SUM(amount), 0)::float8 AS amount
FROM transactions
GROUP BY 1
ORDER BY 1
"#;

#[derive(QueryableByName)]
struct TotalsRow {
    #[diesel(sql_type = BigInt)]
    order_count: i64,
    #[diesel(sql_type = BigInt)]
    customer_count: i64,
    #[diesel(sql_type = BigInt)]
    product_count: i64,
    #[diesel(sql_type = Double)]
    revenue: f64,
}

#[derive(QueryableByName)]
struct PeriodRow {
    #[diesel(sql_type = Double)]
    current_month_revenue: f64,
    #[diesel(sql_type = Double)]
    previous_month_revenue: f64,
    #[diesel(sql_type = BigInt)]
    ordering_customers: i64,
    #[diesel(sql_type = BigInt)]
    repeat_customers: i64,
    #[diesel(sql_type = BigInt)]
    previous_month_customers: i64,
    #[diesel(sql_type = BigInt)]
    retained_customers: i64,
}

#[derive(QueryableByName)]
struct StockRow {
    #[diesel(sql_type = BigInt)]
    units_sold_in_window: i64,
    #[diesel(sql_type = BigInt)]
    stock_on_hand: i64,
}

#[derive(QueryableByName)]
struct MonthlyRow {
    #[diesel(sql_type = Date)]
    month: NaiveDate,
    #[diesel(sql_type = Double)]
    revenue: f64,
    #[diesel(sql_type = BigInt)]
    order_count: i64,
}

#[derive(QueryableByName)]
struct ProductSalesRow {
    #[diesel(sql_type = Text)]
    product_id: String,
    #[diesel(sql_type = Nullable<Text>)]
    product_name: Option<String>,
    #[diesel(sql_type = BigInt)]
    units_sold: i64,
    #[diesel(sql_type = Double)]
    revenue: f64,
}

#[derive(QueryableByName)]
struct CategoryRow {
    #[diesel(sql_type = Text)]
    category: String,
    #[diesel(sql_type = BigInt)]
    units_sold: i64,
    #[diesel(sql_type = Double)]
    revenue: f64,
}

#[derive(QueryableByName)]
struct CustomerSpendRow {
    #[diesel(sql_type = Text)]
    customer_id: String,
    #[diesel(sql_type = Nullable<Text>)]
    name: Option<String>,
    #[diesel(sql_type = BigInt)]
    order_count: i64,
    #[diesel(sql_type = Double)]
    total_spent: f64,
}

#[derive(QueryableByName)]
struct CountryRow {
    #[diesel(sql_type = Text)]
    country: String,
    #[diesel(sql_type = BigInt)]
    order_count: i64,
    #[diesel(sql_type = Double)]
    revenue: f64,
}

#[derive(QueryableByName)]
struct CoPurchaseRow {
    #[diesel(sql_type = Text)]
    first_product_id: String,
    #[diesel(sql_type = Text)]
    second_product_id: String,
    #[diesel(sql_type = BigInt)]
    pair_orders: i64,
    #[diesel(sql_type = BigInt)]
    first_product_orders: i64,
    #[diesel(sql_type = BigInt)]
    second_product_orders: i64,
}

#[derive(QueryableByName)]
struct LowStockRow {
    #[diesel(sql_type = Text)]
    product_id: String,
    #[diesel(sql_type = Nullable<Text>)]
    product_name: Option<String>,
    #[diesel(sql_type = BigInt)]
    stock_quantity: i64,
}

#[derive(QueryableByName)]
struct PaymentStatusRow {
    #[diesel(sql_type = Text)]
    status: String,
    #[diesel(sql_type = BigInt)]
    transaction_count: i64,
    #[diesel(sql_type = Double)]
    amount: f64,
}

/// Ranked lists are capped at `top`; the low-stock list and country sales
/// are complete.
async fn collect(
    conn: &mut AsyncPgConnection,
    window: &DashboardWindow,
) -> Result<DashboardAggregates, DashboardRepositoryError> {
    let top = i64::from(window.top());

    let totals: TotalsRow = sql_query(TOTALS_SQL).get_result(conn).await?;

    let period: PeriodRow = sql_query(PERIOD_SQL)
        .bind::<Date, _>(window.previous_month_start())
        .bind::<Date, _>(window.current_month_start())
        .bind::<Date, _>(window.next_month_start())
        .get_result(conn)
        .await?;

    let stock: StockRow = sql_query(STOCK_SQL)
        .bind::<Date, _>(window.window_start())
        .bind::<Date, _>(window.next_month_start())
        .get_result(conn)
        .await?;

    let monthly: Vec<MonthlyRow> = sql_query(MONTHLY_SQL)
        .bind::<Date, _>(window.window_start())
        .bind::<Date, _>(window.next_month_start())
        .load(conn)
        .await?;

    let top_products: Vec<ProductSalesRow> = sql_query(TOP_PRODUCTS_SQL)
        .bind::<BigInt, _>(top)
        .load(conn)
        .await?;

    let categories: Vec<CategoryRow> = sql_query(CATEGORY_SQL)
        .bind::<Text, _>(UNCATEGORISED)
        .load(conn)
        .await?;

    let top_customers: Vec<CustomerSpendRow> = sql_query(TOP_CUSTOMERS_SQL)
        .bind::<BigInt, _>(top)
        .load(conn)
        .await?;

    let countries: Vec<CountryRow> = sql_query(COUNTRY_SQL).load(conn).await?;

    let pairs: Vec<CoPurchaseRow> = sql_query(CO_PURCHASE_SQL)
        .bind::<BigInt, _>(top)
        .load(conn)
        .await?;

    let low_stock: Vec<LowStockRow> = sql_query(LOW_STOCK_SQL)
        .bind::<Integer, _>(window.low_stock_threshold())
        .load(conn)
        .await?;

    let statuses: Vec<PaymentStatusRow> = sql_query(PAYMENT_STATUS_SQL).load(conn).await?;

    Ok(DashboardAggregates {
        totals: SalesTotals {
            order_count: totals.order_count,
            customer_count: totals.customer_count,
            product_count: totals.product_count,
            revenue: totals.revenue,
        },
        current_month_revenue: period.current_month_revenue,
        previous_month_revenue: period.previous_month_revenue,
        ordering_customers: period.ordering_customers,
        repeat_customers: period.repeat_customers,
        previous_month_customers: period.previous_month_customers,
        retained_customers: period.retained_customers,
        units_sold_in_window: stock.units_sold_in_window,
        stock_on_hand: stock.stock_on_hand,
        monthly_sales: monthly
            .into_iter()
            .map(|row| MonthlySales {
                month: row.month,
                revenue: row.revenue,
                order_count: row.order_count,
            })
            .collect(),
        top_products: top_products
            .into_iter()
            .map(|row| ProductSales {
                product_id: row.product_id,
                product_name: row.product_name,
                units_sold: row.units_sold,
                revenue: row.revenue,
            })
            .collect(),
        category_sales: categories
            .into_iter()
            .map(|row| CategorySales {
                category: row.category,
                units_sold: row.units_sold,
                revenue: row.revenue,
            })
            .collect(),
        top_customers: top_customers
            .into_iter()
            .map(|row| CustomerSpend {
                customer_id: row.customer_id,
                name: row.name,
                order_count: row.order_count,
                total_spent: row.total_spent,
            })
            .collect(),
        country_sales: countries
            .into_iter()
            .map(|row| CountrySales {
                country: row.country,
                order_count: row.order_count,
                revenue: row.revenue,
            })
            .collect(),
        co_purchases: pairs
            .into_iter()
            .map(|row| CoPurchaseCount {
                first_product_id: row.first_product_id,
                second_product_id: row.second_product_id,
                pair_orders: row.pair_orders,
                first_product_orders: row.first_product_orders,
                second_product_orders: row.second_product_orders,
            })
            .collect(),
        low_stock: low_stock
            .into_iter()
            .map(|row| LowStockItem {
                product_id: row.product_id,
                product_name: row.product_name,
                stock_quantity: row.stock_quantity,
            })
            .collect(),
        payment_statuses: statuses
            .into_iter()
            .map(|row| PaymentStatusTotal {
                status: row.status,
                transaction_count: row.transaction_count,
                amount: row.amount,
            })
            .collect(),
    })
}

#[async_trait]
impl DashboardRepository for DieselDashboardRepository {
    async fn aggregates(
        &self,
        window: &DashboardWindow,
    ) -> Result<DashboardAggregates, DashboardRepositoryError> {
        let mut conn = self.pool.get().await?;

        let aggregates = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DashboardRepositoryError, _>(|conn| collect(conn, window).scope_boxed())
            .await?;

        debug!(
            as_of = %window.as_of(),
            months = window.months(),
            orders = aggregates.totals.order_count,
            "dashboard aggregates computed"
        );
        Ok(aggregates)
    }
}
