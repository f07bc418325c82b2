//! Sales dashboard: reporting window, raw aggregates and derived metrics.
//!
//! The persistence adapter computes counts and sums in SQL and returns them
//! as [`DashboardAggregates`]. Everything that is a ratio of those figures
//! (retention, lifetime value, turnover, co-purchase lift, ...) is derived
//! here by [`DashboardSummary::from_aggregates`] so the arithmetic, including
//! the zero-denominator cases, stays unit-testable without a database.

use chrono::{Datelike, Months, NaiveDate};

use super::validation::FieldError;

/// Months covered by the sales series when none is requested.
pub const DEFAULT_MONTHS: u32 = 12;
/// Longest sales series a client may request.
pub const MAX_MONTHS: u32 = 36;
/// Length of ranked lists when none is requested.
pub const DEFAULT_TOP: u32 = 5;
/// Longest ranked list a client may request.
pub const MAX_TOP: u32 = 50;
/// Stock level below which an item counts as low stock by default.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// Label reported for products without a category.
pub const UNCATEGORISED: &str = "uncategorised";

/// Raw dashboard parameters as supplied by a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardRequest {
    pub as_of: Option<NaiveDate>,
    pub months: Option<u32>,
    pub top: Option<u32>,
    pub low_stock_threshold: Option<i32>,
}

/// Validated reporting window with precomputed month boundaries.
///
/// The *current month* is the calendar month containing `as_of`. The sales
/// series spans `months` calendar months ending with the current month.
/// All ranges are half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardWindow {
    as_of: NaiveDate,
    months: u32,
    top: u32,
    low_stock_threshold: i32,
    window_start: NaiveDate,
    previous_month_start: NaiveDate,
    current_month_start: NaiveDate,
    next_month_start: NaiveDate,
}

impl DashboardWindow {
    /// Validate a request, defaulting `as_of` to `today`.
    ///
    /// # Examples
    /// ```
    /// use backoffice::domain::{DashboardRequest, DashboardWindow};
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2026, 3, 18).expect("valid date");
    /// let window = DashboardWindow::new(DashboardRequest::default(), today).expect("valid");
    /// assert_eq!(window.current_month_start(), NaiveDate::from_ymd_opt(2026, 3, 1).expect("date"));
    /// assert_eq!(window.window_start(), NaiveDate::from_ymd_opt(2025, 4, 1).expect("date"));
    /// ```
    pub fn new(request: DashboardRequest, today: NaiveDate) -> Result<Self, FieldError> {
        let as_of = request.as_of.unwrap_or(today);
        let months = request.months.unwrap_or(DEFAULT_MONTHS);
        if !(1..=MAX_MONTHS).contains(&months) {
            return Err(FieldError::new(
                "months",
                "out_of_range",
                format!("months must be between 1 and {MAX_MONTHS}"),
            ));
        }
        let top = request.top.unwrap_or(DEFAULT_TOP);
        if !(1..=MAX_TOP).contains(&top) {
            return Err(FieldError::new(
                "top",
                "out_of_range",
                format!("top must be between 1 and {MAX_TOP}"),
            ));
        }
        let low_stock_threshold = request
            .low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        if low_stock_threshold < 0 {
            return Err(FieldError::new(
                "lowStockThreshold",
                "out_of_range",
                "lowStockThreshold must not be negative",
            ));
        }

        let out_of_range =
            || FieldError::new("asOf", "out_of_range", "asOf is outside the supported range");
        let current_month_start = as_of.with_day(1).ok_or_else(out_of_range)?;
        let previous_month_start = current_month_start
            .checked_sub_months(Months::new(1))
            .ok_or_else(out_of_range)?;
        let next_month_start = current_month_start
            .checked_add_months(Months::new(1))
            .ok_or_else(out_of_range)?;
        let window_start = current_month_start
            .checked_sub_months(Months::new(months - 1))
            .ok_or_else(out_of_range)?;

        Ok(Self {
            as_of,
            months,
            top,
            low_stock_threshold,
            window_start,
            previous_month_start,
            current_month_start,
            next_month_start,
        })
    }

    /// Reference date.
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Length of the sales series in months.
    pub fn months(&self) -> u32 {
        self.months
    }

    /// Length of ranked lists.
    pub fn top(&self) -> u32 {
        self.top
    }

    /// Low-stock cut-off (exclusive).
    pub fn low_stock_threshold(&self) -> i32 {
        self.low_stock_threshold
    }

    /// First day of the sales series.
    pub fn window_start(&self) -> NaiveDate {
        self.window_start
    }

    /// First day of the month before the current month.
    pub fn previous_month_start(&self) -> NaiveDate {
        self.previous_month_start
    }

    /// First day of the current month.
    pub fn current_month_start(&self) -> NaiveDate {
        self.current_month_start
    }

    /// First day after the current month; exclusive end of every range.
    pub fn next_month_start(&self) -> NaiveDate {
        self.next_month_start
    }

    /// First day of every month in the series, oldest first.
    pub fn month_starts(&self) -> Vec<NaiveDate> {
        (0..self.months)
            .filter_map(|offset| self.window_start.checked_add_months(Months::new(offset)))
            .collect()
    }
}

/// Whole-history counts and revenue.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SalesTotals {
    pub order_count: i64,
    pub customer_count: i64,
    pub product_count: i64,
    pub revenue: f64,
}

/// Revenue and order count for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlySales {
    pub month: NaiveDate,
    pub revenue: f64,
    pub order_count: i64,
}

/// Line-item sales of one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub product_id: String,
    pub product_name: Option<String>,
    pub units_sold: i64,
    pub revenue: f64,
}

/// Line-item sales of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySales {
    pub category: String,
    pub units_sold: i64,
    pub revenue: f64,
}

/// Spend of one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSpend {
    pub customer_id: String,
    pub name: Option<String>,
    pub order_count: i64,
    pub total_spent: f64,
}

/// Orders and revenue from one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySales {
    pub country: String,
    pub order_count: i64,
    pub revenue: f64,
}

/// Raw co-purchase counts for a product pair (`first < second`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoPurchaseCount {
    pub first_product_id: String,
    pub second_product_id: String,
    pub pair_orders: i64,
    pub first_product_orders: i64,
    pub second_product_orders: i64,
}

/// Inventory record below the low-stock threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowStockItem {
    pub product_id: String,
    pub product_name: Option<String>,
    pub stock_quantity: i64,
}

/// Transactions grouped by payment status.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentStatusTotal {
    pub status: String,
    pub transaction_count: i64,
    pub amount: f64,
}

/// Figures computed by the persistence adapter from one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardAggregates {
    pub totals: SalesTotals,
    pub current_month_revenue: f64,
    pub previous_month_revenue: f64,
    /// Customers with at least one order.
    pub ordering_customers: i64,
    /// Customers with at least two orders.
    pub repeat_customers: i64,
    /// Customers ordering in the previous month.
    pub previous_month_customers: i64,
    /// Previous-month customers who also ordered in the current month.
    pub retained_customers: i64,
    /// Units on order lines of orders dated inside the sales window.
    pub units_sold_in_window: i64,
    pub stock_on_hand: i64,
    /// Sparse monthly series; months without orders may be missing.
    pub monthly_sales: Vec<MonthlySales>,
    pub top_products: Vec<ProductSales>,
    pub category_sales: Vec<CategorySales>,
    pub top_customers: Vec<CustomerSpend>,
    pub country_sales: Vec<CountrySales>,
    pub co_purchases: Vec<CoPurchaseCount>,
    pub low_stock: Vec<LowStockItem>,
    pub payment_statuses: Vec<PaymentStatusTotal>,
}

/// Month-over-month customer retention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retention {
    pub previous_month_customers: i64,
    pub retained_customers: i64,
    pub retention_rate: Option<f64>,
    pub churn_rate: Option<f64>,
}

/// Monthly recurring revenue and its growth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecurringRevenue {
    pub current_month: f64,
    pub previous_month: f64,
    pub growth_rate: Option<f64>,
}

/// Units sold against stock on hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventoryTurnover {
    pub units_sold: i64,
    pub stock_on_hand: i64,
    pub turnover: Option<f64>,
}

/// Association-rule figures for a product pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CoPurchaseAffinity {
    pub first_product_id: String,
    pub second_product_id: String,
    pub pair_orders: i64,
    /// Share of all orders containing both products.
    pub support: Option<f64>,
    /// Share of orders with the first product that also contain the second.
    pub confidence: Option<f64>,
    /// How much more often the pair occurs than if purchases were independent.
    pub lift: Option<f64>,
}

/// Complete dashboard returned to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub as_of: NaiveDate,
    pub window_start: NaiveDate,
    pub totals: SalesTotals,
    pub average_order_value: Option<f64>,
    pub repeat_purchase_rate: Option<f64>,
    pub customer_lifetime_value: Option<f64>,
    pub retention: Retention,
    pub recurring_revenue: RecurringRevenue,
    pub inventory_turnover: InventoryTurnover,
    /// Dense monthly series: one entry per month of the window.
    pub monthly_sales: Vec<MonthlySales>,
    pub top_products: Vec<ProductSales>,
    pub category_sales: Vec<CategorySales>,
    pub top_customers: Vec<CustomerSpend>,
    pub country_sales: Vec<CountrySales>,
    pub co_purchases: Vec<CoPurchaseAffinity>,
    pub low_stock: Vec<LowStockItem>,
    pub payment_statuses: Vec<PaymentStatusTotal>,
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

fn count_ratio(numerator: i64, denominator: i64) -> Option<f64> {
    ratio(numerator as f64, denominator as f64)
}

fn affinity(pair: CoPurchaseCount, order_count: i64) -> CoPurchaseAffinity {
    let expected = pair.first_product_orders as f64 * pair.second_product_orders as f64;
    CoPurchaseAffinity {
        support: count_ratio(pair.pair_orders, order_count),
        confidence: count_ratio(pair.pair_orders, pair.first_product_orders),
        lift: ratio(pair.pair_orders as f64 * order_count as f64, expected),
        first_product_id: pair.first_product_id,
        second_product_id: pair.second_product_id,
        pair_orders: pair.pair_orders,
    }
}

fn densify(window: &DashboardWindow, sparse: &[MonthlySales]) -> Vec<MonthlySales> {
    window
        .month_starts()
        .into_iter()
        .map(|month| {
            sparse
                .iter()
                .find(|entry| entry.month == month)
                .copied()
                .unwrap_or(MonthlySales {
                    month,
                    revenue: 0.0,
                    order_count: 0,
                })
        })
        .collect()
}

impl DashboardSummary {
    /// Derive every dashboard metric from raw aggregates.
    ///
    /// Ratios whose denominator is zero are reported as absent rather than
    /// as zero or infinity.
    pub fn from_aggregates(window: &DashboardWindow, aggregates: DashboardAggregates) -> Self {
        let DashboardAggregates {
            totals,
            current_month_revenue,
            previous_month_revenue,
            ordering_customers,
            repeat_customers,
            previous_month_customers,
            retained_customers,
            units_sold_in_window,
            stock_on_hand,
            monthly_sales,
            top_products,
            category_sales,
            top_customers,
            country_sales,
            co_purchases,
            low_stock,
            payment_statuses,
        } = aggregates;

        let retention_rate = count_ratio(retained_customers, previous_month_customers);

        Self {
            as_of: window.as_of(),
            window_start: window.window_start(),
            totals,
            average_order_value: ratio(totals.revenue, totals.order_count as f64),
            repeat_purchase_rate: count_ratio(repeat_customers, ordering_customers),
            customer_lifetime_value: ratio(totals.revenue, ordering_customers as f64),
            retention: Retention {
                previous_month_customers,
                retained_customers,
                retention_rate,
                churn_rate: retention_rate.map(|rate| 1.0 - rate),
            },
            recurring_revenue: RecurringRevenue {
                current_month: current_month_revenue,
                previous_month: previous_month_revenue,
                growth_rate: ratio(
                    current_month_revenue - previous_month_revenue,
                    previous_month_revenue,
                ),
            },
            inventory_turnover: InventoryTurnover {
                units_sold: units_sold_in_window,
                stock_on_hand,
                turnover: count_ratio(units_sold_in_window, stock_on_hand),
            },
            monthly_sales: densify(window, &monthly_sales),
            top_products,
            category_sales,
            top_customers,
            country_sales,
            co_purchases: co_purchases
                .into_iter()
                .map(|pair| affinity(pair, totals.order_count))
                .collect(),
            low_stock,
            payment_statuses,
        }
    }
}
