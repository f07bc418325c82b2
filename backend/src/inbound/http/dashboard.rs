//! Sales dashboard endpoint.
//!
//! ```text
//! GET /api/v1/dashboard?asOf=2026-03-18&months=6&top=10&lowStockThreshold=5
//! ```
//!
//! Ratios with a zero denominator are serialised as `null`.

use actix_web::{get, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CategorySales, CoPurchaseAffinity, CountrySales, CustomerSpend, DashboardRequest,
    DashboardSummary, Error, InventoryTurnover, LowStockItem, MonthlySales, PaymentStatusTotal,
    ProductSales, RecurringRevenue, Retention, SalesTotals,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Dashboard query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardQueryParams {
    /// Reference date; defaults to today (UTC).
    #[param(value_type = Option<String>, format = Date)]
    pub as_of: Option<NaiveDate>,
    /// Months in the sales series, 1 to 36 (default 12).
    pub months: Option<u32>,
    /// Length of ranked lists, 1 to 50 (default 5).
    pub top: Option<u32>,
    /// Stock level below which an item is reported (default 10).
    pub low_stock_threshold: Option<i32>,
}

impl From<DashboardQueryParams> for DashboardRequest {
    fn from(value: DashboardQueryParams) -> Self {
        Self {
            as_of: value.as_of,
            months: value.months,
            top: value.top,
            low_stock_threshold: value.low_stock_threshold,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalsResponse {
    pub order_count: i64,
    pub customer_count: i64,
    pub product_count: i64,
    pub revenue: f64,
}

impl From<SalesTotals> for TotalsResponse {
    fn from(value: SalesTotals) -> Self {
        Self {
            order_count: value.order_count,
            customer_count: value.customer_count,
            product_count: value.product_count,
            revenue: value.revenue,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetentionResponse {
    pub previous_month_customers: i64,
    pub retained_customers: i64,
    pub retention_rate: Option<f64>,
    pub churn_rate: Option<f64>,
}

impl From<Retention> for RetentionResponse {
    fn from(value: Retention) -> Self {
        Self {
            previous_month_customers: value.previous_month_customers,
            retained_customers: value.retained_customers,
            retention_rate: value.retention_rate,
            churn_rate: value.churn_rate,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRevenueResponse {
    pub current_month: f64,
    pub previous_month: f64,
    pub growth_rate: Option<f64>,
}

impl From<RecurringRevenue> for RecurringRevenueResponse {
    fn from(value: RecurringRevenue) -> Self {
        Self {
            current_month: value.current_month,
            previous_month: value.previous_month,
            growth_rate: value.growth_rate,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTurnoverResponse {
    pub units_sold: i64,
    pub stock_on_hand: i64,
    pub turnover: Option<f64>,
}

impl From<InventoryTurnover> for InventoryTurnoverResponse {
    fn from(value: InventoryTurnover) -> Self {
        Self {
            units_sold: value.units_sold,
            stock_on_hand: value.stock_on_hand,
            turnover: value.turnover,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySalesResponse {
    /// First day of the month.
    #[schema(value_type = String, format = Date)]
    pub month: NaiveDate,
    pub revenue: f64,
    pub order_count: i64,
}

impl From<MonthlySales> for MonthlySalesResponse {
    fn from(value: MonthlySales) -> Self {
        Self {
            month: value.month,
            revenue: value.revenue,
            order_count: value.order_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSalesResponse {
    pub product_id: String,
    pub product_name: Option<String>,
    pub units_sold: i64,
    pub revenue: f64,
}

impl From<ProductSales> for ProductSalesResponse {
    fn from(value: ProductSales) -> Self {
        Self {
            product_id: value.product_id,
            product_name: value.product_name,
            units_sold: value.units_sold,
            revenue: value.revenue,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySalesResponse {
    pub category: String,
    pub units_sold: i64,
    pub revenue: f64,
}

impl From<CategorySales> for CategorySalesResponse {
    fn from(value: CategorySales) -> Self {
        Self {
            category: value.category,
            units_sold: value.units_sold,
            revenue: value.revenue,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSpendResponse {
    pub customer_id: String,
    pub name: Option<String>,
    pub order_count: i64,
    pub total_spent: f64,
}

impl From<CustomerSpend> for CustomerSpendResponse {
    fn from(value: CustomerSpend) -> Self {
        Self {
            customer_id: value.customer_id,
            name: value.name,
            order_count: value.order_count,
            total_spent: value.total_spent,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountrySalesResponse {
    pub country: String,
    pub order_count: i64,
    pub revenue: f64,
}

impl From<CountrySales> for CountrySalesResponse {
    fn from(value: CountrySales) -> Self {
        Self {
            country: value.country,
            order_count: value.order_count,
            revenue: value.revenue,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoPurchaseResponse {
    pub first_product_id: String,
    pub second_product_id: String,
    pub pair_orders: i64,
    pub support: Option<f64>,
    pub confidence: Option<f64>,
    pub lift: Option<f64>,
}

impl From<CoPurchaseAffinity> for CoPurchaseResponse {
    fn from(value: CoPurchaseAffinity) -> Self {
        Self {
            first_product_id: value.first_product_id,
            second_product_id: value.second_product_id,
            pair_orders: value.pair_orders,
            support: value.support,
            confidence: value.confidence,
            lift: value.lift,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockResponse {
    pub product_id: String,
    pub product_name: Option<String>,
    pub stock_quantity: i64,
}

impl From<LowStockItem> for LowStockResponse {
    fn from(value: LowStockItem) -> Self {
        Self {
            product_id: value.product_id,
            product_name: value.product_name,
            stock_quantity: value.stock_quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub status: String,
    pub transaction_count: i64,
    pub amount: f64,
}

impl From<PaymentStatusTotal> for PaymentStatusResponse {
    fn from(value: PaymentStatusTotal) -> Self {
        Self {
            status: value.status,
            transaction_count: value.transaction_count,
            amount: value.amount,
        }
    }
}

/// Dashboard payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[schema(value_type = String, format = Date)]
    pub as_of: NaiveDate,
    /// First day of the monthly series.
    #[schema(value_type = String, format = Date)]
    pub window_start: NaiveDate,
    pub totals: TotalsResponse,
    pub average_order_value: Option<f64>,
    pub repeat_purchase_rate: Option<f64>,
    pub customer_lifetime_value: Option<f64>,
    pub retention: RetentionResponse,
    pub recurring_revenue: RecurringRevenueResponse,
    pub inventory_turnover: InventoryTurnoverResponse,
    pub monthly_sales: Vec<MonthlySalesResponse>,
    pub top_products: Vec<ProductSalesResponse>,
    pub category_sales: Vec<CategorySalesResponse>,
    pub top_customers: Vec<CustomerSpendResponse>,
    pub country_sales: Vec<CountrySalesResponse>,
    pub co_purchases: Vec<CoPurchaseResponse>,
    pub low_stock: Vec<LowStockResponse>,
    pub payment_statuses: Vec<PaymentStatusResponse>,
}

fn convert_all<T, R: From<T>>(items: Vec<T>) -> Vec<R> {
    items.into_iter().map(R::from).collect()
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            as_of: summary.as_of,
            window_start: summary.window_start,
            totals: summary.totals.into(),
            average_order_value: summary.average_order_value,
            repeat_purchase_rate: summary.repeat_purchase_rate,
            customer_lifetime_value: summary.customer_lifetime_value,
            retention: summary.retention.into(),
            recurring_revenue: summary.recurring_revenue.into(),
            inventory_turnover: summary.inventory_turnover.into(),
            monthly_sales: convert_all(summary.monthly_sales),
            top_products: convert_all(summary.top_products),
            category_sales: convert_all(summary.category_sales),
            top_customers: convert_all(summary.top_customers),
            country_sales: convert_all(summary.country_sales),
            co_purchases: convert_all(summary.co_purchases),
            low_stock: convert_all(summary.low_stock),
            payment_statuses: convert_all(summary.payment_statuses),
        }
    }
}

/// Compute the sales dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    params(DashboardQueryParams),
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 400, description = "Parameter out of range", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "getDashboard"
)]
#[get("/dashboard")]
pub async fn get_dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<DashboardQueryParams>,
) -> ApiResult<web::Json<DashboardResponse>> {
    session.require_user_id()?;
    let summary = state.dashboard.dashboard(query.into_inner().into()).await?;
    Ok(web::Json(summary.into()))
}

/// Register the dashboard route on a scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_dashboard);
}
