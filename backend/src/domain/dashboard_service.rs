//! Dashboard use-case: resolve the reporting window, fetch aggregates and
//! derive the metrics.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{DashboardQuery, DashboardRepository};
use crate::domain::{DashboardRequest, DashboardSummary, DashboardWindow, Error};

/// Dashboard service implementing [`DashboardQuery`].
pub struct DashboardService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> DashboardService<R> {
    /// Create a service; `clock` supplies the default reporting date.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

#[async_trait]
impl<R> DashboardQuery for DashboardService<R>
where
    R: DashboardRepository,
{
    async fn dashboard(&self, request: DashboardRequest) -> Result<DashboardSummary, Error> {
        let today = self.clock.utc().date_naive();
        let window = DashboardWindow::new(request, today)?;
        let aggregates = self.repo.aggregates(&window).await?;
        Ok(DashboardSummary::from_aggregates(&window, aggregates))
    }
}

#[cfg(test)]
mod tests {
    //! Window resolution and error mapping for the dashboard use-case.
    use super::*;
    use crate::domain::ports::{DashboardRepositoryError, MockDashboardRepository};
    use crate::domain::{DashboardAggregates, ErrorCode, SalesTotals};
    use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

    struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    fn fixture_clock() -> Arc<dyn Clock> {
        Arc::new(FixtureClock {
            utc_now: Utc
                .with_ymd_and_hms(2026, 5, 20, 9, 30, 0)
                .single()
                .expect("valid timestamp"),
        })
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[tokio::test]
    async fn defaults_the_window_to_the_clock_date() {
        let mut repo = MockDashboardRepository::new();
        repo.expect_aggregates()
            .withf(|window| {
                window.as_of() == date(2026, 5, 20) && window.current_month_start() == date(2026, 5, 1)
            })
            .times(1)
            .return_once(|_| {
                Ok(DashboardAggregates {
                    totals: SalesTotals {
                        order_count: 4,
                        customer_count: 2,
                        product_count: 3,
                        revenue: 100.0,
                    },
                    ordering_customers: 2,
                    ..DashboardAggregates::default()
                })
            });

        let summary = DashboardService::new(Arc::new(repo), fixture_clock())
            .dashboard(DashboardRequest::default())
            .await
            .expect("dashboard");
        assert_eq!(summary.as_of, date(2026, 5, 20));
        assert_eq!(summary.average_order_value, Some(25.0));
        assert_eq!(summary.customer_lifetime_value, Some(50.0));
        assert_eq!(summary.monthly_sales.len(), 12);
    }

    #[tokio::test]
    async fn explicit_as_of_overrides_the_clock() {
        let mut repo = MockDashboardRepository::new();
        repo.expect_aggregates()
            .withf(|window| window.as_of() == date(2025, 12, 31) && window.months() == 3)
            .times(1)
            .return_once(|_| Ok(DashboardAggregates::default()));

        let request = DashboardRequest {
            as_of: Some(date(2025, 12, 31)),
            months: Some(3),
            ..DashboardRequest::default()
        };
        let summary = DashboardService::new(Arc::new(repo), fixture_clock())
            .dashboard(request)
            .await
            .expect("dashboard");
        assert_eq!(summary.window_start, date(2025, 10, 1));
    }

    #[tokio::test]
    async fn invalid_requests_never_reach_the_repository() {
        let mut repo = MockDashboardRepository::new();
        repo.expect_aggregates().never();

        let request = DashboardRequest {
            months: Some(0),
            ..DashboardRequest::default()
        };
        let error = DashboardService::new(Arc::new(repo), fixture_clock())
            .dashboard(request)
            .await
            .expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn repository_outages_map_to_service_unavailable() {
        let mut repo = MockDashboardRepository::new();
        repo.expect_aggregates()
            .return_once(|_| Err(DashboardRepositoryError::connection("refused")));

        let error = DashboardService::new(Arc::new(repo), fixture_clock())
            .dashboard(DashboardRequest::default())
            .await
            .expect_err("unavailable");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
