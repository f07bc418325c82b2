//! Optional Prometheus request metrics.
//!
//! Metrics are best-effort: when the registry cannot be built the server
//! still starts, with [`MetricsLayer::Disabled`] passing requests through.

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use std::fmt::Display;
use std::sync::Arc;
use tracing::warn;

/// Namespace prefixed to every exported metric.
const NAMESPACE: &str = "backoffice";

/// Run a metrics builder, logging and discarding any failure.
pub(crate) fn initialize_metrics<E, F>(build: F) -> Option<PrometheusMetrics>
where
    E: Display,
    F: FnOnce() -> Result<PrometheusMetrics, E>,
{
    match build() {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "Prometheus metrics disabled");
            None
        }
    }
}

/// Request metrics served on `/metrics`.
pub(crate) fn request_metrics() -> Option<PrometheusMetrics> {
    initialize_metrics(|| {
        PrometheusMetricsBuilder::new(NAMESPACE)
            .endpoint("/metrics")
            .build()
    })
}

#[derive(Clone)]
pub(crate) enum MetricsLayer {
    Enabled(Arc<PrometheusMetrics>),
    Disabled,
}

impl MetricsLayer {
    #[must_use]
    pub(crate) fn from_option(metrics: Option<PrometheusMetrics>) -> Self {
        match metrics {
            Some(metrics) => Self::Enabled(Arc::new(metrics)),
            None => Self::Disabled,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.clone() {
            MetricsLayer::Enabled(metrics) => {
                let fut = Compat::new((*metrics).clone()).new_transform(service);
                Box::pin(async move {
                    let svc = fut.await?;
                    Ok(boxed::service(svc))
                })
            }
            MetricsLayer::Disabled => Box::pin(async move {
                let svc = service.map(|res: ServiceResponse<B>| res.map_into_boxed_body());
                Ok(boxed::service(svc))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn failed_builds_disable_metrics() {
        assert!(initialize_metrics(|| -> Result<PrometheusMetrics, &str> { Err("boom") }).is_none());
    }

    #[rstest]
    fn layer_reflects_the_option() {
        assert!(matches!(MetricsLayer::from_option(None), MetricsLayer::Disabled));
        let metrics = PrometheusMetricsBuilder::new("test")
            .endpoint("/metrics")
            .build()
            .expect("metrics build");
        assert!(matches!(
            MetricsLayer::from_option(Some(metrics)),
            MetricsLayer::Enabled(_)
        ));
    }
}
