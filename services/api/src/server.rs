use crate::cli::ServeArgs;
use crate::infra::{in_memory_affiliate_service, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use nawafiz_affiliate::advisory::{AdvisoryProviders, AdvisoryState};
use nawafiz_affiliate::config::AppConfig;
use nawafiz_affiliate::error::AppError;
use nawafiz_affiliate::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let providers = AdvisoryProviders::from_config(&config.advisory)?;
    let advisory = Arc::new(AdvisoryState::new(providers));
    let affiliate = in_memory_affiliate_service();

    let app = with_service_routes(affiliate, advisory)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        provider = ?config.advisory.provider,
        %addr,
        "nawafiz affiliate service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
