use crate::cli::ServeArgs;
use crate::infra::{scoring_engine, AppState, InMemoryDecisionRepository, InMemoryPlanRepository};
use crate::routes::with_decision_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use paylater::config::AppConfig;
use paylater::error::AppError;
use paylater::telemetry;
use paylater::workflows::lending::decisions::{
    DecisionService, HttpLedgerNotifier, HttpTransactionSource,
};
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

    let source = Arc::new(HttpTransactionSource::new(&config.bank)?);
    let notifier = Arc::new(HttpLedgerNotifier::new(&config.ledger)?);
    let decisions = Arc::new(InMemoryDecisionRepository::default());
    let plans = Arc::new(InMemoryPlanRepository::default());
    let decision_service = Arc::new(DecisionService::new(
        source,
        notifier,
        decisions,
        plans,
        scoring_engine()?,
    ));

    let app = with_decision_routes(decision_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pay-later decision service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
