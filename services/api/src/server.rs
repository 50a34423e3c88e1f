use crate::cli::ServeArgs;
use crate::infra::{fleet_repository, paging_policy, AppState, InMemoryWeightsRepository};
use crate::routes::with_induction_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fleet_induction::config::AppConfig;
use fleet_induction::error::AppError;
use fleet_induction::telemetry;
use fleet_induction::workflows::induction::InductionService;
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
    if let Some(roster) = args.roster.take() {
        config.induction.seed_csv = Some(roster);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let fleet = Arc::new(fleet_repository(config.induction.seed_csv.as_deref())?);
    let weights = Arc::new(InMemoryWeightsRepository::default());
    let induction_service = Arc::new(InductionService::new(
        fleet,
        weights,
        paging_policy(&config.induction),
    ));
    let trainsets = induction_service.list_with_diagnostics()?.len();

    let app = with_induction_routes(induction_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        trainsets,
        seed = ?config.induction.seed_csv,
        "fleet induction service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
