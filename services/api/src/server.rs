use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryDuplicateChecker, InMemoryLeadRepository, UnconfiguredAiScorer};
use crate::routes::with_lead_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use crm_leads::config::AppConfig;
use crm_leads::error::AppError;
use crm_leads::telemetry;
use crm_leads::workflows::leads::LeadQualificationService;
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

    let settings = config.tenant.load_settings()?;
    let repository = Arc::new(InMemoryLeadRepository::default());
    let duplicates = Arc::new(InMemoryDuplicateChecker::new(repository.clone()));
    let lead_service = Arc::new(LeadQualificationService::new(
        repository,
        duplicates,
        Arc::new(settings),
        Arc::new(UnconfiguredAiScorer),
    ));

    let app = with_lead_routes(lead_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        tenant_settings = ?config.tenant.settings_path,
        "lead qualification service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
