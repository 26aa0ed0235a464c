use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryBackend, InMemoryResumeStorage};
use crate::routes::with_job_board_routes;
use crate::AppError;
use axum::extract::DefaultBodyLimit;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use jobboard::config::AppConfig;
use jobboard::telemetry;
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

    let backend = Arc::new(InMemoryBackend::default());
    let storage = Arc::new(InMemoryResumeStorage::default());
    seed_demo_accounts(&backend);

    let app = with_job_board_routes(backend, storage, config.limits.page_size)
        .layer(DefaultBodyLimit::max(config.limits.max_resume_bytes))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// The external auth provider is out of scope for local runs, so a few
/// well-known accounts are registered at startup. Their tokens are logged for
/// manual exercise of the API.
fn seed_demo_accounts(backend: &InMemoryBackend) {
    backend.register_account(
        "employer-token",
        "employer-1",
        "acme-hr",
        "hr@acme.example",
        "Employer",
    );
    backend.register_account(
        "seeker-token",
        "seeker-1",
        "casey",
        "casey@example.com",
        "Job Seeker",
    );
    backend.register_account(
        "admin-token",
        "admin-1",
        "ops",
        "ops@jobboard.example",
        "Admin",
    );

    info!("seeded demo accounts: employer-token, seeker-token, admin-token");
}
