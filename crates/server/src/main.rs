//! Secure-whisper server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whisper_api::{
    ApiRateLimiter, AppState, middleware::auth_middleware, rate_limit::limits,
    router as api_router,
};
use whisper_common::{Config, LocalStorage};
use whisper_core::{
    CompanyService, DashboardService, IdentityService, ReportService, SubmissionService,
};
use whisper_db::repositories::{
    CompanyRepository, ProfileRepository, ReportCommentRepository, ReportRepository,
};

/// Largest accepted request body. Evidence travels base64-encoded inside
/// the report step, so this sits above the decoded file limit.
const MAX_BODY_BYTES: usize = 15 * 1024 * 1024;

/// How often expired submissions and idle throttle keys are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Periodically drop expired submissions and stale attempt counters.
fn spawn_sweeper(submissions: SubmissionService, limiter: ApiRateLimiter) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = submissions.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired submissions");
            }
            limiter.cleanup(limits::MAX_WINDOW_SECS).await;
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whisper=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting secure-whisper server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = whisper_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    whisper_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Initialize repositories
    let company_repo = CompanyRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let comment_repo = ReportCommentRepository::new(Arc::clone(&db));

    // Evidence storage
    let storage = Arc::new(LocalStorage::new(config.storage.evidence_path.clone()));
    info!(path = %config.storage.evidence_path.display(), "Evidence storage ready");

    // Initialize services
    let company_service = CompanyService::new(
        company_repo.clone(),
        config.features.expose_organization_roster,
    );
    let report_service = ReportService::new(
        report_repo.clone(),
        company_repo.clone(),
        comment_repo.clone(),
        storage,
    );
    let submission_service = SubmissionService::new(
        company_service.clone(),
        report_service.clone(),
        Duration::from_secs(config.submission.session_ttl_secs),
    );
    let identity_service = IdentityService::new(profile_repo.clone());
    let dashboard_service =
        DashboardService::new(report_repo, company_repo, profile_repo, comment_repo);
    let attempt_limiter = ApiRateLimiter::new();
    if config.server.trust_proxy_headers {
        info!("Client addresses taken from proxy headers");
    }

    spawn_sweeper(submission_service.clone(), attempt_limiter.clone());

    let state = AppState {
        identity_service,
        company_service,
        submission_service,
        report_service,
        dashboard_service,
        attempt_limiter,
        trust_proxy_headers: config.server.trust_proxy_headers,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}
