//! Polleneer server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use polleneer_api::{AppState, router as api_router};
use polleneer_common::Config;
use polleneer_core::{
    EngagementService, InteractionService, LedgerService, NotificationService, PointSchedule,
    PostService, UserService,
};
use polleneer_db::repositories::{
    CommentRepository, InteractionRepository, LedgerRepository, NotificationRepository,
    PostRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polleneer=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting polleneer server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = polleneer_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    polleneer_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let interaction_repo = InteractionRepository::new(Arc::clone(&db));
    let ledger_repo = LedgerRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    // Initialize services
    let points = PointSchedule::from(config.points);

    let interaction_service = InteractionService::new(interaction_repo.clone());
    let ledger_service = LedgerService::new(ledger_repo, user_repo.clone());
    let notification_service = NotificationService::new(notification_repo);
    let engagement_service = EngagementService::new(
        Arc::clone(&db),
        interaction_service.clone(),
        ledger_service.clone(),
        notification_service.clone(),
        post_repo.clone(),
        user_repo.clone(),
        comment_repo.clone(),
        points,
    );
    let post_service = PostService::new(
        Arc::clone(&db),
        post_repo,
        user_repo.clone(),
        comment_repo,
        ledger_service.clone(),
        points,
    );
    let user_service = UserService::new(user_repo, interaction_repo);

    // Create app state
    let state = AppState {
        user_service,
        post_service,
        engagement_service,
        interaction_service,
        ledger_service,
        notification_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            polleneer_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
