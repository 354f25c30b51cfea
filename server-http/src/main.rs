mod api;
mod handlers;
mod middleware;
mod routes;
mod state;

use std::sync::Arc;

use bazaar::auth::create_default_admin;
use bazaar::connection::ConnectionManager;
use bazaar::ports::UserRepository;
use shared::config::Config;
use state::AppState;
use storage_engine::{SledCategories, SledOrders, SledProducts, SledUsers};
use tracing::{error, info, Level};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting Bazaar HTTP Server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    // Load configuration from environment variables
    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            error!(%err, "invalid configuration");
            std::process::exit(1);
        }
    };

    // Bring up the document store connection; nothing works without it.
    let connection = Arc::new(ConnectionManager::new(&config.db_url));
    connection
        .connect()
        .await
        .expect("document store must be reachable at startup");
    let db = connection
        .handle()
        .await
        .expect("connected store has a live handle");

    // Repositories over the shared store handle
    let categories = Arc::new(SledCategories::new(db.clone()));
    let products = Arc::new(SledProducts::new(db.clone()));
    let users = Arc::new(SledUsers::new(db.clone()));
    let orders = Arc::new(SledOrders::new(db));

    seed_default_admin(&config, users.clone()).await;

    // Initialize state
    let state = AppState::new(
        &config,
        connection.clone(),
        categories,
        products,
        users.clone(),
        users,
        orders,
    );

    // Build router
    let router = routes::build_router(state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.http_port))
        .await
        .unwrap();

    info!(
        "HTTP Server listening on http://{}:{}",
        config.host, config.http_port
    );

    // Graceful shutdown handler
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    if let Err(err) = connection.disconnect().await {
        error!(%err, "document store did not close cleanly");
    }

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}

async fn seed_default_admin(config: &Config, users: Arc<SledUsers>) {
    let admin_exists = users
        .username_exists(&config.admin_username)
        .await
        .unwrap_or(false);

    if admin_exists {
        info!("Admin user already exists: {}", config.admin_username);
        return;
    }

    info!("Creating default admin user: {}", config.admin_username);
    let admin = create_default_admin(config.admin_username.clone(), config.admin_password.clone())
        .expect("Failed to create default admin user");

    users
        .create(admin)
        .await
        .expect("Failed to save default admin user");

    info!("✓ Default admin user created: {}", config.admin_username);
}
