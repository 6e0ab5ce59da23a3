// Import necessary modules
mod app_state;
mod config;
mod handlers;
mod models;
mod routes;
mod services;
mod store;

use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app_state::AppState;
use config::load_config;
use routes::app_routes::create_router;
use store::ChatStore;

// The main entry point for the application using the tokio runtime.
#[tokio::main]
async fn main() {
    // Initialize the subscriber for logging and request tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration from the environment and handle errors
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return;
        }
    };
    println!("db path: {}", config.db_path);

    // Open the chat store once; everything downstream borrows this handle
    let store = match ChatStore::open(&config.db_path) {
        Ok(store) => {
            println!("Chat store opened successfully!");
            store
        }
        Err(e) => {
            eprintln!("Error opening the chat store: {}", e);
            return;
        }
    };

    // Create the router using the function from the router module
    let state = AppState::new(Arc::new(store));
    let app = create_router(state);

    println!("Server running on http://{}", config.bind_addr);

    // Start the server, binding to the configured address and enabling graceful shutdown
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed to start");
}

// A function to handle graceful shutdown by listening for termination signals.
async fn shutdown_signal() {
    // Handle Ctrl+C signal for graceful shutdown
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    // Unix-specific signal handling (e.g., SIGTERM)
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    // Wait for either Ctrl+C or the termination signal
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    // Log when shutdown signal is received and starting graceful shutdown
    println!("Signal received, starting graceful shutdown");
}
