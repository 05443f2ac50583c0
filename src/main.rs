use shared_terminal::config::Config;
use shared_terminal::routes::create_app;
use shared_terminal::{open_store, AppState};
use std::panic;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Configuration is read before tracing starts so LOG_LEVEL can seed the filter
    let loaded = Config::load();
    let log_level = loaded
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Colored output with source locations while developing, plain lines otherwise
    let development = loaded.as_ref().map(Config::is_development).unwrap_or(true);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(development)
                .with_file(development)
                .with_line_number(development),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("shared_terminal={log_level},tower_http={log_level},axum::rejection=trace,info").into()
        }))
        .init();

    info!("Starting server...");

    let config = loaded.unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    let store = open_store(&config).await;
    let address = config.server_address();
    let ws_path = config.ws_path.clone();
    let state = Arc::new(AppState::new(config, store));
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", address));

    info!("🚀 Server running on http://{}", address);
    info!("📡 Shared room available at ws://{}{}", address, ws_path);
    info!("📚 Swagger UI available at http://{}/swagger", address);

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
