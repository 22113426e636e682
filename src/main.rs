//! Kiosque application entry point.
//!
//! Bootstraps the server:
//! 1. Load configuration from environment
//! 2. Connect to Redis
//! 3. Seed demo data, singleton rows and the default administrator
//! 4. Build router with API routes + static file serving
//! 5. Apply security headers, CORS and request tracing
//! 6. Start Axum server
//!
//! Maintenance subcommands: `hash-password`, `create-admin`, `enable-admin`
//! and `disable-admin`.

use kiosque::{
    auth::{hash_password, middleware::AppState},
    config::{self, Config, ConfigError},
    middleware::security_headers,
    routes,
    seed::{self, SeedError},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Request bodies are small JSON or form payloads.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Bootstrap failed: {0}")]
    Seed(#[from] SeedError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  kiosque                                   Run the server");
    eprintln!("  kiosque hash-password <password>          Print an Argon2id hash");
    eprintln!("  kiosque create-admin <username> <password>");
    eprintln!("  kiosque enable-admin <username>");
    eprintln!("  kiosque disable-admin <username>");
    eprintln!();
    eprintln!("Maintenance commands read REDIS_URL from the environment or .env.");
}

async fn maintenance_connection() -> Result<redis::aio::MultiplexedConnection, StartupError> {
    let url = config::redis_url_from_env()?;
    let client = redis::Client::open(url.as_str())?;
    Ok(client.get_multiplexed_async_connection().await?)
}

/// Run a maintenance subcommand. Returns `None` when `args` names none.
async fn run_command(args: &[String]) -> Option<Result<(), StartupError>> {
    let command = args.get(1)?.as_str();
    let result: Result<(), StartupError> = match (command, &args[2..]) {
        ("hash-password", [password]) => match hash_password(password) {
            Ok(hash) => {
                println!("{}", hash);
                Ok(())
            }
            Err(e) => Err(SeedError::from(e).into()),
        },
        ("create-admin", [username, _]) if !config::is_valid_username(username) => {
            Err(ConfigError::InvalidValue(
                "username".to_string(),
                "must be 1-50 characters without whitespace".to_string(),
            )
            .into())
        }
        ("create-admin", [username, password]) => {
            match maintenance_connection().await {
                Ok(mut con) => seed::create_admin(&mut con, username, password)
                    .await
                    .map(|id| println!("Administrator '{}' created (id {})", username, id))
                    .map_err(StartupError::from),
                Err(e) => Err(e),
            }
        }
        ("enable-admin" | "disable-admin", [username]) => {
            let active = command == "enable-admin";
            match maintenance_connection().await {
                Ok(mut con) => seed::set_admin_active(&mut con, username, active)
                    .await
                    .map_err(StartupError::from),
                Err(e) => Err(e),
            }
        }
        _ => {
            print_usage();
            std::process::exit(2);
        }
    };
    Some(result)
}

async fn serve() -> Result<(), StartupError> {
    let config = Config::from_env()?;
    tracing::info!("Starting kiosque on {}", config.bind_addr);

    let redis_client = redis::Client::open(config.redis_url.as_str())?;

    // Verify Redis connection and run first-boot steps
    let mut con = redis_client.get_multiplexed_async_connection().await?;
    seed::bootstrap(&mut con, &config).await?;

    let bind_addr = config.bind_addr;
    let static_dir = config.static_dir.clone();
    let state = AppState::new(redis_client, config);

    // Single-origin deployment: no cross-origin requests are allowed.
    let cors = CorsLayer::new();

    let app = routes::app_router()
        .fallback_service(ServeDir::new(static_dir))
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(axum::middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("Admin: http://{}/admin", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let result = match run_command(&args).await {
        Some(result) => result,
        None => serve().await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Fatal error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
