//! Mock API server binary.
//!
//! Serves the educational platform REST API from an in-memory repository,
//! seeded with demo data unless `repository.toml` says otherwise.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin edu-mock-server
//! PORT=4000 RUST_LOG=debug cargo run --bin edu-mock-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3001)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use edu_client::db::{self, RepositoryConfig};
use edu_client::http::{create_router, AppState, API_PREFIX};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting mock API server");

    let config = RepositoryConfig::from_default_location()?;
    let repository = db::create_repository(&config);
    info!(
        seed_demo_data = config.repository.seed_demo_data,
        "Repository initialized"
    );

    let app = create_router(AppState::new(repository));

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}{}", addr, API_PREFIX);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
