use std::sync::Arc;

use anyhow::Result;
use sector_select::api::{create_router, AppState};
use sector_select::database::{DatabaseConfig, DatabaseManager};
use sector_select::service::{SectorService, SelectionService};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "sector_select=info,tower_http=debug".to_string()),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Database connection
    let manager = DatabaseManager::new(DatabaseConfig::default()).await?;
    manager.test_connection().await?;

    let sectors = Arc::new(manager.sector_catalog());
    let selections = Arc::new(manager.selection_store());

    let state = AppState {
        sector_service: SectorService::new(sectors.clone()),
        selection_service: SelectionService::new(selections, sectors),
    };

    let app = create_router(state);

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);

    let addr = format!("0.0.0.0:{}", port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
