use dotenvy::dotenv;
use kpi_manager::{
    config::{
        database::{create_connection, create_tables},
        seed::{load_seed_config, seed_lookups},
        server::ServerSettings,
    },
    errors::Result,
    web::{AppState, router},
};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Server settings
    let settings = ServerSettings::from_env()
        .inspect_err(|e| error!("Invalid server configuration: {}", e))?;

    // 4. Database
    let db = create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed lookups when a seed file is present
    if Path::new(&settings.seed_file).exists() {
        let seed = load_seed_config(&settings.seed_file)?;
        seed_lookups(&db, &seed)
            .await
            .inspect_err(|e| error!("Failed to seed lookups: {}", e))?;
    } else {
        warn!(
            "Seed file {} not found; skipping lookup seeding.",
            settings.seed_file
        );
    }

    // 6. Serve
    let addr = settings.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, router(AppState { db })).await?;

    Ok(())
}
