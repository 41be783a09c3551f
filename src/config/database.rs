//! Database configuration module for the KPI manager.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL. Creation is skipped for tables that
//! already exist.

use crate::entities::{
    AggregationMethod, ComparisonType, Equipment, HierarchyLevel, Indicator, IndicatorEquipment,
    OrganizationalStructure, Periodicity, Perspective,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/kpi_manager.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Creates the directory holding a file-backed `SQLite` database.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or(rest);
    if let Some(parent) = Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    ensure_sqlite_dir(&database_url)?;
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table, lookups first so foreign keys resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Perspective).await?;
    create_table(db, &schema, ComparisonType).await?;
    create_table(db, &schema, Periodicity).await?;
    create_table(db, &schema, AggregationMethod).await?;
    create_table(db, &schema, HierarchyLevel).await?;
    create_table(db, &schema, OrganizationalStructure).await?;
    create_table(db, &schema, Equipment).await?;
    create_table(db, &schema, Indicator).await?;
    create_table(db, &schema, IndicatorEquipment).await?;

    info!("Database tables ensured.");
    Ok(())
}
