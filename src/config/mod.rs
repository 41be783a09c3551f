/// Database connection and table creation
pub mod database;

/// Lookup seeding from seed.toml
pub mod seed;

/// Server bind settings from environment variables
pub mod server;
