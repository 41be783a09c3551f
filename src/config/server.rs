//! HTTP server settings loaded from environment variables.
//!
//! Reads `HOST`, `PORT` and `SEED_FILE`, falling back to local defaults.
//! Variables are normally provided through the `.env` file.

use crate::errors::{Error, Result};
use std::net::SocketAddr;

/// Where and how the web server runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Path of the TOML file lookups are seeded from
    pub seed_file: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            seed_file: "seed.toml".to_string(),
        }
    }
}

impl ServerSettings {
    /// Loads the settings from the environment.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when `PORT` is set but is not a valid port number.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|e| Error::Config {
                message: format!("Invalid PORT '{raw}': {e}"),
            })?,
            Err(_) => defaults.port,
        };
        Ok(Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port,
            seed_file: std::env::var("SEED_FILE").unwrap_or(defaults.seed_file),
        })
    }

    /// Socket address to bind.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when `host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config {
                message: format!("Invalid bind address {}:{}: {e}", self.host, self.port),
            })
    }
}
