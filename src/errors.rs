//! Unified error type for the KPI manager.
//!
//! Core operations return [`Result`]; the web layer maps each variant to an
//! HTTP status. Evaluation never surfaces these errors and folds them into a
//! status string instead.

use thiserror::Error;

/// All failures produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Database driver or query failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Submitted data failed validation or coercion
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable reason, suitable for showing to the user
        message: String,
    },

    /// No indicator with the given id
    #[error("Indicator not found: {id}")]
    IndicatorNotFound {
        /// Requested indicator id
        id: i64,
    },

    /// A referenced lookup row does not exist
    #[error("{kind} not found: {id}")]
    LookupNotFound {
        /// Table-level name of the lookup (e.g. "Perspective")
        kind: &'static str,
        /// Requested id
        id: i64,
    },

    /// Assigning `parent_id` to `indicator_id` would close a loop in the hierarchy
    #[error("Assigning parent {parent_id} to indicator {indicator_id} would create a cycle")]
    ParentCycle {
        /// Indicator being re-parented
        indicator_id: i64,
        /// Proposed parent
        parent_id: i64,
    },

    /// I/O failure (seed file, listener)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Malformed JSON in a dimensional field
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True when the underlying database error is a unique-constraint violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(err) => matches!(
                err.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ),
            _ => false,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
