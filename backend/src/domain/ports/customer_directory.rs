//! Port abstraction for the customer directory collaborator.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Customer, Npi};

/// Errors surfaced by directory adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerDirectoryError {
    /// Directory connection could not be established.
    #[error("customer directory connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query failed during execution.
    #[error("customer directory query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl CustomerDirectoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Read-side port over the customer registry.
///
/// The directory owns the customer graph (country, front office, enrolling
/// agent); the workflows only resolve identifiers through it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Fetch a customer by national/personal identifier.
    async fn find_by_npi(&self, npi: &Npi) -> Result<Option<Customer>, CustomerDirectoryError>;
}
