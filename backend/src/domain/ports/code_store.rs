//! Port abstraction for the ephemeral verification-code store.
//!
//! The store is the single shared resource of the code workflows: a
//! time-bounded code-to-npi binding accessed concurrently by independent
//! request-handling units. Adapters must make every operation atomic with
//! respect to the others for the same code.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Npi, VerificationCode};

/// Errors surfaced by code store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeStoreError {
    /// Store backend is unavailable or timing out.
    #[error("code store backend failure: {message}")]
    Backend {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A stored binding could not be decoded into domain types.
    #[error("code store entry is corrupt: {message}")]
    Corrupt {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl CodeStoreError {
    /// Helper for backend-level failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Helper for undecodable entries.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

/// Port for the ephemeral code-to-subject binding.
///
/// A lookup miss is never an error: it is the expected invalid-or-expired
/// terminal condition, surfaced to callers as `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Atomically bind `code` to `npi` for `ttl`, unless a live binding for
    /// `code` already exists.
    ///
    /// Returns `false` when the code is already bound and unexpired; the
    /// issuer then retries with a fresh code. The check and the write are a
    /// single atomic step so two concurrent issuances can never both claim
    /// the same code.
    async fn insert_if_absent(
        &self,
        code: &VerificationCode,
        npi: &Npi,
        ttl: Duration,
    ) -> Result<bool, CodeStoreError>;

    /// Read the bound subject, leaving the binding in place.
    ///
    /// Returns `None` when the code was never bound, was consumed, or is
    /// past its TTL.
    async fn peek(&self, code: &VerificationCode) -> Result<Option<Npi>, CodeStoreError>;

    /// Atomically read and remove the bound subject.
    ///
    /// This is the one-time-use redemption primitive: of two concurrent
    /// redeemers, exactly one observes the binding.
    async fn take(&self, code: &VerificationCode) -> Result<Option<Npi>, CodeStoreError>;
}
