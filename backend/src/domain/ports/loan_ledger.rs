//! Port abstraction for the loan ledger collaborator.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Loan, NewLoan, Npi};

/// Errors surfaced by ledger adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanLedgerError {
    /// Ledger connection could not be established.
    #[error("loan ledger connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("loan ledger query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl LoanLedgerError {
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

/// Persistence port for loan records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanLedger: Send + Sync {
    /// Persist a registration payload and return the stored record.
    async fn create(&self, loan: NewLoan) -> Result<Loan, LoanLedgerError>;

    /// Loans owed *to* the holder of `npi`: every record whose denormalized
    /// creditor identifier matches.
    async fn find_by_creditor_npi(&self, npi: &Npi) -> Result<Vec<Loan>, LoanLedgerError>;

    /// Loans owed *by* the given debtor record.
    async fn find_by_debtor(&self, debtor_id: &Uuid) -> Result<Vec<Loan>, LoanLedgerError>;

    /// Unsettled loans of the given debtor whose deadline lies before
    /// `as_of`; feeds the field agents' overdue alerts.
    async fn find_overdue_by_debtor(
        &self,
        debtor_id: &Uuid,
        as_of: NaiveDate,
    ) -> Result<Vec<Loan>, LoanLedgerError>;
}
