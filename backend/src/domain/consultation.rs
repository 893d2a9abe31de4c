//! Consultation workflow: code-gated access to a customer's account view.
//!
//! A field agent requests a code for a customer; the code travels to the
//! customer out-of-band; the customer reads it back to the agent, who
//! submits it to unlock the profile together with the receivables owed to
//! that customer.

use serde::Serialize;

use crate::domain::agent::{AgentContext, ensure_code_operator};
use crate::domain::issuance::{
    CodeIssued, CodePurpose, CodeWorkflowPorts, issue_code, map_ledger_error, redeem_code,
};
use crate::domain::{CodeConfig, Customer, Error, Loan, Npi};

/// Customer profile plus receivables, returned by a successful redemption.
///
/// Receivables are the loans owed *to* this customer: every ledger record
/// whose denormalized creditor identifier matches the customer's npi.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerAccountView {
    /// The resolved customer profile.
    pub customer: Customer,
    /// Loans recorded with this customer as creditor.
    pub receivables: Vec<Loan>,
}

/// Consultation workflow service.
#[derive(Clone)]
pub struct ConsultationService {
    ports: CodeWorkflowPorts,
    config: CodeConfig,
}

impl ConsultationService {
    /// Create a new service over the shared workflow ports.
    pub fn new(ports: CodeWorkflowPorts, config: CodeConfig) -> Self {
        Self { ports, config }
    }

    /// Issue a consultation code for the customer identified by `npi`.
    ///
    /// The code is dispatched to the customer's contact channel and never
    /// returned to the caller. Dispatch failures are logged, not surfaced:
    /// the acknowledgment must not leak delivery-channel state.
    pub async fn request_consultation_code(
        &self,
        agent: &AgentContext,
        npi: &Npi,
    ) -> Result<CodeIssued, Error> {
        ensure_code_operator(agent)?;
        issue_code(&self.ports, &self.config, npi, CodePurpose::Consultation).await
    }

    /// Redeem a consultation code for the bound customer's account view.
    ///
    /// Fails with an invalid-or-expired error when the code is unknown,
    /// lapsed, or already consumed under one-time-use semantics.
    pub async fn redeem_consultation_code(
        &self,
        raw_code: &str,
    ) -> Result<CustomerAccountView, Error> {
        let customer = redeem_code(&self.ports, &self.config, raw_code).await?;
        let receivables = self
            .ports
            .ledger
            .find_by_creditor_npi(&customer.npi)
            .await
            .map_err(map_ledger_error)?;
        Ok(CustomerAccountView {
            customer,
            receivables,
        })
    }
}

#[cfg(test)]
#[path = "consultation_tests.rs"]
mod consultation_tests;
