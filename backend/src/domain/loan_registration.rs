//! Loan registration workflow: code-gated creation of a debt record.
//!
//! The debtor's consent is evidenced by the verification code: the agent can
//! only produce it after the customer relays it from their own contact
//! channel. The creditor side is identified by npi alone and stored
//! denormalized on the loan record.

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;

use crate::domain::agent::{AgentContext, ensure_code_operator};
use crate::domain::issuance::{
    CodeIssued, CodePurpose, CodeWorkflowPorts, issue_code, map_directory_error,
    map_ledger_error, redeem_code,
};
use crate::domain::{
    CodeConfig, Error, Loan, Money, MoneyParseError, NewLoan, Npi, Periodicity,
};

/// Date format accepted for the loan deadline.
const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Raw loan registration submission.
///
/// Fields arrive as text from the transport boundary; the service owns all
/// validation so every rejection carries a stable error code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterLoanCommand {
    /// Verification code relayed by the debtor.
    pub code: String,
    /// Principal amount, decimal text.
    pub amount: String,
    /// Repayment cadence label.
    pub periodicity: String,
    /// Total due at the deadline, decimal text.
    pub deadline_amount: String,
    /// Settlement deadline, ISO `YYYY-MM-DD`.
    pub deadline: String,
    /// Creditor identifier.
    pub creditor_npi: String,
}

impl RegisterLoanCommand {
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("code", self.code.as_str()),
            ("amount", self.amount.as_str()),
            ("periodicity", self.periodicity.as_str()),
            ("deadline_amount", self.deadline_amount.as_str()),
            ("deadline", self.deadline.as_str()),
            ("creditor_npi", self.creditor_npi.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Loan registration workflow service.
#[derive(Clone)]
pub struct LoanRegistrationService {
    ports: CodeWorkflowPorts,
    config: CodeConfig,
    clock: Arc<dyn Clock>,
}

impl LoanRegistrationService {
    /// Create a new service over the shared workflow ports.
    ///
    /// The clock stamps the registration date on created loans.
    pub fn new(ports: CodeWorkflowPorts, config: CodeConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            ports,
            config,
            clock,
        }
    }

    /// Issue a loan registration code for the customer identified by `npi`.
    ///
    /// Identical mechanics to the consultation issuance, distinct message
    /// template, same store.
    pub async fn request_loan_code(
        &self,
        agent: &AgentContext,
        npi: &Npi,
    ) -> Result<CodeIssued, Error> {
        ensure_code_operator(agent)?;
        issue_code(&self.ports, &self.config, npi, CodePurpose::LoanRegistration).await
    }

    /// Validate a submission, redeem its code, and create the loan record.
    ///
    /// Checks run in a fixed order: field presence, periodicity, amounts and
    /// deadline, creditor resolution, code redemption, debtor resolution,
    /// and finally the creditor/debtor distinction.
    pub async fn register_loan(&self, command: RegisterLoanCommand) -> Result<Loan, Error> {
        let missing = command.missing_fields();
        if !missing.is_empty() {
            return Err(Error::invalid_request(
                "fields code, amount, periodicity, deadline_amount, deadline, \
                 creditor_npi are required",
            )
            .with_details(json!({ "missing": missing })));
        }

        let periodicity =
            Periodicity::from_str(command.periodicity.trim()).map_err(|err| {
                Error::invalid_request(err.to_string()).with_details(json!({
                    "code": "invalid_periodicity",
                    "allowed": Periodicity::ALL.map(Periodicity::as_str),
                }))
            })?;
        let amount = parse_amount("amount", &command.amount)?;
        let deadline_amount = parse_amount("deadline_amount", &command.deadline_amount)?;
        let deadline = NaiveDate::parse_from_str(command.deadline.trim(), DEADLINE_FORMAT)
            .map_err(|_| {
                Error::invalid_request("deadline must be an ISO date (YYYY-MM-DD)")
                    .with_details(json!({ "field": "deadline" }))
            })?;
        let creditor_npi = Npi::new(command.creditor_npi.trim())
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let creditor = self
            .ports
            .directory
            .find_by_npi(&creditor_npi)
            .await
            .map_err(map_directory_error)?
            .ok_or_else(|| {
                Error::not_found("no customer found for the creditor npi")
                    .with_details(json!({ "code": "unknown_creditor" }))
            })?;

        let debtor = redeem_code(&self.ports, &self.config, &command.code).await?;

        if debtor.id == creditor.id {
            return Err(Error::self_loan(
                "creditor and debtor must be different customers",
            ));
        }

        let loan = self
            .ports
            .ledger
            .create(NewLoan {
                debtor_id: debtor.id,
                debtor_npi: debtor.npi,
                creditor_npi,
                amount,
                periodicity,
                deadline_amount,
                deadline,
                registered_on: self.clock.utc().date_naive(),
            })
            .await
            .map_err(map_ledger_error)?;

        tracing::info!(
            loan = %loan.id,
            debtor = %loan.debtor_npi,
            creditor = %loan.creditor_npi,
            "loan registered"
        );
        Ok(loan)
    }
}

fn parse_amount(field: &'static str, raw: &str) -> Result<Money, Error> {
    Money::parse(raw).map_err(|err| {
        let message = match err {
            MoneyParseError::Empty => format!("{field} must not be empty"),
            _ => format!("{field}: {err}"),
        };
        Error::invalid_request(message).with_details(json!({ "field": field }))
    })
}

#[cfg(test)]
#[path = "loan_registration_tests.rs"]
mod loan_registration_tests;
