//! Shared issuance and redemption mechanics for the code workflows.
//!
//! Consultation and loan registration gate different operations but issue
//! and redeem codes identically: resolve the customer, bind a fresh unique
//! code with the configured TTL, dispatch it out-of-band, and later resolve
//! a submitted code back to its subject. Only the message template differs.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::domain::ports::{
    CodeStore, CodeStoreError, CustomerDirectory, CustomerDirectoryError, LoanLedger,
    LoanLedgerError, Notification, Notifier,
};
use crate::domain::{CodeConfig, CodeGenerator, Customer, Error, Npi, VerificationCode};

/// Upper bound on collision retries during code generation.
///
/// With 64 bits of entropy a single collision is already vanishingly
/// unlikely; hitting this cap means the generator or the store is broken.
const MAX_GENERATION_ATTEMPTS: u32 = 5;

/// Driven ports shared by both code workflows.
#[derive(Clone)]
pub struct CodeWorkflowPorts {
    /// Customer registry collaborator.
    pub directory: Arc<dyn CustomerDirectory>,
    /// Ephemeral code-to-subject binding.
    pub code_store: Arc<dyn CodeStore>,
    /// Loan record collaborator.
    pub ledger: Arc<dyn LoanLedger>,
    /// Out-of-band dispatch collaborator.
    pub notifier: Arc<dyn Notifier>,
    /// Source of fresh codes.
    pub generator: Arc<dyn CodeGenerator>,
}

impl CodeWorkflowPorts {
    /// Bundle the driven ports for service construction.
    pub fn new(
        directory: Arc<dyn CustomerDirectory>,
        code_store: Arc<dyn CodeStore>,
        ledger: Arc<dyn LoanLedger>,
        notifier: Arc<dyn Notifier>,
        generator: Arc<dyn CodeGenerator>,
    ) -> Self {
        Self {
            directory,
            code_store,
            ledger,
            notifier,
            generator,
        }
    }
}

/// Which gate a code opens; selects the dispatched message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodePurpose {
    /// Viewing a customer's account and receivables.
    Consultation,
    /// Registering a loan against a customer.
    LoanRegistration,
}

impl CodePurpose {
    fn subject(self) -> &'static str {
        match self {
            Self::Consultation => "Code de consultation",
            Self::LoanRegistration => "Code d'enregistrement de dette",
        }
    }

    fn body(self, code: &VerificationCode) -> String {
        match self {
            Self::Consultation => {
                format!("Votre code de consultation de compte: {code}")
            }
            Self::LoanRegistration => {
                format!("Votre code d'enregistrement de dette: {code}")
            }
        }
    }
}

/// Issuance acknowledgment.
///
/// Deliberately carries no code and no delivery outcome: the code only
/// reaches the customer out-of-band, and reporting dispatch failures would
/// let a caller enumerate which customers have working contact channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeIssued {
    /// Subject the code was bound to.
    pub npi: Npi,
}

pub(crate) fn map_store_error(error: CodeStoreError) -> Error {
    match error {
        CodeStoreError::Backend { message } => {
            Error::service_unavailable(format!("code store unavailable: {message}"))
        }
        CodeStoreError::Corrupt { message } => {
            Error::internal(format!("code store returned corrupt entry: {message}"))
        }
    }
}

pub(crate) fn map_directory_error(error: CustomerDirectoryError) -> Error {
    match error {
        CustomerDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("customer directory unavailable: {message}"))
        }
        CustomerDirectoryError::Query { message } => {
            Error::internal(format!("customer directory error: {message}"))
        }
    }
}

pub(crate) fn map_ledger_error(error: LoanLedgerError) -> Error {
    match error {
        LoanLedgerError::Connection { message } => {
            Error::service_unavailable(format!("loan ledger unavailable: {message}"))
        }
        LoanLedgerError::Query { message } => {
            Error::internal(format!("loan ledger error: {message}"))
        }
    }
}

async fn resolve_customer(
    ports: &CodeWorkflowPorts,
    npi: &Npi,
) -> Result<Option<Customer>, Error> {
    ports
        .directory
        .find_by_npi(npi)
        .await
        .map_err(map_directory_error)
}

/// Issue a fresh code for `npi` and dispatch it to the customer.
///
/// The binding happens before dispatch so a failed `insert_if_absent` is
/// never reported as issued; a failed dispatch, by contrast, is logged and
/// swallowed.
pub(crate) async fn issue_code(
    ports: &CodeWorkflowPorts,
    config: &CodeConfig,
    npi: &Npi,
    purpose: CodePurpose,
) -> Result<CodeIssued, Error> {
    let customer = resolve_customer(ports, npi)
        .await?
        .ok_or_else(|| Error::not_found("no customer found with the given npi"))?;

    let mut bound = None;
    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let code = ports.generator.generate();
        let inserted = ports
            .code_store
            .insert_if_absent(&code, &customer.npi, config.ttl())
            .await
            .map_err(map_store_error)?;
        if inserted {
            bound = Some(code);
            break;
        }
        tracing::debug!(attempt, "verification code collision, regenerating");
    }
    let code = bound.ok_or_else(|| {
        Error::internal("verification code generation exhausted its retries")
    })?;

    let notification = Notification {
        subject: purpose.subject().to_owned(),
        body: purpose.body(&code),
        to: customer.email.clone(),
    };
    if let Err(error) = ports.notifier.send(&notification).await {
        tracing::warn!(
            code = %code.fingerprint(),
            npi = %customer.npi,
            error = %error,
            "verification code dispatch failed"
        );
    }
    tracing::info!(
        code = %code.fingerprint(),
        npi = %customer.npi,
        "verification code issued"
    );

    Ok(CodeIssued { npi: customer.npi })
}

/// Resolve a submitted code back to its customer.
///
/// Consumes the binding when one-time-use is configured; otherwise the code
/// stays redeemable until its TTL lapses.
pub(crate) async fn redeem_code(
    ports: &CodeWorkflowPorts,
    config: &CodeConfig,
    raw_code: &str,
) -> Result<Customer, Error> {
    if raw_code.trim().is_empty() {
        return Err(Error::invalid_request("code required"));
    }
    let code = VerificationCode::new(raw_code.trim())
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let bound = if config.one_time_use() {
        ports.code_store.take(&code).await
    } else {
        ports.code_store.peek(&code).await
    }
    .map_err(map_store_error)?;
    let npi = bound.ok_or_else(|| Error::invalid_code("invalid or expired code"))?;

    let customer = resolve_customer(ports, &npi).await?.ok_or_else(|| {
        tracing::warn!(
            code = %code.fingerprint(),
            npi = %npi,
            "redeemed code is bound to an unresolvable customer"
        );
        Error::not_found("customer for this code no longer exists")
            .with_details(json!({ "code": "customer_not_found" }))
    })?;

    tracing::debug!(
        code = %code.fingerprint(),
        npi = %customer.npi,
        consumed = config.one_time_use(),
        "verification code redeemed"
    );
    Ok(customer)
}
