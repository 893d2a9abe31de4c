//! Domain primitives, aggregates, and workflow services.
//!
//! Purpose: implement the code-gated consultation and loan registration
//! workflows over strongly typed entities, keeping every infrastructure
//! concern behind the ports in [`ports`]. Types are immutable where
//! practical; invariants and serialisation contracts (serde) live in each
//! type's Rustdoc.

pub mod agent;
pub mod code;
pub mod config;
pub mod consultation;
pub mod customer;
pub mod error;
pub mod issuance;
pub mod loan;
pub mod loan_registration;
pub mod ports;

pub use self::agent::{
    AgentContext, AgentRole, ParseAgentRoleError, ensure_code_operator,
};
pub use self::code::{
    CodeGenerator, CodeValidationError, RandomCodeGenerator, VerificationCode,
};
pub use self::config::{
    CODE_ONE_TIME_USE_ENV, CODE_TTL_SECS_ENV, CodeConfig, CodeEnv, DefaultCodeEnv,
};
pub use self::consultation::{ConsultationService, CustomerAccountView};
pub use self::customer::{
    Customer, EmailAddress, EmailValidationError, Npi, NpiValidationError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::issuance::{CodeIssued, CodeWorkflowPorts};
pub use self::loan::{
    Loan, LoanStatus, Money, MoneyParseError, NewLoan, ParsePeriodicityError, Periodicity,
};
pub use self::loan_registration::{LoanRegistrationService, RegisterLoanCommand};

/// Convenient workflow result alias.
pub type WorkflowResult<T> = Result<T, Error>;
