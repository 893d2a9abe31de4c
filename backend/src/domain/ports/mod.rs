//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the ephemeral code store, the customer directory, the loan ledger, the
//! notification dispatcher). Each trait exposes strongly typed errors so
//! adapters map their failures into predictable variants instead of
//! returning `anyhow::Result`.

mod code_store;
mod customer_directory;
mod loan_ledger;
mod notifier;

#[cfg(test)]
pub use code_store::MockCodeStore;
pub use code_store::{CodeStore, CodeStoreError};
#[cfg(test)]
pub use customer_directory::MockCustomerDirectory;
pub use customer_directory::{CustomerDirectory, CustomerDirectoryError};
#[cfg(test)]
pub use loan_ledger::MockLoanLedger;
pub use loan_ledger::{LoanLedger, LoanLedgerError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{FixtureNotifier, Notification, Notifier, NotifierError};
