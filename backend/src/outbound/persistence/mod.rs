//! In-memory directory and ledger adapters.
//!
//! These back local development and the test suite. A relational directory
//! and ledger live with the registry collaborator and are wired in at
//! deployment time through the same ports.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::ports::{
    CustomerDirectory, CustomerDirectoryError, LoanLedger, LoanLedgerError,
};
use crate::domain::{Customer, Loan, NewLoan, Npi};

/// In-memory implementation of the `CustomerDirectory` port, keyed by npi.
#[derive(Default)]
pub struct InMemoryCustomerDirectory {
    customers: Mutex<HashMap<String, Customer>>,
}

impl InMemoryCustomerDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-populated with the given customers.
    pub fn seeded(customers: impl IntoIterator<Item = Customer>) -> Self {
        let directory = Self::new();
        for customer in customers {
            directory.upsert(customer);
        }
        directory
    }

    /// Insert or replace a customer record.
    ///
    /// Silently ignored when the backing mutex is poisoned; the poisoned
    /// state then surfaces through the port on the next lookup.
    pub fn upsert(&self, customer: Customer) {
        if let Ok(mut customers) = self.customers.lock() {
            customers.insert(customer.npi.as_str().to_owned(), customer);
        }
    }

    /// Remove a customer record, returning whether one was present.
    pub fn remove(&self, npi: &Npi) -> bool {
        self.customers
            .lock()
            .map(|mut customers| customers.remove(npi.as_str()).is_some())
            .unwrap_or(false)
    }

    fn lock_customers(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, Customer>>, CustomerDirectoryError> {
        self.customers
            .lock()
            .map_err(|_| CustomerDirectoryError::connection("directory mutex poisoned"))
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn find_by_npi(&self, npi: &Npi) -> Result<Option<Customer>, CustomerDirectoryError> {
        let customers = self.lock_customers()?;
        Ok(customers.get(npi.as_str()).cloned())
    }
}

/// In-memory implementation of the `LoanLedger` port.
#[derive(Default)]
pub struct InMemoryLoanLedger {
    loans: Mutex<Vec<Loan>>,
}

impl InMemoryLoanLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.loans.lock().map(|loans| loans.len()).unwrap_or(0)
    }

    /// Whether the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_loans(&self) -> Result<MutexGuard<'_, Vec<Loan>>, LoanLedgerError> {
        self.loans
            .lock()
            .map_err(|_| LoanLedgerError::connection("ledger mutex poisoned"))
    }
}

#[async_trait]
impl LoanLedger for InMemoryLoanLedger {
    async fn create(&self, loan: NewLoan) -> Result<Loan, LoanLedgerError> {
        let record = Loan::from_new(Uuid::new_v4(), loan);
        let mut loans = self.lock_loans()?;
        loans.push(record.clone());
        Ok(record)
    }

    async fn find_by_creditor_npi(&self, npi: &Npi) -> Result<Vec<Loan>, LoanLedgerError> {
        let loans = self.lock_loans()?;
        Ok(loans
            .iter()
            .filter(|loan| loan.creditor_npi == *npi)
            .cloned()
            .collect())
    }

    async fn find_by_debtor(&self, debtor_id: &Uuid) -> Result<Vec<Loan>, LoanLedgerError> {
        let loans = self.lock_loans()?;
        Ok(loans
            .iter()
            .filter(|loan| loan.debtor_id == *debtor_id)
            .cloned()
            .collect())
    }

    async fn find_overdue_by_debtor(
        &self,
        debtor_id: &Uuid,
        as_of: NaiveDate,
    ) -> Result<Vec<Loan>, LoanLedgerError> {
        let loans = self.lock_loans()?;
        Ok(loans
            .iter()
            .filter(|loan| loan.debtor_id == *debtor_id && loan.is_overdue(as_of))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{EmailAddress, LoanStatus, Money, Periodicity};

    fn npi(value: &str) -> Npi {
        Npi::new(value).expect("valid npi")
    }

    fn customer(raw_npi: &str) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            npi: npi(raw_npi),
            first_name: "Awa".to_owned(),
            last_name: "Sagbo".to_owned(),
            email: EmailAddress::new("awa@example.org").expect("valid email"),
            phone_number: "22990000001".to_owned(),
            zone: "Cotonou-Nord".to_owned(),
            front_office_id: Uuid::new_v4(),
            country_code: "BJ".to_owned(),
            credit_score: 0.0,
        }
    }

    fn new_loan(debtor: &Customer, creditor_npi: &str, deadline: (i32, u32, u32)) -> NewLoan {
        NewLoan {
            debtor_id: debtor.id,
            debtor_npi: debtor.npi.clone(),
            creditor_npi: npi(creditor_npi),
            amount: Money::parse("100.00").expect("valid amount"),
            periodicity: Periodicity::Monthly,
            deadline_amount: Money::parse("110.00").expect("valid amount"),
            deadline: NaiveDate::from_ymd_opt(deadline.0, deadline.1, deadline.2)
                .expect("valid date"),
            registered_on: NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"),
        }
    }

    #[tokio::test]
    async fn directory_resolves_seeded_customers() {
        let directory = InMemoryCustomerDirectory::seeded([customer("NPI001")]);

        let found = directory.find_by_npi(&npi("NPI001")).await.expect("lookup");
        assert_eq!(
            found.map(|c| c.npi),
            Some(npi("NPI001")),
            "seeded customer must resolve",
        );
        let missing = directory.find_by_npi(&npi("NPI404")).await.expect("lookup");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn directory_remove_unregisters_customers() {
        let directory = InMemoryCustomerDirectory::seeded([customer("NPI001")]);
        assert!(directory.remove(&npi("NPI001")));
        assert!(!directory.remove(&npi("NPI001")));

        let missing = directory.find_by_npi(&npi("NPI001")).await.expect("lookup");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn ledger_assigns_ids_and_indexes_by_creditor() {
        let ledger = InMemoryLoanLedger::new();
        let debtor = customer("NPI001");

        let first = ledger
            .create(new_loan(&debtor, "NPI002", (2025, 6, 1)))
            .await
            .expect("create");
        let second = ledger
            .create(new_loan(&debtor, "NPI002", (2025, 7, 1)))
            .await
            .expect("create");
        ledger
            .create(new_loan(&debtor, "NPI003", (2025, 6, 1)))
            .await
            .expect("create");

        assert_ne!(first.id, second.id);
        assert_eq!(first.status, LoanStatus::Pending);

        let receivables = ledger
            .find_by_creditor_npi(&npi("NPI002"))
            .await
            .expect("query");
        assert_eq!(receivables.len(), 2);

        let debts = ledger.find_by_debtor(&debtor.id).await.expect("query");
        assert_eq!(debts.len(), 3);
    }

    #[tokio::test]
    async fn ledger_reports_overdue_open_loans_only() {
        let ledger = InMemoryLoanLedger::new();
        let debtor = customer("NPI001");

        ledger
            .create(new_loan(&debtor, "NPI002", (2025, 6, 1)))
            .await
            .expect("create");
        ledger
            .create(new_loan(&debtor, "NPI002", (2025, 8, 1)))
            .await
            .expect("create");

        let as_of = NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date");
        let overdue = ledger
            .find_overdue_by_debtor(&debtor.id, as_of)
            .await
            .expect("query");
        assert_eq!(overdue.len(), 1);
        assert_eq!(
            overdue.first().map(|loan| loan.deadline),
            NaiveDate::from_ymd_opt(2025, 6, 1),
        );
    }
}
