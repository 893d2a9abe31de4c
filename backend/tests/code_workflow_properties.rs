//! End-to-end coverage of the code workflow guarantees.
//!
//! These tests exercise both workflow services over the real in-memory
//! adapters, observing codes the same way a customer would: from the
//! dispatched notification. Time is driven by a mutable clock so expiry
//! boundaries are exact.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use backend::domain::{
    AgentContext, CodeConfig, CodeWorkflowPorts, ConsultationService, Customer, EmailAddress,
    ErrorCode, LoanRegistrationService, LoanStatus, Npi, RandomCodeGenerator,
    RegisterLoanCommand, VerificationCode,
};
use backend::domain::ports::CodeStore;
use backend::outbound::cache::InMemoryCodeStore;
use backend::outbound::persistence::{InMemoryCustomerDirectory, InMemoryLoanLedger};
use backend::test_support::{FailingNotifier, MutableClock, RecordingNotifier};

fn npi(value: &str) -> Npi {
    Npi::new(value).expect("valid npi")
}

fn customer(raw_npi: &str, email: &str) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        npi: npi(raw_npi),
        first_name: "Awa".to_owned(),
        last_name: "Sagbo".to_owned(),
        email: EmailAddress::new(email).expect("valid email"),
        phone_number: "22990000001".to_owned(),
        zone: "Cotonou-Nord".to_owned(),
        front_office_id: Uuid::new_v4(),
        country_code: "BJ".to_owned(),
        credit_score: 0.0,
    }
}

struct Harness {
    clock: Arc<MutableClock>,
    ledger: Arc<InMemoryLoanLedger>,
    notifier: Arc<RecordingNotifier>,
    consultation: ConsultationService,
    registration: LoanRegistrationService,
}

impl Harness {
    fn new(config: CodeConfig, customers: Vec<Customer>) -> Self {
        let clock = Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0)
                .single()
                .expect("valid time"),
        ));
        let directory = Arc::new(InMemoryCustomerDirectory::seeded(customers));
        let ledger = Arc::new(InMemoryLoanLedger::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let ports = CodeWorkflowPorts::new(
            directory,
            Arc::new(InMemoryCodeStore::new(clock.clone())),
            ledger.clone(),
            notifier.clone(),
            Arc::new(RandomCodeGenerator::new()),
        );
        Self {
            consultation: ConsultationService::new(ports.clone(), config.clone()),
            registration: LoanRegistrationService::new(ports, config, clock.clone()),
            clock,
            ledger,
            notifier,
        }
    }

    /// Code carried by the most recently dispatched notification, read the
    /// way the customer would read it.
    fn last_dispatched_code(&self) -> String {
        let sent = self.notifier.sent();
        let body = &sent.last().expect("a notification was dispatched").body;
        body.split_once(": ")
            .expect("notification body carries a code")
            .1
            .to_owned()
    }
}

fn register_command(code: &str, creditor_npi: &str) -> RegisterLoanCommand {
    RegisterLoanCommand {
        code: code.to_owned(),
        amount: "100.00".to_owned(),
        periodicity: "monthly".to_owned(),
        deadline_amount: "110.00".to_owned(),
        deadline: "2025-06-01".to_owned(),
        creditor_npi: creditor_npi.to_owned(),
    }
}

#[tokio::test]
async fn registering_a_loan_end_to_end_consumes_the_code() {
    let debtor = customer("NPI001", "debtor@example.org");
    let creditor = customer("NPI002", "creditor@example.org");
    let debtor_id = debtor.id;
    let harness = Harness::new(CodeConfig::default(), vec![debtor, creditor]);
    let agent = AgentContext::field_agent();

    harness
        .registration
        .request_loan_code(&agent, &npi("NPI001"))
        .await
        .expect("issuance succeeds");
    let code = harness.last_dispatched_code();

    let loan = harness
        .registration
        .register_loan(register_command(&code, "NPI002"))
        .await
        .expect("registration succeeds");

    assert_eq!(loan.debtor_id, debtor_id);
    assert_eq!(loan.debtor_npi, npi("NPI001"));
    assert_eq!(loan.creditor_npi, npi("NPI002"));
    assert_eq!(loan.status, LoanStatus::Pending);
    assert!(!loan.verified);
    assert!(loan.solvability);
    assert_eq!(harness.ledger.len(), 1);

    // One-time use: the same code cannot authorize a second loan.
    let error = harness
        .registration
        .register_loan(register_command(&code, "NPI002"))
        .await
        .expect_err("consumed code must fail");
    assert_eq!(error.code(), ErrorCode::InvalidOrExpiredCode);
    assert_eq!(harness.ledger.len(), 1);
}

#[tokio::test]
async fn repeat_use_config_keeps_the_code_redeemable() {
    let debtor = customer("NPI001", "debtor@example.org");
    let creditor = customer("NPI002", "creditor@example.org");
    let harness = Harness::new(
        CodeConfig::default().repeat_use(),
        vec![debtor, creditor],
    );
    let agent = AgentContext::field_agent();

    harness
        .registration
        .request_loan_code(&agent, &npi("NPI001"))
        .await
        .expect("issuance succeeds");
    let code = harness.last_dispatched_code();

    for _ in 0..2 {
        harness
            .registration
            .register_loan(register_command(&code, "NPI002"))
            .await
            .expect("repeat-use registration succeeds");
    }
    assert_eq!(harness.ledger.len(), 2);
}

#[tokio::test]
async fn codes_lapse_exactly_at_the_ttl() {
    let subject = customer("NPI001", "subject@example.org");
    let harness = Harness::new(
        CodeConfig::with_ttl(Duration::from_secs(600)),
        vec![subject],
    );
    let agent = AgentContext::field_agent();

    harness
        .consultation
        .request_consultation_code(&agent, &npi("NPI001"))
        .await
        .expect("issuance succeeds");
    let first_code = harness.last_dispatched_code();

    harness.clock.advance(Duration::from_secs(599));
    let view = harness
        .consultation
        .redeem_consultation_code(&first_code)
        .await
        .expect("redemption inside the ttl succeeds");
    assert_eq!(view.customer.npi, npi("NPI001"));

    harness
        .consultation
        .request_consultation_code(&agent, &npi("NPI001"))
        .await
        .expect("issuance succeeds");
    let second_code = harness.last_dispatched_code();

    harness.clock.advance(Duration::from_secs(601));
    let error = harness
        .consultation
        .redeem_consultation_code(&second_code)
        .await
        .expect_err("redemption past the ttl fails");
    assert_eq!(error.code(), ErrorCode::InvalidOrExpiredCode);
}

#[tokio::test]
async fn redemption_resolves_the_issuing_subject() {
    let first = customer("NPI001", "first@example.org");
    let second = customer("NPI002", "second@example.org");
    let harness = Harness::new(CodeConfig::default(), vec![first, second]);
    let agent = AgentContext::field_agent();

    harness
        .consultation
        .request_consultation_code(&agent, &npi("NPI001"))
        .await
        .expect("issuance succeeds");
    let first_code = harness.last_dispatched_code();

    harness
        .consultation
        .request_consultation_code(&agent, &npi("NPI002"))
        .await
        .expect("issuance succeeds");
    let second_code = harness.last_dispatched_code();

    let second_view = harness
        .consultation
        .redeem_consultation_code(&second_code)
        .await
        .expect("redemption succeeds");
    assert_eq!(second_view.customer.npi, npi("NPI002"));

    let first_view = harness
        .consultation
        .redeem_consultation_code(&first_code)
        .await
        .expect("redemption succeeds");
    assert_eq!(first_view.customer.npi, npi("NPI001"));
}

#[tokio::test]
async fn consultation_view_lists_receivables_owed_to_the_customer() {
    let debtor = customer("NPI001", "debtor@example.org");
    let creditor = customer("NPI002", "creditor@example.org");
    let harness = Harness::new(CodeConfig::default(), vec![debtor, creditor]);
    let agent = AgentContext::field_agent();

    harness
        .registration
        .request_loan_code(&agent, &npi("NPI001"))
        .await
        .expect("issuance succeeds");
    let loan_code = harness.last_dispatched_code();
    harness
        .registration
        .register_loan(register_command(&loan_code, "NPI002"))
        .await
        .expect("registration succeeds");

    harness
        .consultation
        .request_consultation_code(&agent, &npi("NPI002"))
        .await
        .expect("issuance succeeds");
    let consult_code = harness.last_dispatched_code();

    let view = harness
        .consultation
        .redeem_consultation_code(&consult_code)
        .await
        .expect("redemption succeeds");
    assert_eq!(view.customer.npi, npi("NPI002"));
    assert_eq!(view.receivables.len(), 1);
    assert_eq!(
        view.receivables.first().map(|loan| loan.debtor_npi.clone()),
        Some(npi("NPI001")),
    );
}

#[tokio::test]
async fn self_loans_are_rejected_regardless_of_field_validity() {
    let subject = customer("NPI001", "subject@example.org");
    let harness = Harness::new(CodeConfig::default(), vec![subject]);
    let agent = AgentContext::field_agent();

    harness
        .registration
        .request_loan_code(&agent, &npi("NPI001"))
        .await
        .expect("issuance succeeds");
    let code = harness.last_dispatched_code();

    let error = harness
        .registration
        .register_loan(register_command(&code, "NPI001"))
        .await
        .expect_err("self loan must fail");
    assert_eq!(error.code(), ErrorCode::SelfLoanNotAllowed);
    assert!(harness.ledger.is_empty());
}

#[tokio::test]
async fn periodicity_outside_the_closed_set_registers_nothing() {
    let debtor = customer("NPI001", "debtor@example.org");
    let creditor = customer("NPI002", "creditor@example.org");
    let harness = Harness::new(CodeConfig::default(), vec![debtor, creditor]);
    let agent = AgentContext::field_agent();

    harness
        .registration
        .request_loan_code(&agent, &npi("NPI001"))
        .await
        .expect("issuance succeeds");
    let code = harness.last_dispatched_code();

    let command = RegisterLoanCommand {
        periodicity: "yearly".to_owned(),
        ..register_command(&code, "NPI002")
    };
    let error = harness
        .registration
        .register_loan(command)
        .await
        .expect_err("unknown periodicity must fail");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(harness.ledger.is_empty());

    // The code was never redeemed by the failed attempt and still works.
    harness
        .registration
        .register_loan(register_command(&code, "NPI002"))
        .await
        .expect("valid periodicity succeeds");
    assert_eq!(harness.ledger.len(), 1);
}

#[tokio::test]
async fn dispatch_failure_still_issues_a_retrievable_code() {
    use backend::test_support::ScriptedCodeGenerator;

    let subject = customer("NPI001", "subject@example.org");
    let clock = Arc::new(MutableClock::new(
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0)
            .single()
            .expect("valid time"),
    ));
    let store = Arc::new(InMemoryCodeStore::new(clock.clone()));
    let ports = CodeWorkflowPorts::new(
        Arc::new(InMemoryCustomerDirectory::seeded([subject])),
        store.clone(),
        Arc::new(InMemoryLoanLedger::new()),
        Arc::new(FailingNotifier),
        Arc::new(ScriptedCodeGenerator::new(["feedc0de00000001"])),
    );
    let service = ConsultationService::new(ports, CodeConfig::default());

    service
        .request_consultation_code(&AgentContext::field_agent(), &npi("NPI001"))
        .await
        .expect("issuance reports success despite the failed dispatch");

    let code = VerificationCode::new("feedc0de00000001").expect("valid code");
    let bound = store.peek(&code).await.expect("peek");
    assert_eq!(bound, Some(npi("NPI001")));
}
