//! Port abstraction for out-of-band notification dispatch.
//!
//! Dispatch is best-effort from the workflows' perspective: its result is
//! observed only for logging, never for control flow, so a broken delivery
//! channel cannot fail an issuance or reveal which customers are reachable.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::EmailAddress;

/// Errors surfaced by dispatcher adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifierError {
    /// The message could not be handed to the delivery channel.
    #[error("notification delivery failed: {message}")]
    Delivery {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl NotifierError {
    /// Helper for delivery failures.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

/// Message handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Subject line.
    pub subject: String,
    /// Message body; carries the raw verification code.
    pub body: String,
    /// Recipient contact channel.
    pub to: EmailAddress,
}

/// Outbound dispatch port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a single message.
    async fn send(&self, notification: &Notification) -> Result<(), NotifierError>;
}

/// Fixture implementation that accepts and discards every message.
///
/// Use it in tests where dispatch behaviour is not under test.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureNotifier;

#[async_trait]
impl Notifier for FixtureNotifier {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifierError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_notifier_accepts_messages() {
        let notifier = FixtureNotifier;
        let notification = Notification {
            subject: "subject".to_owned(),
            body: "body".to_owned(),
            to: crate::domain::EmailAddress::new("user@example.org").expect("valid email"),
        };
        notifier
            .send(&notification)
            .await
            .expect("fixture notifier should accept messages");
    }
}
