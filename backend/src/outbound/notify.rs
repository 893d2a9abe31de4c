//! Logging notification adapter.
//!
//! Stands in where no delivery channel is wired up (local development,
//! staging without SMTP credentials). The message body carries the raw
//! verification code, so it is deliberately NOT logged; only the subject and
//! recipient are.

use async_trait::async_trait;

use crate::domain::ports::{Notification, Notifier, NotifierError};

/// Notifier that records dispatches on the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a new logging notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifierError> {
        tracing::info!(
            subject = %notification.subject,
            to = %notification.to,
            "notification dispatched to log sink"
        );
        Ok(())
    }
}
