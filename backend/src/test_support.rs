//! Shared test doubles for the code workflow test suites.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{Notification, Notifier, NotifierError};
use crate::domain::{CodeGenerator, VerificationCode};

/// Clock test double that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *self.lock_clock() += delta;
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Generator handing out a scripted sequence of codes.
///
/// Panics when the script runs dry; size the script to the test.
pub struct ScriptedCodeGenerator(Mutex<VecDeque<VerificationCode>>);

impl ScriptedCodeGenerator {
    /// Script the generator with the given code texts.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes = codes
            .into_iter()
            .map(|code| match VerificationCode::new(code) {
                Ok(code) => code,
                Err(error) => panic!("scripted code invalid: {error}"),
            })
            .collect();
        Self(Mutex::new(codes))
    }
}

impl CodeGenerator for ScriptedCodeGenerator {
    fn generate(&self) -> VerificationCode {
        let mut codes = match self.0.lock() {
            Ok(codes) => codes,
            Err(_) => panic!("generator mutex"),
        };
        match codes.pop_front() {
            Some(code) => code,
            None => panic!("scripted code generator ran dry"),
        }
    }
}

/// Notifier recording every dispatched message.
#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<Notification>>);

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages dispatched so far.
    pub fn sent(&self) -> Vec<Notification> {
        match self.0.lock() {
            Ok(sent) => sent.clone(),
            Err(_) => panic!("notifier mutex"),
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifierError> {
        match self.0.lock() {
            Ok(mut sent) => sent.push(notification.clone()),
            Err(_) => panic!("notifier mutex"),
        }
        Ok(())
    }
}

/// Notifier whose every dispatch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifierError> {
        Err(NotifierError::delivery("scripted delivery failure"))
    }
}
