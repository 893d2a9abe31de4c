//! Process-local code store.
//!
//! Bindings live in a mutex-guarded map; expiry is evaluated lazily at each
//! read against the injected clock, so no background sweep is required for
//! correctness. Entries found expired during a read are dropped on the spot,
//! and [`InMemoryCodeStore::purge_expired`] offers an optional sweep for
//! memory hygiene on long-lived processes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{CodeStore, CodeStoreError};
use crate::domain::{Npi, VerificationCode};

#[derive(Debug, Clone)]
struct StoredBinding {
    npi: Npi,
    expires_at: DateTime<Utc>,
}

impl StoredBinding {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// In-memory implementation of the `CodeStore` port.
///
/// Safe for concurrent use from independent request-handling units: every
/// operation holds the map lock for its full check-and-mutate sequence, so
/// `insert_if_absent` and `take` are atomic per code.
pub struct InMemoryCodeStore {
    entries: Mutex<HashMap<String, StoredBinding>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCodeStore {
    /// Create a store reading time from the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Create a store on the system clock.
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(DefaultClock))
    }

    /// Drop every lapsed binding and return how many were removed.
    ///
    /// Optional housekeeping; reads already ignore lapsed entries.
    pub fn purge_expired(&self) -> Result<usize, CodeStoreError> {
        let now = self.clock.utc();
        let mut entries = self.lock_entries()?;
        let before = entries.len();
        entries.retain(|_, binding| binding.is_live(now));
        Ok(before - entries.len())
    }

    fn lock_entries(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, StoredBinding>>, CodeStoreError> {
        self.entries
            .lock()
            .map_err(|_| CodeStoreError::backend("code store mutex poisoned"))
    }

    fn expiry_from(&self, ttl: Duration) -> Result<DateTime<Utc>, CodeStoreError> {
        let delta = TimeDelta::from_std(ttl)
            .map_err(|_| CodeStoreError::backend("code ttl exceeds representable range"))?;
        Ok(self.clock.utc() + delta)
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn insert_if_absent(
        &self,
        code: &VerificationCode,
        npi: &Npi,
        ttl: Duration,
    ) -> Result<bool, CodeStoreError> {
        let expires_at = self.expiry_from(ttl)?;
        let now = self.clock.utc();
        let mut entries = self.lock_entries()?;
        if entries
            .get(code.as_str())
            .is_some_and(|binding| binding.is_live(now))
        {
            return Ok(false);
        }
        entries.insert(
            code.as_str().to_owned(),
            StoredBinding {
                npi: npi.clone(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn peek(&self, code: &VerificationCode) -> Result<Option<Npi>, CodeStoreError> {
        let now = self.clock.utc();
        let mut entries = self.lock_entries()?;
        let live = entries
            .get(code.as_str())
            .filter(|binding| binding.is_live(now))
            .map(|binding| binding.npi.clone());
        if live.is_none() {
            // Lapsed or never bound; drop any leftover so the map does not
            // accumulate dead codes.
            entries.remove(code.as_str());
        }
        Ok(live)
    }

    async fn take(&self, code: &VerificationCode) -> Result<Option<Npi>, CodeStoreError> {
        let now = self.clock.utc();
        let mut entries = self.lock_entries()?;
        match entries.remove(code.as_str()) {
            Some(binding) if binding.is_live(now) => Ok(Some(binding.npi)),
            _ => Ok(None),
        }
    }
}
