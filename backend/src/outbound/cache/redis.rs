//! Redis-backed code store.
//!
//! Uses a `bb8-redis` connection pool. Atomicity comes from the server:
//! `SET NX EX` is the single-step check-and-set behind `insert_if_absent`,
//! `GETDEL` the single-step consume behind `take`, and the TTL rides on the
//! key itself so expiry needs no sweeping on our side.
//!
//! Keys are namespaced (`code:v1:<code>`) so a format change can roll out
//! without clashing with bindings written by an older release.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::bb8::Pool;
use bb8_redis::{RedisConnectionManager, redis};

use crate::domain::ports::{CodeStore, CodeStoreError};
use crate::domain::{Npi, VerificationCode};

/// Key namespace prefix, versioned for forward-compatible invalidation.
const KEY_NAMESPACE: &str = "code:v1";

/// Redis implementation of the `CodeStore` port.
pub struct RedisCodeStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCodeStore {
    /// Connect a pooled store to the Redis instance at `url`.
    ///
    /// ```rust,no_run
    /// # use backend::outbound::cache::RedisCodeStore;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = RedisCodeStore::connect("redis://localhost:6379").await?;
    /// # let _ = store;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self, CodeStoreError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|err| CodeStoreError::backend(err.to_string()))?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(|err| CodeStoreError::backend(err.to_string()))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool, for deployments sharing one pool across
    /// adapters.
    pub fn from_pool(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }

    fn key(code: &VerificationCode) -> String {
        format!("{KEY_NAMESPACE}:{code}")
    }

    fn decode(value: Option<String>) -> Result<Option<Npi>, CodeStoreError> {
        value
            .map(|raw| Npi::new(raw).map_err(|err| CodeStoreError::corrupt(err.to_string())))
            .transpose()
    }
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    async fn insert_if_absent(
        &self,
        code: &VerificationCode,
        npi: &Npi,
        ttl: Duration,
    ) -> Result<bool, CodeStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CodeStoreError::backend(err.to_string()))?;
        // SET .. NX EX replies OK on success and nil when the key is taken.
        let reply: Option<String> = redis::cmd("SET")
            .arg(Self::key(code))
            .arg(npi.as_str())
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut *conn)
            .await
            .map_err(|err| CodeStoreError::backend(err.to_string()))?;
        Ok(reply.is_some())
    }

    async fn peek(&self, code: &VerificationCode) -> Result<Option<Npi>, CodeStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CodeStoreError::backend(err.to_string()))?;
        let value: Option<String> = redis::cmd("GET")
            .arg(Self::key(code))
            .query_async(&mut *conn)
            .await
            .map_err(|err| CodeStoreError::backend(err.to_string()))?;
        Self::decode(value)
    }

    async fn take(&self, code: &VerificationCode) -> Result<Option<Npi>, CodeStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CodeStoreError::backend(err.to_string()))?;
        let value: Option<String> = redis::cmd("GETDEL")
            .arg(Self::key(code))
            .query_async(&mut *conn)
            .await
            .map_err(|err| CodeStoreError::backend(err.to_string()))?;
        Self::decode(value)
    }
}
