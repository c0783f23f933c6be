// crates/attestguard-store/src/store.rs
// ============================================================================
// Module: Postgres Store
// Description: Connection pool, schema migration, and advisory-lock lease (C6).
// Purpose: Durable multi-table persistence for applications, profiles, tasks.
// Dependencies: postgres, r2d2, r2d2_postgres
// ============================================================================

//! ## Overview
//! Grounded directly on `decision-gate-store-enterprise::postgres_store`'s
//! `r2d2`/`r2d2_postgres`/`postgres` stack: a pooled connection manager, a
//! `migrate()` called once from `new()`, and a background-thread `Drop` so
//! pool teardown never blocks the caller. Table-specific operations live in
//! sibling modules (`apps`, `profiles`, `tasks`) as `impl PostgresStore`
//! blocks over this same type.

use std::time::Duration;

use postgres::NoTls;
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;

use crate::config::PostgresStoreConfig;
use crate::error::StoreError;

/// Postgres-backed store implementing the `apps`, `profiles`, and
/// `verification_tasks` tables (spec.md §4.6).
pub struct PostgresStore {
    pub(crate) pool: Option<Pool<PostgresConnectionManager<NoTls>>>,
}

impl Drop for PostgresStore {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            let _ = std::thread::spawn(move || drop(pool));
        }
    }
}

impl PostgresStore {
    /// Creates a new Postgres store and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the connection string is invalid or
    /// the pool/migration fails.
    pub fn new(config: &PostgresStoreConfig) -> Result<Self, StoreError> {
        let mut pg_config = config
            .connection
            .parse::<postgres::Config>()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        pg_config.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
        let options = format!("-c statement_timeout={}", config.statement_timeout_ms);
        pg_config.options(&options);
        let manager = PostgresConnectionManager::new(pg_config, NoTls);
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .build(manager)
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let store = Self {
            pool: Some(pool),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Ensures schema and indices exist.
    fn migrate(&self) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        conn.batch_execute(crate::schema::MIGRATIONS).map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(())
    }

    /// Borrows a pooled connection.
    pub(crate) fn connection(
        &self,
    ) -> Result<r2d2::PooledConnection<PostgresConnectionManager<NoTls>>, StoreError> {
        self.pool
            .as_ref()
            .ok_or_else(|| StoreError::Io("store closed".to_string()))?
            .get()
            .map_err(|err| StoreError::Io(err.to_string()))
    }

    /// Tries to acquire a session-scoped advisory lock keyed by a stable hash
    /// of `name`, returning `true` when the lock was granted.
    ///
    /// Used by `attestguard-sync` (C9) to ensure at most one cron tick of a
    /// given name runs at a time across a multi-instance deployment, per
    /// spec.md §4.9/§9 "Cron lease" (resolved here with a Postgres advisory
    /// lock rather than a Redis-backed lease; see DESIGN.md).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the lock query fails.
    pub fn try_acquire_lease(&self, name: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection()?;
        let key = lease_key(name);
        let row = conn
            .query_one("SELECT pg_try_advisory_lock($1)", &[&key])
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(row.get(0))
    }

    /// Releases a lease previously acquired with [`Self::try_acquire_lease`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the unlock query fails.
    pub fn release_lease(&self, name: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let key = lease_key(name);
        conn.execute("SELECT pg_advisory_unlock($1)", &[&key])
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(())
    }
}

/// Derives a stable 64-bit advisory-lock key from a cron lease name.
fn lease_key(name: &str) -> i64 {
    let digest = attestguard_core::hashing::sha256_hex(name.as_bytes());
    let prefix = &digest[.. 16];
    let value = u64::from_str_radix(prefix, 16).unwrap_or(0);
    i64::from_ne_bytes(value.to_ne_bytes())
}

#[cfg(test)]
mod tests {
    use super::lease_key;

    #[test]
    fn lease_key_is_stable_for_same_name() {
        assert_eq!(lease_key("profile-sync"), lease_key("profile-sync"));
        assert_ne!(lease_key("profile-sync"), lease_key("app-sync"));
    }
}
