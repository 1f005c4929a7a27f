/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Durable single-record storage for the active tenant.

use std::collections::HashMap;

/// Key of the one record the session reads, writes and deletes.
pub const TENANT_RECORD_KEY: &str = "tenant_identifier";

/// Errors from a tenant store backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Io(String),
    Backend(String),
    Corrupt(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {e}"),
            StoreError::Backend(e) => write!(f, "Store backend error: {e}"),
            StoreError::Corrupt(e) => write!(f, "Corrupt record: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// String key-value persistence.
///
/// The session owns the store and is its only writer; implementations stay
/// passive and never call back into the session.
pub trait TenantStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<T: TenantStore + ?Sized> TenantStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// Process-lifetime store. Used for ephemeral runs and as the test fake.
#[derive(Debug, Default, Clone)]
pub struct MemoryTenantStore {
    records: HashMap<String, String>,
    #[cfg(any(test, feature = "test-utils"))]
    failures: StoreFailures,
}

/// Which operations a [`MemoryTenantStore`] should fail.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreFailures {
    pub get: bool,
    pub set: bool,
    pub delete: bool,
}

#[cfg(any(test, feature = "test-utils"))]
impl StoreFailures {
    pub fn all() -> Self {
        Self {
            get: true,
            set: true,
            delete: true,
        }
    }
}

impl MemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a tenant record, as if left by a previous run.
    pub fn with_tenant(tenant: &str) -> Self {
        let mut store = Self::default();
        store
            .records
            .insert(TENANT_RECORD_KEY.to_string(), tenant.to_string());
        store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn failing(mut self, failures: StoreFailures) -> Self {
        self.failures = failures;
        self
    }
}

#[cfg(any(test, feature = "test-utils"))]
fn injected(enabled: bool, op: &str) -> Result<(), StoreError> {
    if enabled {
        return Err(StoreError::Io(format!("injected {op} failure")));
    }
    Ok(())
}

impl TenantStore for MemoryTenantStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        #[cfg(any(test, feature = "test-utils"))]
        injected(self.failures.get, "get")?;
        Ok(self.records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        #[cfg(any(test, feature = "test-utils"))]
        injected(self.failures.set, "set")?;
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        #[cfg(any(test, feature = "test-utils"))]
        injected(self.failures.delete, "delete")?;
        self.records.remove(key);
        Ok(())
    }
}
