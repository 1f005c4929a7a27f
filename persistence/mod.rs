/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tenant record persistence backed by redb.
//!
//! One table, string keys to string values. The session only ever touches
//! [`tenantshell_core::TENANT_RECORD_KEY`], but the store itself is generic
//! over keys so the record layout can grow without a migration.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use redb::{ReadableDatabase, ReadableTable, TableDefinition, TableError};
use tenantshell_core::{MemoryTenantStore, StoreError, TenantStore};

const TENANT_TABLE: TableDefinition<&str, &str> = TableDefinition::new("tenant_records");
const DATABASE_FILE: &str = "tenant.redb";

/// Durable tenant store in `<base_dir>/tenant.redb`.
pub struct RedbTenantStore {
    db: redb::Database,
    path: PathBuf,
}

impl RedbTenantStore {
    /// Open or create the store under `base_dir`.
    pub fn open(base_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(base_dir)
            .map_err(|e| StoreError::Io(format!("Failed to create dir: {e}")))?;

        let path = base_dir.join(DATABASE_FILE);
        let db = redb::Database::create(&path)
            .map_err(|e| StoreError::Backend(format!("{e}")))?;
        debug!("Opened tenant store at {}", path.display());

        Ok(Self { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<platform data dir>/tenantshell`, if the platform has one.
    pub fn default_data_dir() -> Option<PathBuf> {
        let mut dir = dirs::data_dir()?;
        dir.push("tenantshell");
        Some(dir)
    }
}

impl TenantStore for RedbTenantStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Backend(format!("{e}")))?;
        let table = match read_txn.open_table(TENANT_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(StoreError::Backend(format!("{e}"))),
        };
        let value = table
            .get(key)
            .map_err(|e| StoreError::Backend(format!("{e}")))?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Backend(format!("{e}")))?;
        {
            let mut table = write_txn
                .open_table(TENANT_TABLE)
                .map_err(|e| StoreError::Backend(format!("{e}")))?;
            table
                .insert(key, value)
                .map_err(|e| StoreError::Backend(format!("{e}")))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Backend(format!("{e}")))?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Backend(format!("{e}")))?;
        {
            let mut table = write_txn
                .open_table(TENANT_TABLE)
                .map_err(|e| StoreError::Backend(format!("{e}")))?;
            table
                .remove(key)
                .map_err(|e| StoreError::Backend(format!("{e}")))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Backend(format!("{e}")))?;
        Ok(())
    }
}

/// Pick the store for this run.
///
/// Ephemeral runs, hosts without a data directory, and stores that fail to
/// open all get an in-memory store; the shell still works, it just forgets
/// the tenant on exit.
pub fn open_tenant_store(data_dir: Option<&Path>, ephemeral: bool) -> Box<dyn TenantStore> {
    if ephemeral {
        debug!("Ephemeral run; tenant record kept in memory");
        return Box::new(MemoryTenantStore::new());
    }

    let Some(dir) = data_dir
        .map(Path::to_path_buf)
        .or_else(RedbTenantStore::default_data_dir)
    else {
        warn!("No data directory available; tenant record kept in memory");
        return Box::new(MemoryTenantStore::new());
    };

    match RedbTenantStore::open(&dir) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(
                "Failed to open tenant store in {}: {e}. Tenant record kept in memory.",
                dir.display()
            );
            Box::new(MemoryTenantStore::new())
        },
    }
}
