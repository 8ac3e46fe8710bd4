//! redb-backed symbol store.
//!
//! The store is a single database file with one table keyed by
//! `(module, symbol)` and a metadata table. It is written once by
//! [`SymbolStore::rebuild`] and read-only afterwards.
//!
//! Rebuilds never modify the destination in place: records are written into
//! a staging file next to it under one write transaction, and the staging
//! file is renamed over the destination only after the commit succeeds. A
//! failed rebuild leaves the destination untouched and the staging file is
//! removed when its guard drops.

use std::path::{Path, PathBuf};

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::record::{SymbolLookup, SymbolRecord, normalize_module_name};
use crate::version::{Build, WindowsVersion};

/// Symbols table: `(module, symbol)` -> `(api_type, min_version, min_build)`.
const SYMBOLS_TABLE: TableDefinition<(&str, &str), (&str, i32, i32)> =
    TableDefinition::new("symbols");

/// Metadata table: stores store-wide metadata.
const METADATA_TABLE: TableDefinition<&str, &str> = TableDefinition::new("metadata");

/// Current on-disk format. Bump when the table layout changes.
pub const STORE_FORMAT_VERSION: u32 = 1;

const FORMAT_VERSION_KEY: &str = "format_version";
const RECORD_COUNT_KEY: &str = "record_count";

/// Persistent symbol store using redb.
pub struct SymbolStore {
    db: Database,
    path: PathBuf,
}

impl SymbolStore {
    /// Open an existing store file.
    ///
    /// Fails with [`StoreError::NotFound`] if the file does not exist and
    /// with [`StoreError::FormatMismatch`] if it was written in another format.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }

        let db = Database::open(path)?;
        let store = Self {
            db,
            path: path.to_path_buf(),
        };

        let found = store.format_version()?.unwrap_or_default();
        if found != STORE_FORMAT_VERSION.to_string() {
            return Err(StoreError::FormatMismatch {
                expected: STORE_FORMAT_VERSION,
                found,
            });
        }

        debug!(
            path = %path.display(),
            records = store.len()?,
            "opened symbol store"
        );

        Ok(store)
    }

    /// Build a new store at `path` from `records`, replacing any existing file.
    ///
    /// Records with an empty module or symbol name are skipped. When the same
    /// `(module, symbol)` appears more than once, the first record is kept.
    pub fn rebuild(
        path: impl AsRef<Path>,
        records: impl IntoIterator<Item = SymbolRecord>,
    ) -> StoreResult<Self> {
        let path = path.as_ref();
        let dest_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dest_dir)?;

        // Removed on drop unless persisted
        let staging = tempfile::Builder::new()
            .prefix(".minver-store-")
            .suffix(".tmp")
            .tempfile_in(dest_dir)?;

        debug!(staging = %staging.path().display(), "writing symbol store");

        let written = {
            let db = Database::create(staging.path())?;
            write_records(&db, records)?
        };

        staging
            .persist(path)
            .map_err(|err| StoreError::Io(err.error))?;

        info!(path = %path.display(), records = written, "built symbol store");

        Self::open(path)
    }

    /// Open the store at `path`, or build it from `source` when it is missing
    /// or `force` is set.
    pub fn load_or_build<F>(path: impl AsRef<Path>, force: bool, source: F) -> StoreResult<Self>
    where
        F: FnOnce() -> StoreResult<Vec<SymbolRecord>>,
    {
        let path = path.as_ref();
        if !force {
            match Self::open(path) {
                Ok(store) => return Ok(store),
                Err(StoreError::NotFound(_)) => {
                    debug!(path = %path.display(), "no symbol store, building");
                }
                Err(err) => return Err(err),
            }
        }

        Self::rebuild(path, source()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored records.
    pub fn len(&self) -> StoreResult<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SYMBOLS_TABLE)?;
        Ok(table.len()? as usize)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Stored format version, `None` for a database without a metadata table.
    fn format_version(&self) -> StoreResult<Option<String>> {
        match self.get_metadata(FORMAT_VERSION_KEY) {
            Err(StoreError::MissingTable) => Ok(None),
            other => other,
        }
    }

    /// Get a metadata value.
    pub fn get_metadata(&self, key: &str) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(METADATA_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Err(StoreError::MissingTable),
            Err(err) => return Err(err.into()),
        };

        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }
}

impl SymbolLookup for SymbolStore {
    fn lookup(&self, module: &str, symbol: &str) -> StoreResult<Option<SymbolRecord>> {
        let module = normalize_module_name(module);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SYMBOLS_TABLE)?;

        let Some(value) = table.get((module.as_str(), symbol))? else {
            return Ok(None);
        };
        let (api_type, min_version, min_build) = value.value();

        Ok(Some(SymbolRecord {
            module,
            symbol: symbol.to_string(),
            api_type: api_type.to_string(),
            min_version: WindowsVersion::from_i32(min_version).unwrap_or_default(),
            min_build: Build::from_raw(min_build),
        }))
    }
}

impl std::fmt::Debug for SymbolStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Write every storable record and the metadata in one transaction.
fn write_records(
    db: &Database,
    records: impl IntoIterator<Item = SymbolRecord>,
) -> StoreResult<u64> {
    let write_txn = db.begin_write()?;
    let written = {
        let mut table = write_txn.open_table(SYMBOLS_TABLE)?;
        let mut skipped = 0usize;

        for record in records {
            if !record.is_storable() {
                skipped += 1;
                continue;
            }
            let key = (record.module.as_str(), record.symbol.as_str());
            if table.get(key)?.is_some() {
                skipped += 1;
                continue;
            }
            table.insert(
                key,
                (
                    record.api_type.as_str(),
                    record.min_version.as_i32(),
                    record.min_build.raw(),
                ),
            )?;
        }

        debug!(skipped, "skipped empty or duplicate records");
        table.len()?
    };
    {
        let mut metadata = write_txn.open_table(METADATA_TABLE)?;
        metadata.insert(FORMAT_VERSION_KEY, STORE_FORMAT_VERSION.to_string().as_str())?;
        metadata.insert(RECORD_COUNT_KEY, written.to_string().as_str())?;
    }
    write_txn.commit()?;

    Ok(written)
}
