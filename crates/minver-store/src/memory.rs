//! In-memory symbol store.

use rustc_hash::FxHashMap;

use crate::error::StoreResult;
use crate::record::{SymbolLookup, SymbolRecord, normalize_module_name};

/// Symbol store held entirely in memory.
///
/// Used for tests and for one-shot runs that do not persist a store file.
/// Same semantics as the persisted store: first insert wins.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: FxHashMap<(String, String), SymbolRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = SymbolRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert a record. Returns `false` if it was skipped.
    pub fn insert(&mut self, record: SymbolRecord) -> bool {
        if !record.is_storable() {
            return false;
        }
        let key = (record.module.clone(), record.symbol.clone());
        if self.records.contains_key(&key) {
            return false;
        }
        self.records.insert(key, record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SymbolLookup for MemoryStore {
    fn lookup(&self, module: &str, symbol: &str) -> StoreResult<Option<SymbolRecord>> {
        let key = (normalize_module_name(module), symbol.to_string());
        Ok(self.records.get(&key).cloned())
    }
}
