//! # minver-store
//!
//! Windows version identifiers, the documentation-text classifier, and the
//! persisted symbol → minimum-version store.
//!
//! ## Overview
//!
//! - [`WindowsVersion`] and [`Build`] identify releases and builds; a
//!   [`Build`] packs its release into its upper bits so builds order
//!   naturally.
//! - [`classify`] turns documentation prose into an [`OsVersion`].
//! - [`read_corpus`] ingests an API reference tree into [`SymbolRecord`]s.
//! - [`SymbolStore`] persists records in a single redb file;
//!   [`MemoryStore`] offers the same lookups without a file. Both implement
//!   [`SymbolLookup`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minver_store::{SymbolLookup, SymbolStore, read_corpus};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SymbolStore::load_or_build("symbols.redb", false, || {
//!     read_corpus(Path::new("sdk-api/sdk-api-src/content"))
//! })?;
//!
//! if let Some(record) = store.lookup("KERNEL32.dll", "CreateFile2")? {
//!     println!("CreateFile2 requires {}", record.os_version());
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod corpus;
pub mod error;
pub mod memory;
pub mod record;
pub mod storage;
pub mod version;

pub use classify::{classify, describe};
pub use corpus::{CorpusEntry, is_relevant_file, read_corpus};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use record::{SymbolLookup, SymbolRecord, normalize_module_name};
pub use storage::{STORE_FORMAT_VERSION, SymbolStore};
pub use version::{Build, KNOWN_BUILDS, KnownBuild, OsVersion, ParseVersionError, WindowsVersion};
