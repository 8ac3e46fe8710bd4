//! Ingestion of API reference documentation.
//!
//! Each API page of the Windows SDK reference is a Markdown file whose YAML
//! front matter names the exporting DLL and the minimum client version.
//! Only function (`nf-*`) and interface (`nn-*`) pages are read.
//!
//! ```yaml
//! ---
//! UID: NF:fileapi.CreateFile2
//! req.dll: Kernel32.dll
//! req.target-min-winverclnt: Windows 8 [desktop apps | UWP apps]
//! api_type:
//!  - DllExport
//! api_location:
//!  - Kernel32.dll
//! api_name:
//!  - CreateFile2
//! ---
//! ```

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::classify::classify;
use crate::error::{StoreError, StoreResult};
use crate::record::SymbolRecord;

const DLL_EXPORT: &str = "DllExport";

/// Front matter fields of one API reference page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CorpusEntry {
    #[serde(rename = "UID", default)]
    pub uid: Option<String>,

    #[serde(rename = "req.dll", default)]
    pub dll: Option<String>,

    #[serde(rename = "req.target-min-winverclnt", default)]
    pub min_client_version: Option<String>,

    #[serde(rename = "req.target-min-winversvr", default)]
    pub min_server_version: Option<String>,

    #[serde(rename = "api_type", default, deserialize_with = "string_list")]
    pub api_types: Vec<String>,

    #[serde(rename = "api_location", default, deserialize_with = "string_list")]
    pub api_locations: Vec<String>,

    #[serde(rename = "api_name", default, deserialize_with = "string_list")]
    pub api_names: Vec<String>,
}

impl CorpusEntry {
    /// Parse the front matter of a page. Pages without front matter yield `None`.
    pub fn parse(content: &str) -> Result<Option<Self>, String> {
        let Some(yaml) = front_matter(content) else {
            return Ok(None);
        };

        serde_saphyr::from_str(yaml)
            .map(Some)
            .map_err(|e| format!("Failed to parse YAML front matter: {}", e))
    }

    /// DLL the symbol is exported from: `req.dll`, else the first `.dll` location.
    pub fn dll_name(&self) -> Option<&str> {
        self.dll
            .as_deref()
            .map(str::trim)
            .filter(|dll| !dll.is_empty())
            .or_else(|| {
                self.api_locations
                    .iter()
                    .map(|location| location.trim())
                    .find(|location| location.ends_with(".dll"))
            })
    }

    /// Whether the page documents a DLL export.
    pub fn is_relevant(&self) -> bool {
        self.api_types.iter().any(|t| t.trim() == DLL_EXPORT) && self.dll_name().is_some()
    }

    /// Convert to a store record, classifying the minimum client version.
    pub fn to_record(&self) -> SymbolRecord {
        let version = classify(self.min_client_version.as_deref().unwrap_or_default());

        SymbolRecord::new(
            self.dll_name().unwrap_or_default(),
            first_trimmed(&self.api_names),
            first_trimmed(&self.api_types),
            version,
        )
    }
}

/// Whether `path` names a function or interface reference page.
pub fn is_relevant_file(path: &Path) -> bool {
    let is_markdown = path.extension().is_some_and(|ext| ext == "md");
    let is_api_page = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("nf-") || name.starts_with("nn-"));

    is_markdown && is_api_page
}

/// Read every relevant record under `dir`.
///
/// Files are parsed in parallel; the returned records keep the sorted path
/// order so that first-wins deduplication in the store is deterministic.
/// Any malformed front matter aborts the read.
pub fn read_corpus(dir: &Path) -> StoreResult<Vec<SymbolRecord>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| StoreError::Corpus {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
            reason: e.to_string(),
        })?;
        if entry.file_type().is_file() && is_relevant_file(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    debug!(dir = %dir.display(), files = paths.len(), "reading API reference pages");

    let parsed = paths
        .par_iter()
        .map(|path| read_entry(path))
        .collect::<StoreResult<Vec<_>>>()?;

    let records: Vec<SymbolRecord> = parsed
        .into_iter()
        .flatten()
        .filter(CorpusEntry::is_relevant)
        .map(|entry| entry.to_record())
        .collect();

    info!(
        dir = %dir.display(),
        files = paths.len(),
        records = records.len(),
        "read API reference corpus"
    );

    Ok(records)
}

fn read_entry(path: &Path) -> StoreResult<Option<CorpusEntry>> {
    let content = fs::read_to_string(path)?;
    let entry = CorpusEntry::parse(&content).map_err(|reason| StoreError::Corpus {
        path: path.to_path_buf(),
        reason,
    })?;

    if entry.is_none() {
        debug!(path = %path.display(), "no front matter, skipping");
    }

    Ok(entry)
}

/// YAML between a leading `---` line and the next `---` line.
fn front_matter(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content
        .strip_prefix("---\r\n")
        .or_else(|| content.strip_prefix("---\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

/// Accept a scalar, a sequence or null where a list of strings is expected.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<StringList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringList::One(value)) => vec![value],
        Some(StringList::Many(values)) => values,
    })
}

fn first_trimmed(values: &[String]) -> &str {
    values.first().map(|value| value.trim()).unwrap_or_default()
}
