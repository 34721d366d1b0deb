//! On-disk catalogue loading. A catalogue directory holds `catalogue.toml`
//! plus one fragment file per entry; the manifest mirrors `ShaderEntry`
//! except that fragment source is referenced by relative path instead of
//! being inlined. Loading reads and validates everything up front so the
//! session never sees a half-formed catalogue.
//!
//! Types:
//!
//! - `CatalogueManifest` and `EntryManifest` are the serde views of
//!   `catalogue.toml`.
//!
//! Functions:
//!
//! - `load_dir` resolves fragment paths against the manifest directory and
//!   hands the result to `Catalogue::new` for validation.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Catalogue, CatalogueError, ParameterDescriptor, ShaderEntry};

pub const MANIFEST_FILE: &str = "catalogue.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogueManifest {
    #[serde(default)]
    pub entries: Vec<EntryManifest>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EntryManifest {
    pub id: String,
    pub name: String,
    pub fragment: PathBuf,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub params: Vec<ParameterDescriptor>,
}

pub(crate) fn load_dir(dir: &Path) -> Result<Catalogue, CatalogueError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Err(CatalogueError::ManifestMissing(manifest_path));
    }

    let manifest_raw = fs::read_to_string(&manifest_path)?;
    let manifest: CatalogueManifest = toml::from_str(&manifest_raw)?;

    let mut entries = Vec::with_capacity(manifest.entries.len());
    for entry in manifest.entries {
        let fragment_path = dir.join(&entry.fragment);
        tracing::debug!(entry = %entry.id, path = %fragment_path.display(), "reading fragment source");
        let fragment = fs::read_to_string(&fragment_path)?;
        entries.push(ShaderEntry {
            id: entry.id,
            name: entry.name,
            fragment,
            params: entry.params,
            default: entry.default,
        });
    }

    Catalogue::new(entries)
}
