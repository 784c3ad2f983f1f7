//! The shared covers document.
//!
//! An ordered mapping from cover id to [`CoverConfigEntry`], persisted as
//! YAML. Updates are read-merge-write: the document is loaded (absent file
//! means empty), the entry is merged by key, and the full document is written
//! back through a sibling temp file so a failed write leaves the previous
//! content intact. There is no file locking; concurrent writers follow
//! last-writer-wins semantics.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CoverConfigEntry;
use super::CoverError;

/// Location of the covers document below the platform config directory.
pub const COVERS_RELATIVE_PATH: &str = "configuration/covers.yaml";

/// The covers document: one top-level key per cover id.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverDocument(BTreeMap<String, CoverConfigEntry>);

impl CoverDocument {
    /// Load the document at `path`, treating an absent file as empty.
    ///
    /// A present but malformed file is a [`CoverError::Parse`]: merging into
    /// corrupt state would guess at a repair, so the error surfaces instead.
    pub fn load(path: &Path) -> Result<Self, CoverError> {
        if !path.exists() {
            debug!("No covers document at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).map_err(|e| CoverError::Io(path.to_path_buf(), e))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let entries = serde_yaml::from_str(&contents)?;
        Ok(Self(entries))
    }

    /// Insert or overwrite the entry for `cover_id`.
    pub fn insert(&mut self, cover_id: impl Into<String>, entry: CoverConfigEntry) {
        self.0.insert(cover_id.into(), entry);
    }

    pub fn get(&self, cover_id: &str) -> Option<&CoverConfigEntry> {
        self.0.get(cover_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CoverConfigEntry)> + '_ {
        self.0.iter()
    }

    /// Serialize the full document and replace the file at `path`.
    ///
    /// Parent directories are created as needed. The content is written to a
    /// sibling temp file first and renamed over the target, so the previous
    /// document survives a failed write.
    pub fn save(&self, path: &Path) -> Result<(), CoverError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CoverError::Io(parent.to_path_buf(), e))?;
        }

        let rendered = serde_yaml::to_string(&self)?;

        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, rendered).map_err(|e| CoverError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, path).map_err(|e| CoverError::Io(path.to_path_buf(), e))?;

        debug!("Wrote covers document {}", path.display());
        Ok(())
    }
}

/// Merge a single entry into the document at `path`.
///
/// Loads the existing document (or starts empty), overwrites any entry with
/// the same `cover_id` and writes the merged document back. Applying the same
/// entry twice leaves the document unchanged after the first application.
pub fn apply_entry(
    cover_id: &str,
    entry: CoverConfigEntry,
    path: &Path,
) -> Result<(), CoverError> {
    let mut document = CoverDocument::load(path)?;
    document.insert(cover_id, entry);
    document.save(path)
}
