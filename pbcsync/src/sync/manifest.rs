use std::collections::HashSet;
use std::path::Path;

use unicode_normalization::UnicodeNormalization;

use super::error::SyncError;

/// Canonical form used for every filename comparison (NFC).
pub fn normalize_name(name: &str) -> String {
    name.nfc().collect()
}

/// Normalized names of the regular entries of a directory at one instant.
#[derive(Debug, Default, Clone)]
pub struct LocalManifest {
    names: HashSet<String>,
}

impl LocalManifest {
    /// Lists `dir` without recursing; subdirectories are ignored.
    pub async fn build(dir: &Path) -> Result<Self, SyncError> {
        let read_dir_error = |source| SyncError::ReadDirectory {
            dir: dir.to_path_buf(),
            source,
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_error)?;
        let mut names = HashSet::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
            let file_type = entry.file_type().await.map_err(read_dir_error)?;
            if file_type.is_dir() {
                continue;
            }
            names.insert(normalize_name(&entry.file_name().to_string_lossy()));
        }

        Ok(Self { names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.contains_normalized(&normalize_name(name))
    }

    /// Lookup for a name already passed through [`normalize_name`].
    pub fn contains_normalized(&self, normalized: &str) -> bool {
        self.names.contains(normalized)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
