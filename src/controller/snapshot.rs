//! Snapshot file: the whole store as one JSON object of key → value.
//!
//! The file is rewritten in full on every durable write. Saving goes through a
//! sibling `*.tmp` file that is fsynced and then renamed over the target, so a
//! crash mid-write leaves either the old or the new snapshot, never a torn one.

use crate::common::Result;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub type Entries = BTreeMap<String, String>;

/// Location of the snapshot on disk
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("state.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read and parse the snapshot.
    pub async fn load(&self) -> Result<Entries> {
        let data = tokio::fs::read(&self.path).await?;
        let entries = serde_json::from_slice(&data)?;
        Ok(entries)
    }

    /// Replace the snapshot with `entries`.
    pub async fn save(&self, entries: &Entries) -> Result<()> {
        let data = serde_json::to_vec(entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.tmp_path();
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
