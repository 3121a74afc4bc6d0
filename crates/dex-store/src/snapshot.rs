//! JSON snapshot persistence for the memory store
//!
//! The whole document set is rewritten after every mutation through a
//! temporary file and a rename, so readers never see a torn file. Snapshots
//! carry a generation number; a writer that lost the race to a newer
//! generation skips its write.

use crate::error::{StoreError, StoreResult};
use dex_model::{Ability, Creature};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Borrowed view used when encoding
#[derive(Serialize)]
pub(crate) struct SnapshotRef<'a> {
    pub(crate) version: u32,
    pub(crate) sequence: u64,
    pub(crate) abilities: Vec<&'a Ability>,
    pub(crate) creatures: Vec<&'a Creature>,
}

/// Decoded snapshot contents
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Snapshot {
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) sequence: u64,
    #[serde(default)]
    pub(crate) abilities: Vec<Ability>,
    #[serde(default)]
    pub(crate) creatures: Vec<Creature>,
}

/// Encoded snapshot waiting to be flushed
#[derive(Debug)]
pub(crate) struct Pending {
    pub(crate) generation: u64,
    pub(crate) body: String,
}

/// Serialises snapshot writes to one file
#[derive(Debug)]
pub(crate) struct SnapshotWriter {
    path: PathBuf,
    /// Highest generation written so far
    written: Mutex<u64>,
}

impl SnapshotWriter {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: Mutex::new(0),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Write `pending` unless a newer generation is already on disk
    pub(crate) async fn flush(&self, pending: Pending) -> StoreResult<()> {
        let mut written = self.written.lock().await;
        if pending.generation <= *written {
            tracing::trace!(generation = pending.generation, "snapshot superseded");
            return Ok(());
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, pending.body.as_bytes()).await?;
        fs::rename(&tmp, &self.path).await?;
        *written = pending.generation;

        tracing::debug!(
            generation = pending.generation,
            path = %self.path.display(),
            "snapshot written"
        );
        Ok(())
    }
}

/// Read a snapshot file; a missing file yields an empty snapshot
pub(crate) async fn load(path: &Path) -> StoreResult<Snapshot> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            return Ok(Snapshot {
                version: SNAPSHOT_VERSION,
                ..Snapshot::default()
            });
        }
        Err(e) => return Err(e.into()),
    };

    let snapshot: Snapshot = serde_json::from_str(&content)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StoreError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: snapshot.version,
        });
    }
    Ok(snapshot)
}
