//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── matches/
//! │   └── {fixtureId}/
//! │       ├── {fixtureId}.json     # Listing entries
//! │       └── {matchId}.json       # Match details
//! └── classifications/
//!     └── classification.json
//! ```
//!
//! Every write goes to a hidden temp file next to the target and is then
//! renamed over it, so readers see either the old or the new file. A write
//! whose bytes equal the file on disk is skipped.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{ClassificationRow, ListingEntry, MatchDetail};
use crate::storage::{CLASSIFICATIONS_DIR, ListingTree, MATCHES_DIR, MatchStorage};

const CLASSIFICATION_FILE: &str = "classification.json";
const WRITE_PROBE: &str = ".write-probe";

/// Longest file name most filesystems accept, in bytes.
const MAX_NAME_BYTES: usize = 255;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    fn listing_key(fixture_id: &str) -> String {
        format!("{MATCHES_DIR}/{fixture_id}/{fixture_id}.json")
    }

    fn detail_key(fixture_id: &str, match_id: u64) -> String {
        format!("{MATCHES_DIR}/{fixture_id}/{match_id}.json")
    }

    /// Write JSON data, leaving the file untouched when nothing changed.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<PathBuf> {
        let mut bytes = serde_json::to_vec_pretty(value)?;
        bytes.push(b'\n');

        let path = self.path(key);
        if let Ok(existing) = tokio::fs::read(&path).await {
            if existing == bytes {
                log::debug!("Unchanged: {}", path.display());
                return Ok(path);
            }
        }

        write_atomic(&path, &bytes).await?;
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

#[async_trait]
impl MatchStorage for LocalStorage {
    async fn prepare(&self) -> Result<()> {
        let matches = self.path(MATCHES_DIR);
        tokio::fs::create_dir_all(&matches)
            .await
            .map_err(|e| AppError::file_system(&matches, e))?;

        let probe = self.path(WRITE_PROBE);
        write_atomic(&probe, b"").await?;
        tokio::fs::remove_file(&probe)
            .await
            .map_err(|e| AppError::file_system(&probe, e))?;
        Ok(())
    }

    async fn save_listing(&self, fixture_id: &str, entries: &[ListingEntry]) -> Result<PathBuf> {
        self.write_json(&Self::listing_key(fixture_id), entries).await
    }

    async fn save_detail(&self, detail: &MatchDetail) -> Result<PathBuf> {
        let key = Self::detail_key(&detail.fixture_id, detail.match_id);
        self.write_json(&key, detail).await
    }

    async fn save_classifications(&self, rows: &[ClassificationRow]) -> Result<PathBuf> {
        let key = format!("{CLASSIFICATIONS_DIR}/{CLASSIFICATION_FILE}");
        self.write_json(&key, rows).await
    }

    async fn load_listing(&self, path: &Path) -> Result<Vec<ListingEntry>> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_system(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::decode(path, e))
    }

    fn listing_tree(&self) -> ListingTree {
        ListingTree::new(self.path(MATCHES_DIR))
    }
}

/// Write bytes atomically (write to temp, then rename).
///
/// Parent directories are created first. The temp file is removed again
/// when any step fails.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_system(parent, e))?;
    }

    let tmp = temp_path(path);
    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(AppError::file_system(path, e));
    }
    Ok(())
}

/// Hidden sibling unique to this write: `.{name}.{pid}.{seq}.tmp`.
///
/// The target name is cut short when needed so the temp name stays within
/// [`MAX_NAME_BYTES`].
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = format!(
        ".{}.{}.tmp",
        std::process::id(),
        TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
    );

    let mut end = name.len().min(MAX_NAME_BYTES - 1 - suffix.len());
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    path.with_file_name(format!(".{}{suffix}", &name[..end]))
}
