// src/storage/tree.rs

//! Lazy walk over the listing files of a mirrored tree.
//!
//! A listing is either a JSON file directly under `matches/` or a JSON file
//! named after its own directory (`matches/505659/505659.json`). The walk
//! goes one directory level deep. Detail records sitting next to a nested
//! listing are not listings and are never yielded. Directories are read one
//! at a time through `tokio::fs` as the walk reaches them, entries in name
//! order.

use std::collections::VecDeque;
use std::fs::FileType;
use std::io;
use std::path::{Path, PathBuf};

use futures::stream::{self, BoxStream, StreamExt};

/// A listing file found in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFile {
    /// File stem, used as the fixture ID of details derived from it
    pub fixture_id: String,
    pub path: PathBuf,
}

/// Restartable description of a walk: every call to [`ListingTree::files`]
/// starts again from the root.
#[derive(Debug, Clone)]
pub struct ListingTree {
    root: PathBuf,
}

impl ListingTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Stream the listing files, reading each directory only when reached.
    pub fn files(&self) -> BoxStream<'static, ListingFile> {
        let walk = Walk {
            root: self.root.clone(),
            pending_dirs: VecDeque::from([self.root.clone()]),
            current: VecDeque::new(),
        };

        stream::unfold(walk, |mut walk| async move {
            let file = walk.next_file().await?;
            Some((file, walk))
        })
        .boxed()
    }
}

/// Walk state carried between items of the stream.
struct Walk {
    root: PathBuf,
    pending_dirs: VecDeque<PathBuf>,
    current: VecDeque<(PathBuf, FileType)>,
}

impl Walk {
    async fn next_file(&mut self) -> Option<ListingFile> {
        loop {
            while let Some((path, file_type)) = self.current.pop_front() {
                if file_type.is_dir() {
                    if path.parent() == Some(self.root.as_path()) {
                        self.pending_dirs.push_back(path);
                    }
                } else if file_type.is_file() {
                    if let Some(listing) = self.as_listing(&path) {
                        return Some(listing);
                    }
                }
            }

            let dir = self.pending_dirs.pop_front()?;
            self.open(&dir).await;
        }
    }

    async fn open(&mut self, dir: &Path) {
        match read_sorted(dir).await {
            Ok(entries) => self.current = entries.into(),
            Err(e) if e.kind() == io::ErrorKind::NotFound && dir == self.root => {
                log::debug!("No listing tree at {}", dir.display());
            }
            Err(e) => log::warn!("Cannot read directory {}: {}", dir.display(), e),
        }
    }

    fn as_listing(&self, path: &Path) -> Option<ListingFile> {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        if stem.starts_with('.') {
            return None;
        }
        let parent = path.parent()?;
        let top_level = parent == self.root;
        let named_after_dir = parent.parent() == Some(self.root.as_path())
            && parent.file_name().and_then(|n| n.to_str()) == Some(stem);

        (top_level || named_after_dir).then(|| ListingFile {
            fixture_id: stem.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Directory entries sorted by name; symlinks keep their own file type.
async fn read_sorted(dir: &Path) -> io::Result<Vec<(PathBuf, FileType)>> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        entries.push((entry.path(), entry.file_type().await?));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
