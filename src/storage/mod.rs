//! Storage abstractions for the mirrored match tree.
//!
//! ## Directory Structure
//!
//! ```text
//! {root}/
//! ├── matches/
//! │   ├── 505659.json          # Listing for fixture 505659
//! │   └── 505659/
//! │       ├── 505659.json      # Listing, nested layout
//! │       └── 1234567.json     # Match detail
//! ├── classifications/
//! │   └── classification.json
//! ├── teams_logos/
//! └── players/
//! ```

pub mod local;
pub mod tree;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ClassificationRow, ListingEntry, MatchDetail};

// Re-export for convenience
pub use local::LocalStorage;
pub use tree::{ListingFile, ListingTree};

/// Directory holding listings and details.
pub const MATCHES_DIR: &str = "matches";

/// Directory holding the classification table.
pub const CLASSIFICATIONS_DIR: &str = "classifications";

/// Trait for match record storage backends.
#[async_trait]
pub trait MatchStorage: Send + Sync {
    /// Make sure the tree exists and is writable. A failure here ends the run.
    async fn prepare(&self) -> Result<()>;

    /// Write the listing for one fixture.
    async fn save_listing(&self, fixture_id: &str, entries: &[ListingEntry]) -> Result<PathBuf>;

    /// Write one match detail under its fixture.
    async fn save_detail(&self, detail: &MatchDetail) -> Result<PathBuf>;

    /// Write the classification table.
    async fn save_classifications(&self, rows: &[ClassificationRow]) -> Result<PathBuf>;

    /// Decode a previously written listing file.
    async fn load_listing(&self, path: &Path) -> Result<Vec<ListingEntry>>;

    /// Walk the listing files currently in the tree.
    fn listing_tree(&self) -> ListingTree;
}
