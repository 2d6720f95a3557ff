// src/models/asset.rs

//! Binary assets mirrored next to the match records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::normalize::asset_file_name;

/// Which asset directory a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    TeamLogo,
    PlayerPhoto,
}

impl AssetKind {
    /// Directory under the mirror root.
    pub fn dir(&self) -> &'static str {
        match self {
            AssetKind::TeamLogo => "teams_logos",
            AssetKind::PlayerPhoto => "players",
        }
    }
}

/// A resolved source URL and the file it mirrors to.
///
/// The file name is a pure function of the URL, so the same URL always
/// lands on the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef {
    pub url: String,
    pub kind: AssetKind,
    pub file_name: String,
}

impl AssetRef {
    /// Build a reference for an absolute URL.
    pub fn new(url: impl Into<String>, kind: AssetKind) -> Result<Self> {
        let url = url.into();
        let file_name = asset_file_name(&url)
            .ok_or_else(|| AppError::asset(&url, "no usable file name in URL"))?;
        Ok(Self {
            url,
            kind,
            file_name,
        })
    }

    /// Path relative to the mirror root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.kind.dir()).join(&self.file_name)
    }

    /// Relative path as written into records, always `/`-separated.
    pub fn record_path(&self) -> String {
        format!("{}/{}", self.kind.dir(), self.file_name)
    }
}

/// An image as stored in a record: the remote URL plus the mirrored
/// location when mirroring succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ImageRef {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ImageRef {
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            path: None,
        }
    }
}
