use std::path::PathBuf;

use thiserror::Error;

use crate::tiles::TileKind;

/// Errors raised by map persistence and asset validation.
#[derive(Debug, Error)]
pub enum MapError {
    /// The map file does not exist. Callers may treat this as an empty map.
    #[error("map file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to access map file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file exists but does not describe a valid map.
    #[error("map file {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
    #[error("failed to serialize map: {0}")]
    Serialize(#[from] serde_json::Error),
    /// A tile points at an asset the asset table does not have.
    #[error("tile {kind}/{variant} has no entry in the asset table")]
    InvalidTileReference { kind: TileKind, variant: u32 },
}

impl MapError {
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            MapError::NotFound { path }
        } else {
            MapError::Io { path, source }
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        MapError::Corrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True if the map file was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MapError::NotFound { .. })
    }
}
