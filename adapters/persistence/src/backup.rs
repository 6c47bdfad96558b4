//! JSON backups of a grid asset.
//!
//! Failures never propagate: the in-memory world stays authoritative, so a
//! failed backup is only worth a log line.

use std::{fs, path::Path};

use log::{error, info};

use crate::{GridAsset, PersistenceError};

/// Writes the asset as JSON, reporting whether the backup succeeded.
pub fn save_backup(asset: &GridAsset, path: &Path) -> bool {
    match write_asset(asset, path) {
        Ok(()) => {
            info!("grid backup written to {}", path.display());
            true
        }
        Err(err) => {
            error!("grid backup failed: {err}");
            false
        }
    }
}

/// Reads a JSON backup, returning `None` when it cannot be restored.
#[must_use]
pub fn restore_backup(path: &Path) -> Option<GridAsset> {
    match read_asset(path) {
        Ok(asset) => {
            info!("grid restored from {}", path.display());
            Some(asset)
        }
        Err(err) => {
            error!("grid restore failed: {err}");
            None
        }
    }
}

fn write_asset(asset: &GridAsset, path: &Path) -> Result<(), PersistenceError> {
    let json = asset.to_json()?;
    fs::write(path, json).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_asset(path: &Path) -> Result<GridAsset, PersistenceError> {
    let json = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    GridAsset::from_json(&json)
}
