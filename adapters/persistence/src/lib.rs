#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid serialisation boundary: persisted asset schema, backups and transfer strings.

mod asset;
mod backup;
mod transfer;

use std::path::PathBuf;

pub use asset::{GateData, GridAsset};
pub use backup::{restore_backup, save_backup};
pub use transfer::{TransferError, TRANSFER_HEADER};

/// Errors raised while reading or writing grid assets.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The file could not be read or written.
    #[error("could not access {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The asset could not be converted to or from JSON.
    #[error("invalid grid asset json: {0}")]
    Json(#[from] serde_json::Error),
}
