//! Single-line transfer strings for sharing grids through the clipboard.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{GateData, GridAsset};

const TRANSFER_DOMAIN: &str = "grid";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the grid dimensions and payload.
pub const TRANSFER_HEADER: &str = "grid:v1";
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding transfer strings.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("transfer string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("transfer string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("transfer string is missing the version")]
    MissingVersion,
    /// The grid dimensions were missing.
    #[error("transfer string is missing the grid dimensions")]
    MissingDimensions,
    /// The payload segment was missing.
    #[error("transfer string is missing the payload")]
    MissingPayload,
    /// The prefix named another kind of data.
    #[error("transfer prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version is not understood.
    #[error("transfer version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode transfer payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload JSON could not be read or written.
    #[error("could not process transfer payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferPayload {
    cell_size: f32,
    origin: [f32; 3],
    occupied_cells: Vec<bool>,
    wall_cells: Vec<bool>,
    gate_data: GateData,
}

impl GridAsset {
    /// Encodes the asset as `grid:v1:<width>x<length>:<base64 json>`.
    pub fn encode_transfer(&self) -> Result<String, TransferError> {
        let payload = TransferPayload {
            cell_size: self.cell_size,
            origin: self.origin,
            occupied_cells: self.occupied_cells.clone(),
            wall_cells: self.wall_cells.clone(),
            gate_data: self.gate_data.clone(),
        };
        let json = serde_json::to_vec(&payload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{TRANSFER_HEADER}:{}x{}:{encoded}",
            self.grid_width, self.grid_length
        ))
    }

    /// Decodes an asset from a transfer string.
    pub fn decode_transfer(value: &str) -> Result<Self, TransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(TransferError::MissingPrefix)?;
        let version = parts.next().ok_or(TransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(TransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(TransferError::MissingPayload)?;

        if domain != TRANSFER_DOMAIN {
            return Err(TransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != TRANSFER_VERSION {
            return Err(TransferError::UnsupportedVersion(version.to_owned()));
        }

        let (grid_width, grid_length) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let decoded: TransferPayload = serde_json::from_slice(&bytes)?;

        Ok(Self {
            grid_width,
            grid_length,
            cell_size: decoded.cell_size,
            origin: decoded.origin,
            occupied_cells: decoded.occupied_cells,
            wall_cells: decoded.wall_cells,
            gate_data: decoded.gate_data,
        })
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), TransferError> {
    let invalid = || TransferError::InvalidDimensions(dimensions.to_owned());
    let (width, length) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let length = length.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || length == 0 {
        return Err(invalid());
    }

    Ok((width, length))
}
