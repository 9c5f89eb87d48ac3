// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors reported by the carver and its collaborators.

use thiserror::Error;

/// Everything that can go wrong while building, configuring, or
/// carving an image.  Every operation that returns one of these has
/// left the carver exactly as it found it.
#[derive(Debug, Error)]
pub enum CarverError {
    /// A bad energy function identifier, channel role assignment, or
    /// tunable, or a malformed VMap payload.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An overlay, VMap, or output buffer that doesn't fit, or a resize
    /// that would go below one pixel or beyond the enlargement limit.
    #[error("bounds error: {0}")]
    Bounds(String),

    /// An image-sized buffer could not be reserved.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// The carver was asked to work while a previous pass never
    /// finished.
    #[error("state error: {0}")]
    State(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CarverError>;

/// Reserve room for `len` items, or say why not.
pub(crate) fn try_buffer<T>(len: usize, what: &str) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|e| CarverError::Allocation(format!("{} ({} items): {}", what, len, e)))?;
    Ok(buffer)
}
