// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for fallible core operations.
//!
//! Expected "no match" outcomes (unknown kinds, malformed positions, missing
//! endpoints) are never errors; they surface as `false`, empty results or
//! sentinel ids. Errors are reserved for JSON I/O, configuration and explicit
//! validation calls.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Strand sub-counts add up to more than the cable holds.
    #[error("strand accounting exceeds total: {allocated} allocated of {total}")]
    StrandOvercommit { allocated: u32, total: u32 },

    /// Service area bounds are not finite or not ordered.
    #[error("invalid service area: {0}")]
    InvalidServiceArea(String),

    /// A configuration value could not be parsed.
    #[error("invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}
