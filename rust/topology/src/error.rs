// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology operations.

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during topology operations.
///
/// Projection and analysis never fail on bad data; only export and the
/// core crate's explicit validation calls produce errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error raised by the core data model.
    #[error(transparent)]
    Core(#[from] fibermap_core::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
