//! Errors returned by the gallery library
//!
use std::path::PathBuf;

use snafu::prelude::*;

/// Errors returned by gallery crate
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GalleryError {
    // Http connection or timeout error
    #[snafu(display("HTTP error {method} url:{url}"))]
    Http {
        method: String,
        url: String,
        source: reqwest::Error,
    },

    /// Server responded with a non-2xx status.
    #[snafu(display("Failed to load {url}: {code} {reason}"))]
    ApiError {
        code: u16,
        method: String,
        url: String,
        reason: String,
    },

    /// The item list was valid json, but not an array.
    #[snafu(display("Item data at {location} is not an array"))]
    NotAnArray { location: String },

    /// Deserialization error. `path` is the json path of the offending field.
    #[snafu(display("Deserialization at {path}: {source}"))]
    Deserialization {
        path: String,
        source: serde_json::Error,
    },

    /// Serialization error. unlikely to occur.
    #[snafu(display("Serialization: {source}"))]
    Serialization { source: serde_json::Error },

    /// Filesystem error (create, read, write or copy)
    #[snafu(display("{action} {}: {source}", path.display()))]
    Io {
        action: String,
        path: PathBuf,
        source: std::io::Error,
    },

    /// Expected item was not found.
    #[snafu(display("{obj_type} {key} not found"))]
    NotFound { obj_type: String, key: String },

    /// Validation error: an item or parameter failed a sanity check.
    #[snafu(display("Validation error: {message}"))]
    Validation { message: String },

    /// The user declined to choose a project directory.
    #[snafu(display("Save cancelled"))]
    Cancelled,

    /// Some other error occurred
    #[snafu(display("{message}"))]
    Other { message: String },
}

impl GalleryError {
    /// Returns true for errors caused by the user backing out of an operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
