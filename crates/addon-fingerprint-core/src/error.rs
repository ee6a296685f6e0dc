use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes, one per [`Error`] variant.
pub mod codes {
    pub const MANIFEST_READ_FAILED: &str = "MANIFEST_READ_FAILED";
    pub const MANIFEST_INVALID: &str = "MANIFEST_INVALID";
    pub const INVALID_PACKAGE_CONFIG: &str = "INVALID_PACKAGE_CONFIG";
    pub const INVALID_PACKAGE_TARGET: &str = "INVALID_PACKAGE_TARGET";
    pub const IO_ERROR: &str = "IO_ERROR";
}

/// Fatal error aborting a fingerprint computation.
///
/// Dependencies that are missing or hide their manifest are not errors;
/// the walker skips them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid package configuration at {path}: {message}")]
    InvalidPackageConfig { path: PathBuf, message: String },

    #[error("Invalid \"exports\" target {target:?} in package {package}")]
    InvalidPackageTarget { package: String, target: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ManifestRead { .. } => codes::MANIFEST_READ_FAILED,
            Self::ManifestParse { .. } => codes::MANIFEST_INVALID,
            Self::InvalidPackageConfig { .. } => codes::INVALID_PACKAGE_CONFIG,
            Self::InvalidPackageTarget { .. } => codes::INVALID_PACKAGE_TARGET,
            Self::Io(_) => codes::IO_ERROR,
        }
    }
}
