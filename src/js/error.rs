// Error types for the bundle pipeline

use crate::js::registry::ResourceKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors publishing a derived artifact into the bundle table
///
/// A collision is a configuration defect: the bundle builder returns it
/// as-is instead of turning it into fallback content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("Virtual path '{path}' is already bound to a {kind}, expected an ad-hoc artifact")]
    Collision { path: String, kind: ResourceKind },
}

/// Errors inside a source map recording session
#[derive(Debug, Error)]
pub enum SourceMapError {
    #[error("Invalid generated source map: {0}")]
    Parse(#[source] sourcemap::Error),

    #[error("Failed to serialize source map: {0}")]
    Serialize(#[source] sourcemap::Error),

    #[error("Serialized source map is not UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Errors loading a bundle manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bundle manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Manifest has no files for bundle '{0}'")]
    Empty(String),
}
