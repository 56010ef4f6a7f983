//! Error type shared by registration, enumeration and rendering.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while rendering bundles.
#[derive(Debug, Error)]
pub enum BundleError {
  /// A bundle path was rendered or appended without being registered first.
  #[error("bundle has not been registered: {path}")]
  UnregisteredBundle {
    /// Requested bundle path.
    path: String,
  },

  /// A generic bundle was rendered where a tag shape is required.
  #[error("bundles must be rendered as BundleKind::Script or BundleKind::Style")]
  InvalidKind,

  /// Filesystem access failed for a reason other than the file being absent.
  #[error("failed to access {}: {}", .path.display(), .source)]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: io::Error,
  },

  /// A wildcard include could not be compiled into a matcher.
  #[error("invalid include pattern {pattern}: {source}")]
  InvalidPattern {
    /// File name pattern as written in the include.
    pattern: String,
    /// Regex compilation error.
    #[source]
    source: regex::Error,
  },
}

impl BundleError {
  pub(crate) fn unregistered(path: &str) -> Self {
    Self::UnregisteredBundle {
      path: path.to_string(),
    }
  }

  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, BundleError>;
