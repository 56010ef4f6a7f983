//! Registry of named bundles, populated at startup and read while rendering.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{BundleError, Result};
use crate::models::{Bundle, BundleKind};

/// Mapping of bundle path to its registered definition.
///
/// Registration requires `&mut self` and is expected to happen once during startup;
/// afterwards the registry is shared immutably (directly or behind an `Arc`).
#[derive(Debug, Clone, Default)]
pub struct BundleRegistry {
  bundles: BTreeMap<String, Bundle>,
}

impl BundleRegistry {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a bundle of `files` under `path`.
  ///
  /// The first registration of a path wins; later attempts are ignored and return
  /// `false`.
  pub fn register<I, S>(&mut self, path: &str, files: I, kind: BundleKind) -> bool
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    if self.bundles.contains_key(path) {
      debug!("ignoring re-registration of bundle {path}");
      return false;
    }

    let bundle = Bundle::new(path, kind, files);
    debug!(
      "registered {kind} bundle {path} with {} include(s)",
      bundle.items().len()
    );
    self.bundles.insert(path.to_string(), bundle);
    true
  }

  /// Register a bundle containing a single file.
  pub fn register_file(&mut self, path: &str, file: &str, kind: BundleKind) -> bool {
    self.register(path, [file], kind)
  }

  /// Register a script bundle.
  pub fn register_scripts<I, S>(&mut self, path: &str, files: I) -> bool
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.register(path, files, BundleKind::Script)
  }

  /// Register a style bundle; each file gets the CSS URL rewrite transform.
  pub fn register_styles<I, S>(&mut self, path: &str, files: I) -> bool
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.register(path, files, BundleKind::Style)
  }

  /// Whether `path` has been registered.
  pub fn is_registered(&self, path: &str) -> bool {
    self.bundles.contains_key(path)
  }

  /// Look up a bundle by path.
  pub fn get(&self, path: &str) -> Option<&Bundle> {
    self.bundles.get(path)
  }

  /// Look up a bundle, failing when it was never registered.
  pub fn bundle(&self, path: &str) -> Result<&Bundle> {
    self.get(path).ok_or_else(|| BundleError::unregistered(path))
  }

  /// Registered bundle paths in sorted order.
  pub fn paths(&self) -> impl Iterator<Item = &str> {
    self.bundles.keys().map(String::as_str)
  }

  /// Number of registered bundles.
  pub fn len(&self) -> usize {
    self.bundles.len()
  }

  /// Whether no bundles are registered.
  pub fn is_empty(&self) -> bool {
    self.bundles.is_empty()
  }
}
