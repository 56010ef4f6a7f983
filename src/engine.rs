//! Bundling engine abstraction and the default filesystem-backed implementation.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use log::debug;
use regex::Regex;

use crate::error::{BundleError, Result};
use crate::fingerprint::content_version;
use crate::models::{Bundle, BundleItem, FileRef};
use crate::virtual_path::{app_relative, normalise_separators, to_absolute};

const VERSION_TOKEN: &str = "{version}";
const VERSION_PATTERN: &str = r"(?:\d+(?:\.\d+)*(?:-[A-Za-z][0-9A-Za-z.]*)?)";

/// Capabilities the renderer needs from the bundling engine.
pub trait BundleEngine {
  /// Expand a bundle's includes into the ordered list of member files.
  fn enumerate_files(&self, bundle: &Bundle) -> Result<Vec<FileRef>>;

  /// URL for a bundle path or a member's virtual path.
  fn resolve_url(&self, virtual_path: &str) -> String;

  /// Whether bundles are served combined (production) or file by file.
  fn is_optimized(&self) -> bool;

  /// Location on disk of a virtual path.
  fn map_path(&self, virtual_path: &str) -> PathBuf;

  /// Version token appended to the combined bundle URL in optimized mode.
  ///
  /// `None` leaves the URL bare.
  fn bundle_version(&self, _bundle: &Bundle) -> Result<Option<String>> {
    Ok(None)
  }
}

/// Engine mapping virtual paths onto a web root directory.
///
/// Compiled wildcard matchers are cached per file pattern and shared between clones.
#[derive(Debug, Clone)]
pub struct FileSystemEngine {
  web_root: PathBuf,
  app_base: String,
  optimizations: bool,
  matchers: Arc<Mutex<HashMap<String, Regex>>>,
}

impl FileSystemEngine {
  /// Create an engine serving from `web_root` at the site root, with optimizations off.
  pub fn new(web_root: impl Into<PathBuf>) -> Self {
    Self {
      web_root: web_root.into(),
      app_base: "/".to_string(),
      optimizations: false,
      matchers: Arc::default(),
    }
  }

  /// Set the URL path the application is mounted under.
  pub fn with_app_base(mut self, app_base: impl Into<String>) -> Self {
    self.app_base = app_base.into();
    self
  }

  /// Toggle combined bundle rendering.
  pub fn with_optimizations(mut self, enabled: bool) -> Self {
    self.optimizations = enabled;
    self
  }

  /// Directory virtual paths are mapped onto.
  pub fn web_root(&self) -> &Path {
    &self.web_root
  }

  /// URL path the application is mounted under.
  pub fn app_base(&self) -> &str {
    &self.app_base
  }

  /// Concatenate the existing member files of `bundle`, applying item transforms.
  ///
  /// Content is combined verbatim; no minification takes place.
  pub fn bundle_content(&self, bundle: &Bundle) -> anyhow::Result<String> {
    let parts = self
      .read_members(bundle)
      .with_context(|| format!("failed to combine bundle {}", bundle.path()))?;
    Ok(parts.join("\n"))
  }

  fn read_members(&self, bundle: &Bundle) -> Result<Vec<String>> {
    let mut parts = Vec::new();

    for file in self.enumerate_files(bundle)? {
      if !file.physical_path.is_file() {
        debug!(
          "skipping missing file {} in bundle {}",
          file.virtual_path,
          bundle.path()
        );
        continue;
      }

      let content = fs::read_to_string(&file.physical_path)
        .map_err(|err| BundleError::io(&file.physical_path, err))?;
      let content = match file.transform {
        Some(transform) => transform.apply(&self.app_base, &file.virtual_path, &content),
        None => content,
      };
      parts.push(content);
    }

    Ok(parts)
  }

  fn matcher(&self, file_pattern: &str) -> Result<Regex> {
    let mut matchers = self.matchers.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(matcher) = matchers.get(file_pattern) {
      return Ok(matcher.clone());
    }

    let matcher = wildcard_regex(file_pattern)?;
    matchers.insert(file_pattern.to_string(), matcher.clone());
    Ok(matcher)
  }

  fn expand_item(&self, item: &BundleItem) -> Result<Vec<String>> {
    let virtual_path = normalise_separators(&item.virtual_path);
    let (dir, file_pattern) = match virtual_path.rfind('/') {
      Some(index) => (&virtual_path[..index], &virtual_path[index + 1..]),
      None => ("", virtual_path.as_str()),
    };

    if !is_wildcard(file_pattern) {
      return Ok(vec![virtual_path.clone()]);
    }

    let matcher = self.matcher(file_pattern)?;
    let physical_dir = self.map_path(dir);
    let entries = match fs::read_dir(&physical_dir) {
      Ok(entries) => entries,
      Err(err) if err.kind() == ErrorKind::NotFound => {
        debug!("wildcard include {virtual_path} points at a missing directory");
        return Ok(Vec::new());
      }
      Err(err) => return Err(BundleError::io(physical_dir, err)),
    };

    let mut names = Vec::new();
    for entry in entries {
      let entry = entry.map_err(|err| BundleError::io(&physical_dir, err))?;
      // Follows symlinks.
      if !entry.path().is_file() {
        continue;
      }

      let file_name = entry.file_name();
      let Some(name) = file_name.to_str() else {
        continue;
      };
      if matcher.is_match(name) {
        names.push(name.to_string());
      }
    }

    names.sort();
    Ok(
      names
        .into_iter()
        .map(|name| {
          if dir.is_empty() {
            name
          } else {
            format!("{dir}/{name}")
          }
        })
        .collect(),
    )
  }
}

impl BundleEngine for FileSystemEngine {
  fn enumerate_files(&self, bundle: &Bundle) -> Result<Vec<FileRef>> {
    let mut seen = BTreeSet::new();
    let mut files = Vec::new();

    for item in bundle.items() {
      for virtual_path in self.expand_item(item)? {
        if !seen.insert(virtual_path.clone()) {
          continue;
        }
        files.push(FileRef {
          physical_path: self.map_path(&virtual_path),
          virtual_path,
          transform: item.transform,
        });
      }
    }

    Ok(files)
  }

  fn resolve_url(&self, virtual_path: &str) -> String {
    to_absolute(&self.app_base, virtual_path)
  }

  fn is_optimized(&self) -> bool {
    self.optimizations
  }

  fn map_path(&self, virtual_path: &str) -> PathBuf {
    let normalised = normalise_separators(virtual_path);
    app_relative(&normalised)
      .split('/')
      .filter(|segment| !segment.is_empty())
      .fold(self.web_root.clone(), |path, segment| path.join(segment))
  }

  /// Hash of the combined member content; `None` when no member exists on disk.
  fn bundle_version(&self, bundle: &Bundle) -> Result<Option<String>> {
    let parts = self.read_members(bundle)?;
    if parts.is_empty() {
      return Ok(None);
    }
    Ok(Some(content_version(parts.join("\n").as_bytes())))
  }
}

fn is_wildcard(file_pattern: &str) -> bool {
  file_pattern.contains('*') || file_pattern.contains(VERSION_TOKEN)
}

fn wildcard_regex(file_pattern: &str) -> Result<Regex> {
  let escaped = regex::escape(file_pattern)
    .replace(r"\*", "[^/]*")
    .replace(r"\{version\}", VERSION_PATTERN);
  Regex::new(&format!("^{escaped}$")).map_err(|source| BundleError::InvalidPattern {
    pattern: file_pattern.to_string(),
    source,
  })
}
