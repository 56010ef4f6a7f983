//! HTML tag rendering for registered bundles.
//!
//! In optimized mode each requested bundle produces a single tag pointing at the combined
//! bundle URL, versioned by a hash of the combined content when any member exists. Otherwise every member file that exists on disk gets its own tag, with a
//! `?v=<fingerprint>` suffix so browsers refetch it after a change or a new deployment.

use log::{debug, trace};

use crate::engine::BundleEngine;
use crate::error::{BundleError, Result};
use crate::fingerprint::fingerprint_file;
use crate::models::{BundleKind, SCRIPT_TAG_TEMPLATE, STYLE_TAG_TEMPLATE, URL_PLACEHOLDER};
use crate::registry::BundleRegistry;

/// Renders bundle paths into markup using a registry and an engine.
#[derive(Clone, Copy)]
pub struct Renderer<'a> {
  registry: &'a BundleRegistry,
  engine: &'a dyn BundleEngine,
  build_number: &'a str,
}

impl<'a> Renderer<'a> {
  /// Create a renderer; `build_number` feeds every file fingerprint.
  pub fn new(
    registry: &'a BundleRegistry,
    engine: &'a dyn BundleEngine,
    build_number: &'a str,
  ) -> Self {
    Self {
      registry,
      engine,
      build_number,
    }
  }

  /// Registry the renderer reads bundles from.
  pub fn registry(&self) -> &'a BundleRegistry {
    self.registry
  }

  /// Render `<script>` tags for the given bundle paths.
  pub fn scripts<I, S>(&self, paths: I) -> Result<String>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    self.render_format(SCRIPT_TAG_TEMPLATE, paths)
  }

  /// Render `<link>` tags for the given bundle paths.
  pub fn styles<I, S>(&self, paths: I) -> Result<String>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    self.render_format(STYLE_TAG_TEMPLATE, paths)
  }

  /// Render with the template belonging to `kind`.
  ///
  /// Fails with [`BundleError::InvalidKind`] for [`BundleKind::Generic`].
  pub fn render<I, S>(&self, kind: BundleKind, paths: I) -> Result<String>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let template = kind.tag_template().ok_or(BundleError::InvalidKind)?;
    self.render_format(template, paths)
  }

  /// Render with a caller supplied template; every `{url}` is replaced by the URL.
  ///
  /// The output has no leading newline and every emitted tag is followed by `\n`, so an
  /// empty selection renders as an empty string.
  pub fn render_format<I, S>(&self, template: &str, paths: I) -> Result<String>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut markup = String::new();

    for path in paths {
      let path = path.as_ref();
      let bundle = self.registry.bundle(path)?;

      if self.engine.is_optimized() {
        let url = self.engine.resolve_url(path);
        let url = match self.engine.bundle_version(bundle)? {
          Some(version) => format!("{url}?v={version}"),
          None => url,
        };
        push_tag(&mut markup, template, &url);
        continue;
      }

      for file in self.engine.enumerate_files(bundle)? {
        let Some(fingerprint) = fingerprint_file(&file.physical_path, self.build_number) else {
          debug!(
            "skipping missing file {} ({}) in bundle {path}",
            file.virtual_path,
            file.physical_path.display()
          );
          continue;
        };

        let url = format!(
          "{}?v={fingerprint}",
          self.engine.resolve_url(&file.virtual_path)
        );
        push_tag(&mut markup, template, &url);
      }
    }

    Ok(markup)
  }
}

fn push_tag(markup: &mut String, template: &str, url: &str) {
  trace!("emitting tag for {url}");
  markup.push_str(&template.replace(URL_PLACEHOLDER, url));
  markup.push('\n');
}
