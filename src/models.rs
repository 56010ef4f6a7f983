//! Data structures describing registered bundles and their resolved members.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::css;

/// Tag template used for script bundles.
pub const SCRIPT_TAG_TEMPLATE: &str = r#"<script type="text/javascript" src="{url}"></script>"#;

/// Tag template used for style bundles.
pub const STYLE_TAG_TEMPLATE: &str = r#"<link href="{url}" type="text/css" rel="stylesheet"/>"#;

/// Placeholder substituted with the resolved URL inside a tag template.
pub const URL_PLACEHOLDER: &str = "{url}";

/// Category of a bundle, deciding its tag shape and per-item transform.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleKind {
  /// Registration-only category without a tag shape.
  #[default]
  Generic,
  /// JavaScript files rendered as `<script>` tags.
  Script,
  /// Stylesheets rendered as `<link>` tags.
  Style,
}

impl BundleKind {
  /// Tag template for the kind, or `None` for [`BundleKind::Generic`].
  pub fn tag_template(self) -> Option<&'static str> {
    match self {
      Self::Generic => None,
      Self::Script => Some(SCRIPT_TAG_TEMPLATE),
      Self::Style => Some(STYLE_TAG_TEMPLATE),
    }
  }

  /// Transform attached to every file included into a bundle of this kind.
  pub fn item_transform(self) -> Option<ItemTransform> {
    match self {
      Self::Style => Some(ItemTransform::CssUrlRewrite),
      Self::Generic | Self::Script => None,
    }
  }
}

impl fmt::Display for BundleKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Generic => "generic",
      Self::Script => "script",
      Self::Style => "style",
    };
    f.write_str(name)
  }
}

/// Content transform applied to an individual bundle member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemTransform {
  /// Rewrite relative `url(...)` references so they resolve from the bundle URL.
  CssUrlRewrite,
}

impl ItemTransform {
  /// Apply the transform to `content`, which was read from `virtual_path`.
  pub fn apply(self, app_base: &str, virtual_path: &str, content: &str) -> String {
    match self {
      Self::CssUrlRewrite => css::rewrite_for_virtual_path(app_base, virtual_path, content),
    }
  }
}

/// A single include registered with a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleItem {
  /// App-relative virtual path, possibly containing wildcards.
  pub virtual_path: String,
  /// Optional transform applied when the file content is combined.
  pub transform: Option<ItemTransform>,
}

/// Named, ordered group of asset files. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
  path: String,
  kind: BundleKind,
  items: Vec<BundleItem>,
}

impl Bundle {
  /// Build a bundle, attaching the kind's item transform to every include.
  pub fn new<I, S>(path: impl Into<String>, kind: BundleKind, files: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let transform = kind.item_transform();
    let items = files
      .into_iter()
      .map(|file| BundleItem {
        virtual_path: file.into(),
        transform,
      })
      .collect();

    Self {
      path: path.into(),
      kind,
      items,
    }
  }

  /// Bundle path used as its identity.
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Kind the bundle was registered with.
  pub fn kind(&self) -> BundleKind {
    self.kind
  }

  /// Includes in registration order.
  pub fn items(&self) -> &[BundleItem] {
    &self.items
  }
}

/// Bundle member after wildcard expansion and virtual path mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
  /// Resolved virtual path of the file.
  pub virtual_path: String,
  /// Location of the file on disk.
  pub physical_path: PathBuf,
  /// Transform inherited from the include that produced this file.
  pub transform: Option<ItemTransform>,
}
