//! Appending rendered bundle markup into page containers without duplicates.

use crate::error::{BundleError, Result};
use crate::models::BundleKind;
use crate::render::Renderer;

/// Container that accepts literal markup children.
pub trait MarkupContainer {
  /// Returns `true` when a child with exactly this text is already present.
  fn contains_markup(&self, text: &str) -> bool;

  /// Append a new literal child.
  fn append_markup(&mut self, text: String);
}

/// Literal markup child of a [`Placeholder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
  text: String,
}

impl Literal {
  /// Markup held by the literal.
  pub fn text(&self) -> &str {
    &self.text
  }
}

/// Ordered collection of literal markup, typically a `<head>` section slot.
#[derive(Debug, Clone, Default)]
pub struct Placeholder {
  children: Vec<Literal>,
}

impl Placeholder {
  /// Create an empty placeholder.
  pub fn new() -> Self {
    Self::default()
  }

  /// Children in insertion order.
  pub fn children(&self) -> &[Literal] {
    &self.children
  }

  /// Number of children.
  pub fn len(&self) -> usize {
    self.children.len()
  }

  /// Whether the placeholder has no children.
  pub fn is_empty(&self) -> bool {
    self.children.is_empty()
  }

  /// Concatenated markup of all children.
  pub fn to_html(&self) -> String {
    self.children.iter().map(Literal::text).collect()
  }
}

impl MarkupContainer for Placeholder {
  fn contains_markup(&self, text: &str) -> bool {
    self.children.iter().any(|literal| literal.text == text)
  }

  fn append_markup(&mut self, text: String) {
    self.children.push(Literal { text });
  }
}

/// Render `bundle_path` as `kind` and append it to `container`.
///
/// Returns `false` when identical markup was already present. Fails when the bundle is
/// not registered or when `kind` is [`BundleKind::Generic`].
pub fn add_bundle_to_placeholder<C>(
  renderer: &Renderer<'_>,
  bundle_path: &str,
  container: &mut C,
  kind: BundleKind,
) -> Result<bool>
where
  C: MarkupContainer + ?Sized,
{
  if !renderer.registry().is_registered(bundle_path) {
    return Err(BundleError::unregistered(bundle_path));
  }

  let markup = renderer.render(kind, [bundle_path])?;
  if container.contains_markup(&markup) {
    return Ok(false);
  }

  container.append_markup(markup);
  Ok(true)
}

/// Append several bundles in order, stopping at the first failure.
///
/// Returns how many children were appended.
pub fn add_bundles_to_placeholder<C, I, S>(
  renderer: &Renderer<'_>,
  bundle_paths: I,
  container: &mut C,
  kind: BundleKind,
) -> Result<usize>
where
  C: MarkupContainer + ?Sized,
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut appended = 0;
  for path in bundle_paths {
    if add_bundle_to_placeholder(renderer, path.as_ref(), container, kind)? {
      appended += 1;
    }
  }
  Ok(appended)
}
