//! Stylesheet URL rewriting so relative references survive being served from a bundle URL.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::virtual_path::{collapse_dot_segments, parent_dir, to_absolute};

fn url_reference_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^"'\s)][^)\s]*))\s*\)"#)
      .expect("invalid css url regex")
  })
}

fn url_reference_ignores() -> &'static [Regex] {
  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(r"(?i)^https?:").expect("invalid http(s) regex"),
        Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
        Regex::new(r"^/").expect("invalid absolute path regex"),
        Regex::new(r"^#").expect("invalid fragment regex"),
      ]
    })
    .as_slice()
}

/// Determine whether a stylesheet URL must be left as written.
///
/// Absolute, protocol-relative and external URLs already resolve the same way from any
/// location, as do data URIs and fragment references.
pub fn should_ignore_url_reference(value: &str) -> bool {
  value.is_empty()
    || url_reference_ignores()
      .iter()
      .any(|pattern| pattern.is_match(value))
}

/// Rewrite every relative `url(...)` in `input` against the directory of `absolute_path`.
///
/// `absolute_path` is the absolute-from-root URL the stylesheet was originally served
/// from. Quoting style of each reference is preserved.
pub fn rewrite_css_urls(absolute_path: &str, input: &str) -> String {
  let base_dir = parent_dir(absolute_path);

  url_reference_pattern()
    .replace_all(input, |caps: &Captures| {
      let (quote, value) = if let Some(value) = caps.get(1) {
        ("\"", value.as_str())
      } else if let Some(value) = caps.get(2) {
        ("'", value.as_str())
      } else {
        ("", caps.get(3).map_or("", |value| value.as_str()))
      };

      let trimmed = value.trim();
      if should_ignore_url_reference(trimmed) {
        return caps[0].to_string();
      }

      let rewritten = collapse_dot_segments(&format!("{base_dir}{trimmed}"));
      format!("url({quote}{rewritten}{quote})")
    })
    .into_owned()
}

/// Adapt a virtual path (`~/content/site.css`) to the absolute form used by
/// [`rewrite_css_urls`] and rewrite the stylesheet.
pub fn rewrite_for_virtual_path(app_base: &str, virtual_path: &str, input: &str) -> String {
  rewrite_css_urls(&to_absolute(app_base, virtual_path), input)
}
