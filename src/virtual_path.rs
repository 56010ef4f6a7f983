//! Conversions between app-relative virtual paths, absolute URLs and disk locations.
//!
//! Virtual paths use the `~/` prefix to denote the application root. Every helper emits
//! forward slashes regardless of the separator used by the caller, so the generated
//! URLs are identical on every platform.

/// Replace Windows separators with forward slashes.
pub fn normalise_separators(path: &str) -> String {
  path.replace('\\', "/")
}

/// Portion of a virtual path below the application root, without a leading slash.
pub fn app_relative(virtual_path: &str) -> &str {
  let trimmed = virtual_path
    .strip_prefix("~/")
    .or_else(|| virtual_path.strip_prefix('~'))
    .unwrap_or(virtual_path);
  trimmed.trim_start_matches('/')
}

/// Convert a virtual path into an absolute-from-root URL under `app_base`.
///
/// Paths that already start with `/` are returned unchanged apart from separator
/// normalisation. Paths without a `~` prefix are treated as app-relative.
pub fn to_absolute(app_base: &str, virtual_path: &str) -> String {
  let path = normalise_separators(virtual_path);
  if path.starts_with('/') {
    return path;
  }

  let base = app_base.trim_matches('/');
  let relative = app_relative(&path);
  if base.is_empty() {
    format!("/{relative}")
  } else {
    format!("/{base}/{relative}")
  }
}

/// Directory portion of an absolute path, including the trailing slash.
pub fn parent_dir(path: &str) -> &str {
  match path.rfind('/') {
    Some(index) => &path[..=index],
    None => "/",
  }
}

/// Resolve `.` and `..` segments of an absolute path.
///
/// Query strings and fragments are carried over untouched. `..` never climbs above
/// the root.
pub fn collapse_dot_segments(path: &str) -> String {
  let split_at = path.find(['?', '#']).unwrap_or(path.len());
  let (path_part, suffix) = path.split_at(split_at);

  let mut segments: Vec<&str> = Vec::new();
  for segment in path_part.split('/') {
    match segment {
      "" | "." => {}
      ".." => {
        segments.pop();
      }
      other => segments.push(other),
    }
  }

  let trailing = path_part.len() > 1
    && (path_part.ends_with('/') || path_part.ends_with("/.") || path_part.ends_with("/.."));
  let mut collapsed = format!("/{}", segments.join("/"));
  if trailing && !segments.is_empty() {
    collapsed.push('/');
  }
  collapsed.push_str(suffix);
  collapsed
}
