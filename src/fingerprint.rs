//! Cache-busting fingerprints for individual bundle files.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 32;

/// Compute the fingerprint of a file identity.
///
/// The token is derived from the absolute path, the last-modified time and the build
/// number, so a new deployment invalidates every cached file even when nothing on disk
/// changed.
pub fn fingerprint(absolute_path: &Path, modified: SystemTime, build_number: &str) -> String {
  let input = format!(
    "{}|{}|{}",
    absolute_path.display(),
    format_timestamp(modified),
    build_number
  );

  content_version(input.as_bytes())
}

/// Fingerprint a file on disk, returning `None` when it cannot be read as a file.
///
/// Any failure to resolve or stat the path counts as the file being absent, so a stale
/// include never breaks rendering.
pub fn fingerprint_file(path: &Path, build_number: &str) -> Option<String> {
  let stamp = fs::canonicalize(path).and_then(|absolute| {
    let metadata = fs::metadata(&absolute)?;
    let modified = metadata.modified()?;
    Ok((absolute, metadata.is_file(), modified))
  });

  match stamp {
    Ok((absolute, true, modified)) => Some(fingerprint(&absolute, modified, build_number)),
    Ok((absolute, false, _)) => {
      debug!("treating {} as missing: not a regular file", absolute.display());
      None
    }
    Err(err) => {
      debug!("treating {} as missing: {err}", path.display());
      None
    }
  }
}

/// Version token for combined bundle content.
pub fn content_version(content: &[u8]) -> String {
  let mut encoded = hex::encode(Sha256::digest(content));
  encoded.truncate(FINGERPRINT_LEN);
  encoded
}

fn format_timestamp(time: SystemTime) -> String {
  match time.duration_since(UNIX_EPOCH) {
    Ok(elapsed) => format!("{}.{:09}", elapsed.as_secs(), elapsed.subsec_nanos()),
    Err(before) => {
      let elapsed = before.duration();
      format!("-{}.{:09}", elapsed.as_secs(), elapsed.subsec_nanos())
    }
  }
}
