#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod css;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod placeholder;
pub mod registry;
pub mod render;
pub mod virtual_path;

pub use config::{BundleDefinition, BundlerConfig};
pub use engine::{BundleEngine, FileSystemEngine};
pub use error::{BundleError, Result};
pub use fingerprint::{content_version, fingerprint, fingerprint_file};
pub use models::{Bundle, BundleItem, BundleKind, FileRef, ItemTransform};
pub use placeholder::{
  MarkupContainer, Placeholder, add_bundle_to_placeholder, add_bundles_to_placeholder,
};
pub use registry::BundleRegistry;
pub use render::Renderer;
