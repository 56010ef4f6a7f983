//! Bundle configuration loader describing the web root, render mode and bundle definitions.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::FileSystemEngine;
use crate::models::BundleKind;
use crate::registry::BundleRegistry;

const DEFAULT_CONFIG_FILES: [&str; 3] = [
  "bundles.config.json",
  "bundles.config.yaml",
  "bundles.config.yml",
];

/// Environment variable overriding the configured build number.
pub const BUILD_NUMBER_ENV: &str = "ASSET_BUILD_NUMBER";

/// Declarative bundle definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BundleDefinition {
  /// Bundle path, e.g. `~/bundles/app.js`.
  pub path: String,
  /// Bundle kind; defaults to generic.
  #[serde(default)]
  pub kind: BundleKind,
  /// Included virtual paths, in order. Wildcards are allowed in the file name.
  #[serde(default)]
  pub files: Vec<String>,
}

/// Discoverable configuration for bundle rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BundlerConfig {
  /// Directory virtual paths are mapped onto, relative to the configuration directory.
  pub web_root: String,
  /// URL path the application is mounted under.
  pub app_base: String,
  /// Render combined bundles instead of individual fingerprinted files.
  pub enable_optimizations: bool,
  /// Deployment identifier mixed into every fingerprint.
  pub build_number: String,
  /// Bundles registered at startup, in order.
  pub bundles: Vec<BundleDefinition>,
}

impl Default for BundlerConfig {
  fn default() -> Self {
    Self {
      web_root: "wwwroot".into(),
      app_base: "/".into(),
      enable_optimizations: false,
      build_number: "0".into(),
      bundles: Vec::new(),
    }
  }
}

impl BundlerConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// When no configuration file exists, or the first one found fails to parse, default
  /// values are returned so startup can continue.
  pub fn discover(config_dir: &Path) -> Self {
    for name in DEFAULT_CONFIG_FILES {
      let candidate = config_dir.join(name);
      if !candidate.is_file() {
        continue;
      }

      return match Self::from_path(&candidate) {
        Ok(config) => config,
        Err(err) => {
          warn!("{err:#}; falling back to default bundle configuration");
          Self::default()
        }
      };
    }

    Self::default()
  }

  /// Read configuration from a JSON or YAML file, chosen by extension.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
      serde_yaml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    } else {
      serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
  }

  /// Build number from [`BUILD_NUMBER_ENV`] when set, otherwise the configured one.
  pub fn resolved_build_number(&self) -> String {
    self.build_number_with_override(env::var(BUILD_NUMBER_ENV).ok())
  }

  fn build_number_with_override(&self, value: Option<String>) -> String {
    value
      .map(|value| value.trim().to_string())
      .filter(|value| !value.is_empty())
      .unwrap_or_else(|| self.build_number.clone())
  }

  /// Register every configured bundle into a fresh registry.
  pub fn to_registry(&self) -> BundleRegistry {
    let mut registry = BundleRegistry::new();
    for definition in &self.bundles {
      registry.register(&definition.path, &definition.files, definition.kind);
    }
    registry
  }

  /// Build a filesystem engine with `web_root` resolved against `config_dir`.
  pub fn to_engine(&self, config_dir: &Path) -> FileSystemEngine {
    FileSystemEngine::new(config_dir.join(&self.web_root))
      .with_app_base(self.app_base.clone())
      .with_optimizations(self.enable_optimizations)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::BundleEngine;
  use tempfile::tempdir;

  #[test]
  fn missing_configuration_uses_defaults() {
    let dir = tempdir().unwrap();
    let config = BundlerConfig::discover(dir.path());

    assert_eq!(config.web_root, "wwwroot");
    assert_eq!(config.app_base, "/");
    assert!(!config.enable_optimizations);
    assert!(config.bundles.is_empty());
  }

  #[test]
  fn discovers_json_configuration() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join("bundles.config.json"),
      r#"{
        "enable_optimizations": true,
        "build_number": "2024.1",
        "bundles": [
          { "path": "~/bundles/app.js", "kind": "script", "files": ["~/js/a.js", "~/js/b.js"] },
          { "path": "~/bundles/misc", "files": ["~/misc/x.txt"] }
        ]
      }"#,
    )
    .unwrap();

    let config = BundlerConfig::discover(dir.path());

    assert!(config.enable_optimizations);
    assert_eq!(config.build_number, "2024.1");
    assert_eq!(config.web_root, "wwwroot");
    assert_eq!(config.bundles[0].kind, BundleKind::Script);
    assert_eq!(config.bundles[1].kind, BundleKind::Generic);
  }

  #[test]
  fn discovers_yaml_configuration() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join("bundles.config.yaml"),
      "web_root: public\napp_base: /portal\nbundles:\n  - path: ~/bundles/site.css\n    kind: style\n    files:\n      - ~/css/site.css\n",
    )
    .unwrap();

    let config = BundlerConfig::discover(dir.path());

    assert_eq!(config.web_root, "public");
    assert_eq!(config.app_base, "/portal");
    assert_eq!(config.bundles, vec![BundleDefinition {
      path: "~/bundles/site.css".into(),
      kind: BundleKind::Style,
      files: vec!["~/css/site.css".into()],
    }]);
  }

  #[test]
  fn invalid_configuration_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bundles.config.json"), "{ not json").unwrap();

    let config = BundlerConfig::discover(dir.path());
    assert_eq!(config.build_number, "0");
  }

  #[test]
  fn from_path_reports_parse_failures() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.json");
    fs::write(&path, "42").unwrap();

    let err = BundlerConfig::from_path(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse"));
  }

  #[test]
  fn environment_override_wins_when_present() {
    let config = BundlerConfig {
      build_number: "7".into(),
      ..BundlerConfig::default()
    };

    assert_eq!(config.build_number_with_override(None), "7");
    assert_eq!(config.build_number_with_override(Some("  ".into())), "7");
    assert_eq!(config.build_number_with_override(Some(" 8 ".into())), "8");
  }

  #[test]
  fn builds_registry_with_first_definition_winning() {
    let config = BundlerConfig {
      bundles: vec![
        BundleDefinition {
          path: "~/bundles/app.js".into(),
          kind: BundleKind::Script,
          files: vec!["~/js/a.js".into()],
        },
        BundleDefinition {
          path: "~/bundles/app.js".into(),
          kind: BundleKind::Style,
          files: vec!["~/css/a.css".into()],
        },
      ],
      ..BundlerConfig::default()
    };

    let registry = config.to_registry();
    assert_eq!(registry.len(), 1);
    assert_eq!(
      registry.get("~/bundles/app.js").map(|bundle| bundle.kind()),
      Some(BundleKind::Script)
    );
  }

  #[test]
  fn builds_engine_relative_to_config_dir() {
    let config = BundlerConfig {
      web_root: "public".into(),
      app_base: "/portal".into(),
      enable_optimizations: true,
      ..BundlerConfig::default()
    };

    let engine = config.to_engine(Path::new("/srv/app"));
    assert_eq!(engine.web_root(), Path::new("/srv/app").join("public"));
    assert_eq!(engine.resolve_url("~/bundles/app.js"), "/portal/bundles/app.js");
    assert!(engine.is_optimized());
  }
}
