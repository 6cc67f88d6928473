//! Configuration management with layered hierarchy

use clap::ValueEnum;
use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::category::{
    CategorizeOptions, CategoryDef, CategoryScheme, UnmappedPolicy, DEFAULT_OTHER_LABEL,
};
use crate::core::normalize::{MalformedPolicy, NormalizeOptions, OrderingMode};

/// Name of the per-directory configuration file
pub const LOCAL_CONFIG_FILE: &str = "drd.yaml";

/// Wiki that `wiki_link` points at unless configured otherwise
pub const DEFAULT_WIKI_BASE_URL: &str = "https://www.gcpedia.gc.ca/wiki/";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot read config file {}", .path.display())]
    #[diagnostic(code(drd::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {message}", .path.display())]
    #[diagnostic(code(drd::config::parse))]
    Parse { path: PathBuf, message: String },

    #[error("invalid value {value:?} for {key}")]
    #[diagnostic(code(drd::config::value))]
    InvalidValue {
        key: &'static str,
        value: String,
        #[help]
        help: String,
    },
}

/// DRD configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Display categories and the type labels each one gathers
    pub categories: Option<Vec<CategoryDef>>,

    /// Handling of type labels no category gathers
    pub unmapped: Option<UnmappedPolicy>,

    /// Name of the catch-all category for `unmapped: other`
    pub other_label: Option<String>,

    /// Order of entities within a type
    pub ordering: Option<OrderingMode>,

    /// Handling of rows with an unusable Type field
    pub on_malformed: Option<MalformedPolicy>,

    /// Prefix for absolute wiki page links
    pub wiki_base_url: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// An explicitly named file must exist and parse; the implicit global and
    /// per-directory files are skipped with a warning when they don't.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/drd/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            config.merge_optional(&global_path);
        }

        // 3. Working directory config (./drd.yaml)
        config.merge_optional(Path::new(LOCAL_CONFIG_FILE));

        // 4. Config file named on the command line
        if let Some(path) = explicit {
            config.merge(Self::from_file(path)?);
        }

        // 5. Environment variables
        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Parse a single configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yml::from_str::<Config>(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "drd")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn merge_optional(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match Self::from_file(path) {
            Ok(layer) => self.merge(layer),
            Err(e) => warn!("ignoring config layer: {e}"),
        }
    }

    /// Apply `DRD_*` environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("DRD_UNMAPPED") {
            self.unmapped = Some(parse_choice("DRD_UNMAPPED", &value)?);
        }
        if let Some(value) = lookup("DRD_ORDERING") {
            self.ordering = Some(parse_choice("DRD_ORDERING", &value)?);
        }
        if let Some(url) = lookup("DRD_WIKI_BASE_URL") {
            self.wiki_base_url = Some(url);
        }
        Ok(())
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.categories.is_some() {
            self.categories = other.categories;
        }
        if other.unmapped.is_some() {
            self.unmapped = other.unmapped;
        }
        if other.other_label.is_some() {
            self.other_label = other.other_label;
        }
        if other.ordering.is_some() {
            self.ordering = other.ordering;
        }
        if other.on_malformed.is_some() {
            self.on_malformed = other.on_malformed;
        }
        if other.wiki_base_url.is_some() {
            self.wiki_base_url = other.wiki_base_url;
        }
    }

    /// Category scheme, falling back to the built-in directory categories
    pub fn scheme(&self) -> CategoryScheme {
        match self.categories {
            Some(ref defs) => CategoryScheme::new(defs.iter().cloned()),
            None => CategoryScheme::default(),
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            ordering: self.ordering.unwrap_or_default(),
            on_malformed: self.on_malformed.unwrap_or_default(),
        }
    }

    pub fn categorize_options(&self) -> CategorizeOptions {
        CategorizeOptions {
            unmapped: self.unmapped.unwrap_or_default(),
            other_label: self
                .other_label
                .clone()
                .unwrap_or_else(|| DEFAULT_OTHER_LABEL.to_string()),
        }
    }

    pub fn wiki_base_url(&self) -> String {
        self.wiki_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_WIKI_BASE_URL.to_string())
    }
}

fn parse_choice<T: ValueEnum>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    T::from_str(value.trim(), true).map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        help: format!(
            "expected one of: {}",
            T::value_variants()
                .iter()
                .filter_map(|v| v.to_possible_value())
                .map(|v| v.get_name().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.scheme(), CategoryScheme::default());
        assert_eq!(config.normalize_options().ordering, OrderingMode::TwoPhase);
        assert_eq!(config.categorize_options().unmapped, UnmappedPolicy::Drop);
        assert_eq!(config.categorize_options().other_label, "Other");
        assert_eq!(config.wiki_base_url(), DEFAULT_WIKI_BASE_URL);
    }

    #[test]
    fn test_from_file_reads_scheme() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("drd.yaml");
        fs::write(
            &path,
            r#"
categories:
  - name: People
    types: [Team, Organization]
  - name: Documents
    types: [Working Document]
unmapped: other
ordering: per-row
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        let scheme = config.scheme();

        assert_eq!(scheme.categories().len(), 2);
        assert_eq!(scheme.categories()[0].types, vec!["Team", "Organization"]);
        assert_eq!(config.unmapped, Some(UnmappedPolicy::Other));
        assert_eq!(config.ordering, Some(OrderingMode::PerRow));
    }

    #[test]
    fn test_scheme_collapses_repeated_labels() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("drd.yaml");
        fs::write(
            &path,
            r#"
categories:
  - name: People
    types: [Team, Team]
  - name: People
    types: [Team]
"#,
        )
        .unwrap();

        let scheme = Config::from_file(&path).unwrap().scheme();

        assert_eq!(scheme.categories().len(), 1);
        assert_eq!(scheme.categories()[0].types, vec!["Team"]);
    }

    #[test]
    fn test_from_file_rejects_unknown_keys() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("drd.yaml");
        fs::write(&path, "colour: blue\n").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            Config::from_file(&tmp.path().join("absent.yaml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            unmapped: Some(UnmappedPolicy::Error),
            other_label: Some("Misc".to_string()),
            ..Config::default()
        };
        base.merge(Config {
            unmapped: Some(UnmappedPolicy::Other),
            ..Config::default()
        });

        assert_eq!(base.unmapped, Some(UnmappedPolicy::Other));
        assert_eq!(base.other_label.as_deref(), Some("Misc"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(|key| match key {
                "DRD_UNMAPPED" => Some("Error".to_string()),
                "DRD_ORDERING" => Some("per-row".to_string()),
                "DRD_WIKI_BASE_URL" => Some("https://wiki.test/".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.unmapped, Some(UnmappedPolicy::Error));
        assert_eq!(config.ordering, Some(OrderingMode::PerRow));
        assert_eq!(config.wiki_base_url(), "https://wiki.test/");
    }

    #[test]
    fn test_env_rejects_unknown_choice() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == "DRD_UNMAPPED").then(|| "ignore".to_string()))
            .unwrap_err();

        match err {
            ConfigError::InvalidValue { key, help, .. } => {
                assert_eq!(key, "DRD_UNMAPPED");
                assert_eq!(help, "expected one of: drop, other, error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
