//! Configuration for schema generation
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (entity-schemas.toml)
//! - Environment variables (ENTITY_SCHEMAS__*)
//!
//! ## Example config file (entity-schemas.toml):
//! ```toml
//! [types]
//! Uuid = "string"
//! "Url" = "string"
//!
//! [markers]
//! notNull = "required"
//! size = "max-length"
//!
//! [output]
//! format = "pretty"
//!
//! [validation]
//! require_semver = true
//! detect_cycles = true
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::constraint::ConstraintRule;
use crate::error::Result;
use crate::types::CanonicalType;

/// Main configuration for the schema generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Host type identity to canonical type, checked before built-ins
    #[serde(default)]
    pub types: HashMap<String, CanonicalType>,

    /// Marker name to constraint rule
    #[serde(default)]
    pub markers: HashMap<String, ConstraintRule>,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject version values that are not semantic versions
    #[serde(default)]
    pub require_semver: bool,

    /// Fail with a cyclic type error instead of recursing forever
    #[serde(default = "default_true")]
    pub detect_cycles: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_semver: false,
            detect_cycles: true,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults.
    ///
    /// Table keys come back lowercased from the file source; type and marker
    /// lookups are case-insensitive to match.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "entity-schemas.toml",
            ".entity-schemas.toml",
            "config/entity-schemas.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "entity-schemas") {
            let xdg_config = config_dir.config_dir().join("entity-schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("ENTITY_SCHEMAS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SimpleType;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert!(config.types.is_empty());
        assert!(config.validation.detect_cycles);
        assert!(!config.validation.require_semver);
        assert_eq!(config.output.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_parse_toml_sections() {
        let config: GeneratorConfig = toml::from_str(
            r#"
            [types]
            Uuid = "string"
            Money = "big-decimal"

            [markers]
            notNull = "required"
            size = "max-length"

            [output]
            format = "compact"
            "#,
        )
        .unwrap();

        assert_eq!(config.types["Uuid"], CanonicalType::Simple(SimpleType::String));
        assert_eq!(config.types["Money"], CanonicalType::Simple(SimpleType::BigDecimal));
        assert_eq!(config.markers["size"], ConstraintRule::MaxLength);
        assert_eq!(config.output.format, OutputFormat::Compact);
        assert!(config.validation.detect_cycles);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[validation]\nrequire_semver = true\ndetect_cycles = false\n\n[markers]\nkey = \"identity\"\n",
        )
        .unwrap();

        let config = GeneratorConfig::load_from(Some(&path)).unwrap();
        assert!(config.validation.require_semver);
        assert!(!config.validation.detect_cycles);
        assert_eq!(config.markers["key"], ConstraintRule::Identity);
    }

    #[test]
    fn test_load_from_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GeneratorConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, crate::error::SchemaError::Config(_)));
    }

    #[test]
    fn test_save_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = GeneratorConfig::default();
        config.types.insert("Uuid".to_string(), CanonicalType::Simple(SimpleType::String));
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[types]"));
        assert!(content.contains("Uuid = \"string\""));
    }
}
