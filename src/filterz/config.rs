use crate::commands::export::DEFAULT_EXPORT_FILENAME;
use crate::error::{FilterzError, Result};
use crate::model::{Relation, Schema, SchemaEntry, SchemaOption, ValueType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

/// Configuration for filterz, stored in .filterz/config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterzConfig {
    /// The fields filters can be built against
    #[serde(default)]
    pub schema: Schema,

    /// Filename used when exporting to a file without an explicit path
    #[serde(default = "default_document")]
    pub document: String,
}

fn default_document() -> String {
    DEFAULT_EXPORT_FILENAME.to_string()
}

/// The schema `filterz init` writes out, also used by the test fixtures.
pub fn sample_schema() -> Schema {
    use Relation::{Eq, Ge, Gt, Le, Lt, Ne};

    Schema::new(vec![
        SchemaEntry::new("count", vec![Lt, Le, Gt, Ge, Eq, Ne], ValueType::Int),
        SchemaEntry::new("salary", vec![Gt, Ge, Lt, Le], ValueType::Float),
        SchemaEntry::new("name", vec![Eq, Ne], ValueType::String).with_options(vec![
            SchemaOption::Plain("alice".to_string()),
            SchemaOption::Plain("bob".to_string()),
            SchemaOption::Labeled {
                value: "carol".to_string(),
                label: "Carol".to_string(),
            },
        ]),
        SchemaEntry::new("active", vec![Eq, Ne], ValueType::Boolean),
    ])
}

impl Default for FilterzConfig {
    fn default() -> Self {
        Self {
            schema: Schema::default(),
            document: default_document(),
        }
    }
}

impl FilterzConfig {
    pub fn sample() -> Self {
        Self {
            schema: sample_schema(),
            ..Self::default()
        }
    }

    pub fn exists<P: AsRef<Path>>(config_dir: P) -> bool {
        config_dir.as_ref().join(CONFIG_FILENAME).exists()
    }

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(FilterzError::Io)?;
        let config: FilterzConfig = serde_json::from_str(&content).map_err(|e| {
            FilterzError::Config(format!("{}: {}", config_path.display(), e))
        })?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(FilterzError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(FilterzError::Serialization)?;
        fs::write(config_path, content).map_err(FilterzError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FilterzConfig::default();
        assert!(config.schema.is_empty());
        assert_eq!(config.document, "filters.json");
    }

    #[test]
    fn test_load_missing_config() {
        let temp = tempfile::tempdir().unwrap();
        let config = FilterzConfig::load(temp.path().join("absent")).unwrap();
        assert_eq!(config, FilterzConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join(".filterz");

        let config = FilterzConfig::sample();
        config.save(&dir).unwrap();
        assert!(FilterzConfig::exists(&dir));

        let loaded = FilterzConfig::load(&dir).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.schema.default_filter_type(), "count");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            r#"{"schema": [{"name": "age", "relations": [">"], "valueType": "int"}]}"#,
        )
        .unwrap();

        let config = FilterzConfig::load(temp.path()).unwrap();
        assert_eq!(config.document, "filters.json");
        assert_eq!(config.schema.default_predicate("age"), Relation::Gt);
    }

    #[test]
    fn test_invalid_config_is_a_config_error() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            r#"{"schema": [{"name": "age", "relations": ["~"], "valueType": "int"}]}"#,
        )
        .unwrap();

        assert!(matches!(
            FilterzConfig::load(temp.path()),
            Err(FilterzError::Config(_))
        ));
    }
}
