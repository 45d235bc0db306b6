use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxonError};
use crate::store::DEFAULT_STORE_FILE;

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# taxon configuration file
# Location: ~/.taxon/config.toml

[catalog]
# File holding the category set, relative to the base directory
# Default: "categories.toml"
file = "categories.toml"

[output]
# Use box-drawing characters in `taxon tree` output
# Default: true (set to false for plain ASCII)
tree_glyphs = true
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Catalog storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Store file name, relative to the base directory
    #[serde(default = "default_catalog_file")]
    pub file: String,
}

/// Terminal output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Box-drawing characters in tree output
    #[serde(default = "default_tree_glyphs")]
    pub tree_glyphs: bool,
}

fn default_catalog_file() -> String {
    DEFAULT_STORE_FILE.to_string()
}

fn default_tree_glyphs() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            file: default_catalog_file(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            tree_glyphs: default_tree_glyphs(),
        }
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| TaxonError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self).map_err(|e| TaxonError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "catalog.file" => Some(self.catalog.file.clone()),
            "output.tree_glyphs" => Some(self.output.tree_glyphs.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "catalog.file" => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(TaxonError::ConfigValueInvalid {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.catalog.file = trimmed.to_string();
                Ok(())
            }
            "output.tree_glyphs" => {
                self.output.tree_glyphs = parse_bool(key, value)?;
                Ok(())
            }
            _ => Err(TaxonError::ConfigKeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            ("catalog.file".to_string(), self.catalog.file.clone()),
            (
                "output.tree_glyphs".to_string(),
                self.output.tree_glyphs.to_string(),
            ),
        ]
    }
}

/// Parse a boolean config value (true/false, case-insensitive)
fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(TaxonError::ConfigValueInvalid {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
