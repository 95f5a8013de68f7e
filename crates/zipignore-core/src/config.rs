//! Configuration module

use crate::ignore::CONVENTIONAL_IGNORE_FILES;
use crate::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable that overrides the configuration file location
pub const CONFIG_ENV_VAR: &str = "ZIPIGNORE_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ignore rule loading
    #[serde(default)]
    pub ignore: IgnoreConfig,
    /// Archive creation and extraction defaults
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Ignore rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Ignore files always consulted in the source root, in order
    pub default_files: Vec<String>,
    /// Discover other `.*ignore` files in the source root
    pub auto_ignore: bool,
    /// Anchored patterns (leading `/`) only match from the source root
    pub strict_anchoring: bool,
    /// Patterns applied after every ignore file
    pub extra_patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            default_files: CONVENTIONAL_IGNORE_FILES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            auto_ignore: true,
            strict_anchoring: false,
            extra_patterns: Vec::new(),
        }
    }
}

/// Archive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Deflate level (0-9, 0 stores entries uncompressed)
    pub compression_level: u32,
    /// Overwrite existing files on extraction
    pub overwrite: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: 6,
            overwrite: false,
        }
    }
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = config_dir().ok_or_else(|| {
            Error::Config("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join("zipignore").join("config.toml"))
    }

    /// Get default configuration content with comments
    pub fn default_config_content() -> String {
        r#"# zipignore configuration file

[ignore]
# Ignore files read from the source directory, in this order
default_files = [".gitignore", ".zipignore", ".ignore"]
# Also load any other `.*ignore` file found in the source directory
auto_ignore = true
# When true, patterns with a leading `/` only match from the source root
strict_anchoring = false
# Patterns applied after all ignore files
extra_patterns = []

[archive]
# Deflate level 0-9 (0 = store without compression)
compression_level = 6
# Overwrite existing files when extracting
overwrite = false
"#
        .to_string()
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        Self::from_toml(&contents)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write the commented default file unless one already exists
    ///
    /// Returns the path and whether a new file was written.
    pub fn init() -> Result<(PathBuf, bool)> {
        let path = Self::config_path()?;
        if path.exists() {
            return Ok((path, false));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, Self::default_config_content())?;
        Ok((path, true))
    }

    /// Load configuration or use defaults if loading fails
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        if self.archive.compression_level > 9 {
            return Err(Error::Config(format!(
                "compression_level must be between 0 and 9, got {}",
                self.archive.compression_level
            )));
        }
        Ok(())
    }
}
