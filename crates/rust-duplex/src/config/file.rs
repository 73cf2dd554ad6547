//! File-based configuration loading.

use std::path::{Path, PathBuf};

use super::DuplexConfig;
use crate::error::{DuplexError, Result};

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Configuration file loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Search paths.
    search_paths: Vec<PathBuf>,
    /// Format for files without a recognised extension.
    default_format: Option<ConfigFormat>,
}

impl ConfigLoader {
    /// Create a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search path.
    #[must_use]
    pub fn add_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Set default format.
    #[must_use]
    pub const fn with_format(mut self, format: ConfigFormat) -> Self {
        self.default_format = Some(format);
        self
    }

    /// Find a config file by name, trying known extensions.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        for search_path in &self.search_paths {
            let path = search_path.join(name);
            if path.is_file() {
                return Some(path);
            }
            for ext in ["toml", "json"] {
                let path = search_path.join(format!("{name}.{ext}"));
                if path.is_file() {
                    return Some(path);
                }
            }
        }
        None
    }

    /// Load a config file.
    pub fn load(&self, path: &Path) -> Result<DuplexConfig> {
        let content = DuplexError::with_io_context(
            std::fs::read_to_string(path),
            format!("reading config file {}", path.display()),
        )?;

        let format = ConfigFormat::from_path(path)
            .or(self.default_format)
            .ok_or_else(|| {
                DuplexError::config(format!("unknown config format: {}", path.display()))
            })?;

        parse_config(&content, format)
    }

    /// Load by name (searches paths).
    pub fn load_by_name(&self, name: &str) -> Result<DuplexConfig> {
        let path = self
            .find(name)
            .ok_or_else(|| DuplexError::config(format!("config file not found: {name}")))?;
        self.load(&path)
    }
}

/// Parse config content.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<DuplexConfig> {
    match format {
        ConfigFormat::Toml => DuplexConfig::from_toml_str(content),
        ConfigFormat::Json => DuplexConfig::from_json_str(content),
    }
}

/// Load a config file, detecting the format from its extension.
pub fn load(path: impl AsRef<Path>) -> Result<DuplexConfig> {
    ConfigLoader::new().load(path.as_ref())
}
