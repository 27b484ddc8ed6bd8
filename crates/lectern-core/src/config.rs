use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{LecternError, Result};

/// Top-level configuration for the Lectern assistant.
///
/// Loaded from `~/.lectern/config.toml` by default. The core consumes the
/// backend base URL once at startup; there is no runtime reconfiguration
/// within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LecternConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for LecternConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl LecternConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LecternConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LecternError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error. `RUST_LOG` overrides it.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Reasoning-backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the reasoning backend, without a trailing slash.
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = LecternConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[backend]
base_url = "https://assistant.example.com"
"#;
        let file = create_temp_config(content);
        let config = LecternConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.backend.base_url, "https://assistant.example.com");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = LecternConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        // Remaining fields use defaults
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_load_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = LecternConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = LecternConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        let result = LecternConfig::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = LecternConfig::default();
        config.backend.base_url = "http://127.0.0.1:9001".to_string();
        config.save(&path).unwrap();

        let reloaded = LecternConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.log_level, config.general.log_level);
        assert_eq!(reloaded.backend.base_url, "http://127.0.0.1:9001");
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.toml");

        let config = LecternConfig::default();
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = LecternConfig::load(&path).unwrap();
        assert_eq!(reloaded.general.log_level, "info");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = LecternConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let deserialized: LecternConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.general.log_level, config.general.log_level);
        assert_eq!(deserialized.backend.base_url, config.backend.base_url);
    }
}
