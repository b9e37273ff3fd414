use crate::errors::{AppError, AppResult};
use directories::BaseDirs;
use std::fs;
use std::path::{Path, PathBuf};

// Re-export shared types for convenience
pub use crate::shared::config::{Config, EndpointConfig, LoggingConfig, UmengConfig};

const CONFIG_DIR: &str = ".umeng-push";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager for the umeng-push tool
///
/// Loads and saves the TOML configuration holding the application
/// credentials, endpoints and logging settings.
///
/// # Configuration Hierarchy
///
/// 1. **Explicit**: the file given with `--config`
/// 2. **Project-level**: `.umeng-push/config.toml` in the project root
/// 3. **Global**: `~/.umeng-push/config.toml` in the user home directory
///
/// # Example
///
/// ```rust,no_run
/// use umeng_push::config::ConfigManager;
/// use std::path::PathBuf;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config_manager = ConfigManager::new(Some(PathBuf::from("/path/to/project")))?;
///     println!("Send endpoint: {}", config_manager.config().endpoints.send);
///     Ok(())
/// }
/// ```
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Creates a new ConfigManager instance
    ///
    /// With a project path, uses the project configuration if it exists,
    /// then the global configuration if that exists, and otherwise creates
    /// the project configuration with defaults. Without a project path the
    /// global configuration is loaded or created.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The configuration directory cannot be created
    /// - The configuration file cannot be read or parsed
    /// - Default configuration cannot be serialized and written
    pub fn new(project_path: Option<PathBuf>) -> AppResult<Self> {
        if let Some(path) = project_path {
            let project_config_path = Self::get_config_path(Some(path))?;
            if project_config_path.exists() {
                return Self::from_path(project_config_path);
            }

            let global_config_path = Self::get_config_path(None)?;
            if global_config_path.exists() {
                return Self::from_path(global_config_path);
            }

            Self::from_path(project_config_path)
        } else {
            Self::from_path(Self::get_config_path(None)?)
        }
    }

    /// Loads the configuration at `path`, creating it with defaults if missing
    pub fn from_path(config_path: impl Into<PathBuf>) -> AppResult<Self> {
        let config_path = config_path.into();
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::io_with_source(parent, "create config directory", e))?;
        }

        let config = Self::load_or_create(&config_path)?;
        Ok(ConfigManager {
            config_path,
            config,
        })
    }

    pub fn get_config_path(project_path: Option<PathBuf>) -> AppResult<PathBuf> {
        let base_path = if let Some(path) = project_path {
            path.join(CONFIG_DIR)
        } else {
            let base_dirs = BaseDirs::new()
                .ok_or_else(|| AppError::config("Failed to get base directories"))?;
            base_dirs.home_dir().join(CONFIG_DIR)
        };

        Ok(base_path.join(CONFIG_FILE))
    }

    fn load_or_create(path: &Path) -> AppResult<Config> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| AppError::io_with_source(path, "read config file", e))?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Config::default();
            let content = toml::to_string_pretty(&config)
                .map_err(|e| AppError::config_with_source("Failed to serialize default config", e))?;
            fs::write(path, content)
                .map_err(|e| AppError::io_with_source(path, "write default config", e))?;
            tracing::info!("Created default configuration at {}", path.display());
            Ok(config)
        }
    }

    /// Saves the current configuration to disk
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or
    /// the file cannot be written.
    pub fn save(&self) -> AppResult<()> {
        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| AppError::config_with_source("Failed to serialize config", e))?;
        fs::write(&self.config_path, content)
            .map_err(|e| AppError::io_with_source(&self.config_path, "write config file", e))?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access; call [`save()`](Self::save) to persist changes.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
