//! CLI Context for shared configuration and logging
//!
//! Resolves the configuration file, applies credential overrides from the
//! command line and installs the tracing subscriber.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

use umeng_push::config::{Config, ConfigManager};
use umeng_push::shared::clients::{UmengClient, UmengClientConfig};
use umeng_push::AppError;

use super::Cli;

/// CLI execution context containing the loaded configuration
pub struct CliContext {
    pub project_path: Option<PathBuf>,
    pub verbose: bool,
    pub config_manager: ConfigManager,
    appkey_override: Option<String>,
    secret_override: Option<String>,
}

impl CliContext {
    /// Create a new CLI context from parsed arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let project_path = Self::resolve_project_path(cli.project.clone());

        let config_manager = match &cli.config {
            Some(path) => ConfigManager::from_path(path.clone()),
            None => ConfigManager::new(project_path.clone()),
        }
        .context("Failed to load configuration")?;

        Ok(Self {
            project_path,
            verbose: cli.verbose,
            config_manager,
            appkey_override: cli.appkey.clone(),
            secret_override: cli.secret.clone(),
        })
    }

    /// Auto-detect project path by looking for .umeng-push/config.toml
    fn resolve_project_path(project_path: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(path) = project_path {
            return Some(path);
        }

        let current_dir = std::env::current_dir().ok()?;
        let config_path = ConfigManager::get_config_path(Some(current_dir.clone())).ok()?;
        config_path.exists().then_some(current_dir)
    }

    /// Configuration with command line credential overrides applied
    pub fn effective_config(&self) -> Config {
        let mut config = self.config_manager.config().clone();
        if let Some(appkey) = &self.appkey_override {
            config.umeng.appkey = appkey.clone();
        }
        if let Some(secret) = &self.secret_override {
            config.umeng.app_master_secret = secret.clone();
        }
        config
    }

    /// Build a client from the effective configuration.
    ///
    /// With `require_credentials`, an empty appkey or secret is an error.
    pub fn client(&self, require_credentials: bool) -> Result<UmengClient> {
        let config = self.effective_config();

        if require_credentials {
            if config.umeng.appkey.is_empty() {
                return Err(AppError::MissingCredential {
                    field: "umeng.appkey".to_string(),
                }
                .into());
            }
            if config.umeng.app_master_secret.is_empty() {
                return Err(AppError::MissingCredential {
                    field: "umeng.app_master_secret".to_string(),
                }
                .into());
            }
        }

        UmengClient::new(UmengClientConfig::from(&config)).context("Failed to create Umeng client")
    }

    /// Initialize logging based on verbosity and configuration.
    ///
    /// Console output goes to stderr so stdout only carries command output.
    /// The returned guard must be held until exit when file logging is on.
    pub fn init_logging(&self) -> Result<Option<WorkerGuard>> {
        let logging = &self.config_manager.config().logging;
        let log_level = if self.verbose { "debug" } else { logging.level.as_str() };

        let env_filter = tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(log_level.parse().unwrap_or_else(|_| tracing::Level::INFO.into()));

        let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

        let guard = match logging.path.as_deref().filter(|p| !p.is_empty()) {
            Some(log_path) => {
                let log_path = Path::new(log_path);
                let directory = log_path.parent().unwrap_or_else(|| Path::new("."));
                std::fs::create_dir_all(directory).context("Failed to create log directory")?;

                let file_appender = tracing_appender::rolling::never(
                    directory,
                    log_path
                        .file_name()
                        .unwrap_or_else(|| std::ffi::OsStr::new("umeng-push.log")),
                );
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .with(file_layer)
                    .init();
                Some(guard)
            }
            None => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .init();
                None
            }
        };

        if self.verbose {
            tracing::debug!("Verbose logging enabled");
            tracing::debug!("Project path: {:?}", self.project_path);
            tracing::debug!("Config path: {}", self.config_manager.config_path().display());
        }

        Ok(guard)
    }
}
