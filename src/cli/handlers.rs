//! Command handlers for all CLI operations
//!
//! This module keeps the command routing separate from argument parsing.
//! Every handler prints the raw service response on stdout.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use umeng_push::config::ConfigManager;
use umeng_push::push::{AnyPushRequest, CastType};
use umeng_push::UmengClient;

use super::{CliContext, Commands, ConfigAction, SendArgs};

/// Coordinates all command handling operations
pub struct CommandHandler {
    context: CliContext,
}

impl CommandHandler {
    /// Create a new command handler instance with the provided context
    pub fn new(context: CliContext) -> Self {
        Self { context }
    }

    /// Route commands to their appropriate handlers
    pub fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Send(args) => self.handle_send(args),
            Commands::Status { task_id } => {
                let response = self.context.client(true)?.status(&task_id)?;
                println!("{response}");
                Ok(())
            }
            Commands::Cancel { task_id } => {
                let response = self.context.client(true)?.cancel(&task_id)?;
                println!("{response}");
                Ok(())
            }
            Commands::Upload { file } => self.handle_upload(file),
            Commands::Init { global, force } => self.handle_init(global, force),
            Commands::Config { action } => self.handle_config(action),
        }
    }

    fn handle_send(&self, args: SendArgs) -> Result<()> {
        let client = self.context.client(!args.dry_run)?;
        let production = args
            .production
            .unwrap_or(self.context.effective_config().umeng.production_mode);
        let platform = args.platform;
        let dry_run = args.dry_run;

        let request = build_request(&client, args, production);

        if dry_run {
            let message = request.build_message(platform, chrono::Utc::now().timestamp())?;
            let body = serde_json::to_string(&message).context("Failed to serialize message")?;
            let url = &client.endpoints().send;

            println!("Dry run - would send to {url}");
            println!("Signature: {}", client.sign(url, &body));
            println!("{}", serde_json::to_string_pretty(&message)?);
            return Ok(());
        }

        let response = request.push(platform)?;
        println!("{response}");
        Ok(())
    }

    fn handle_upload(&self, file: PathBuf) -> Result<()> {
        let content = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read device token file {}", file.display()))?;

        info!("Uploading {} device tokens", content.lines().filter(|l| !l.trim().is_empty()).count());
        let response = self.context.client(true)?.upload(&content)?;
        println!("{response}");
        Ok(())
    }

    fn handle_init(&self, global: bool, force: bool) -> Result<()> {
        let project = if global {
            None
        } else {
            Some(self.context.project_path.clone().unwrap_or_else(|| PathBuf::from(".")))
        };

        let config_path = ConfigManager::get_config_path(project)?;
        if config_path.exists() && !force {
            println!("Configuration already initialized at: {}", config_path.display());
            println!("Use --force to overwrite");
            return Ok(());
        }

        if force && config_path.exists() {
            fs::remove_file(&config_path).context("Failed to remove existing configuration")?;
        }

        ConfigManager::from_path(&config_path)?;
        println!("Configuration initialized successfully at: {}", config_path.display());
        Ok(())
    }

    fn handle_config(&self, action: ConfigAction) -> Result<()> {
        match action {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(self.context.config_manager.config())
                    .context("Failed to serialize configuration")?;
                println!("{content}");
            }
            ConfigAction::Path => {
                println!("{}", self.context.config_manager.config_path().display());
            }
        }
        Ok(())
    }
}

/// Apply the `send` arguments to a request for the requested cast type
fn build_request(client: &UmengClient, args: SendArgs, production: bool) -> AnyPushRequest {
    let mut request = client
        .request(CastType::from_name(&args.cast), args.kind)
        .mode(production);

    if let Some(tokens) = &args.tokens {
        request = request.device_tokens(tokens);
    }
    if let (Some(alias_type), Some(alias)) = (args.alias_type, &args.alias) {
        request = request.alias(alias_type, alias);
    }
    if let Some(file_id) = args.file_id {
        request = request.file_id(file_id);
    }
    if let Some(filter) = args.filter {
        request = request.filter(filter);
    }
    for (key, value) in args.body {
        request = request.body(key, json_or_string(&value));
    }
    for (key, value) in args.extra {
        request = request.extra(key, value);
    }
    for (key, value) in args.apns {
        request = request.apns(key, json_or_string(&value));
    }
    for (key, value) in args.policy {
        request = request.policy(key, json_or_string(&value));
    }
    if let Some(description) = args.description {
        request = request.description(description);
    }
    if let Some(id) = args.thirdparty_id {
        request = request.thirdparty_id(id);
    }

    request
}

/// Parse a command line value as JSON, keeping it as a string otherwise
fn json_or_string(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_or_string() {
        assert_eq!(json_or_string("1"), json!(1));
        assert_eq!(json_or_string(r#"{"a":true}"#), json!({"a": true}));
        assert_eq!(json_or_string("hello"), json!("hello"));
        assert_eq!(json_or_string("\"quoted\""), json!("quoted"));
    }
}
