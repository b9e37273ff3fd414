//! Command definitions and structures for the CLI
//!
//! This module contains the clap-based command line argument definitions,
//! including the main CLI structure and all subcommands.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use umeng_push::push::{MessageKind, Platform};

/// Main CLI structure
#[derive(Parser)]
#[command(name = "umeng-push")]
#[command(about = "Umeng push notification client")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project path for project-level configuration
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Explicit configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Application key (overrides the configuration file)
    #[arg(long, global = true, env = "UMENG_APPKEY")]
    pub appkey: Option<String>,

    /// Application master secret (overrides the configuration file)
    #[arg(long, global = true, env = "UMENG_APP_MASTER_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build and send a push message
    Send(SendArgs),

    /// Query the status of a push task
    Status {
        /// Task id returned by a previous send
        task_id: String,
    },

    /// Cancel a push task
    Cancel {
        /// Task id returned by a previous send
        task_id: String,
    },

    /// Upload a device token file for filecast
    Upload {
        /// File with one device token per line
        file: PathBuf,
    },

    /// Initialize configuration
    Init {
        /// Initialize global configuration (default is project-level)
        #[arg(short, long)]
        global: bool,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of the `send` command
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Cast type: unicast, listcast, filecast, broadcast, groupcast, customizedcast
    #[arg(long, default_value = "broadcast")]
    pub cast: String,

    /// Message kind: notification or message
    #[arg(long, default_value = "notification")]
    pub kind: MessageKind,

    /// Target platform: android or ios
    #[arg(long, default_value = "android")]
    pub platform: Platform,

    /// Comma-separated device tokens (unicast, listcast)
    #[arg(long)]
    pub tokens: Option<String>,

    /// Alias type (customizedcast)
    #[arg(long, requires = "alias")]
    pub alias_type: Option<String>,

    /// Comma-separated aliases (customizedcast)
    #[arg(long, requires = "alias_type")]
    pub alias: Option<String>,

    /// Uploaded file id (filecast)
    #[arg(long)]
    pub file_id: Option<String>,

    /// Filter expression (reserved, not sent)
    #[arg(long)]
    pub filter: Option<String>,

    /// Body field, KEY=VALUE; VALUE is parsed as JSON when possible
    #[arg(long = "body", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub body: Vec<(String, String)>,

    /// Extra field, KEY=VALUE
    #[arg(long = "extra", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub extra: Vec<(String, String)>,

    /// APNs field, KEY=VALUE; VALUE is parsed as JSON when possible
    #[arg(long = "apns", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub apns: Vec<(String, String)>,

    /// Policy field, KEY=VALUE; VALUE is parsed as JSON when possible
    #[arg(long = "policy", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub policy: Vec<(String, String)>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub thirdparty_id: Option<String>,

    /// Production mode; defaults to `umeng.production_mode` from the configuration
    #[arg(long)]
    pub production: Option<bool>,

    /// Print the signed message instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

/// Configuration management actions
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,
}

fn parse_key_value(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{input}'"))?;

    if key.trim().is_empty() {
        return Err(format!("empty key in '{input}'"));
    }

    Ok((key.trim().to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("ticker=hi=there").unwrap(),
            ("ticker".to_string(), "hi=there".to_string())
        );
        assert!(parse_key_value("no-separator").is_err());
        assert!(parse_key_value("=value").is_err());
    }

    #[test]
    fn test_send_arguments() {
        let cli = Cli::try_parse_from([
            "umeng-push",
            "send",
            "--cast",
            "unicast",
            "--platform",
            "ios",
            "--tokens",
            "t1,t2",
            "--apns",
            "badge=1",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.cast, "unicast");
                assert_eq!(args.platform, Platform::Ios);
                assert_eq!(args.kind, MessageKind::Notification);
                assert_eq!(args.apns, vec![("badge".to_string(), "1".to_string())]);
                assert!(args.dry_run);
            }
            _ => panic!("Expected send command"),
        }
    }
}
